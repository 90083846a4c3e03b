//! Application configuration read from `config.toml` in the data directory.

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::Deserialize;
use thiserror::Error;

use crate::db::DEFAULT_TTL_DAYS;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".devotional-reader";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate home directory")]
    NoHomeDir,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the database and log live. Empty = `~/.devotional-reader`.
    pub data_dir: Option<PathBuf>,
    pub database_file: String,
    pub log_file: String,
    /// `tracing` filter directive, e.g. `info` or `devotional_reader=debug`.
    pub log_filter: String,
    /// Optional chapter-range index source, relative to the data directory
    /// unless absolute.
    pub chapter_resources: Option<PathBuf>,
    pub ttl_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            database_file: "reader.sqlite".to_string(),
            log_file: "reader.log".to_string(),
            log_filter: "info".to_string(),
            chapter_resources: None,
            ttl_days: DEFAULT_TTL_DAYS,
        }
    }
}

impl AppConfig {
    /// Load `config.toml` from the default data directory. A missing file
    /// yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let base_dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDir)?;
        let default_dir = base_dirs.home_dir().join(DATA_DIR_NAME);
        Self::load_from(&default_dir)
    }

    /// Load `config.toml` from `dir`, falling back to `dir` as the data
    /// directory when the file does not override it.
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        let mut config = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
            Self::from_toml_str(&raw).map_err(|source| ConfigError::Parse { path, source })?
        } else {
            Self::default()
        };

        if config.data_dir.is_none() {
            config.data_dir = Some(dir.to_path_buf());
        }
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join(&self.database_file)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join(&self.log_file)
    }

    pub fn chapter_resources_path(&self) -> Option<PathBuf> {
        self.chapter_resources
            .as_ref()
            .map(|path| self.data_dir().join(path))
    }
}
