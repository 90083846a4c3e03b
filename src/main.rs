//! Binary entry point: load configuration, start logging, open the local
//! store, load the optional chapter resource index and hand over to the
//! terminal shell.
use std::fs;

use anyhow::{Context, Result};
use tracing::info;

use devotional_reader::db::ensure_schema;
use devotional_reader::{
    logging, run_app, App, AppConfig, ChapterRangeIndex, PersistedStateStore, ReaderSession,
    SqliteMedium, SystemClock,
};

fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    logging::init(&config.log_path(), &config.log_filter)?;

    let conn = ensure_schema(&config.database_path()).context("failed to open reader database")?;
    let store = PersistedStateStore::new(SqliteMedium::new(conn), SystemClock)
        .with_default_ttl(config.ttl_days);
    let index = load_chapter_index(&config)?;
    info!(data_dir = %config.data_dir().display(), "reader starting");

    let mut app = App::new(ReaderSession::new(store), index)?;
    run_app(&mut app)
}

/// A broken index file is a data defect, so it stops startup instead of
/// silently running without companion resources.
fn load_chapter_index(config: &AppConfig) -> Result<ChapterRangeIndex> {
    let Some(path) = config.chapter_resources_path() else {
        return Ok(ChapterRangeIndex::default());
    };
    let source = fs::read_to_string(&path)
        .with_context(|| format!("failed to read chapter index {}", path.display()))?;
    ChapterRangeIndex::from_toml_str(&source)
        .with_context(|| format!("invalid chapter index {}", path.display()))
}
