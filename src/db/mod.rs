//! Persistence split across logical submodules: the SQLite-backed storage
//! medium, and the scoped, TTL-aware store layered on top of it.

mod clock;
mod connection;
mod medium;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use connection::{ensure_schema, open_in_memory};
pub use medium::{SqliteMedium, StorageMedium, StoredRecord};
pub use store::{scoped_key, PersistedStateStore, DEFAULT_TTL_DAYS, SECONDS_PER_DAY};

/// Storage failures. A record that exists but cannot be decoded is not one of
/// these; the store reports it as absent.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to serialize value for '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid storage key '{0}': keys may not be empty or contain '_'")]
    InvalidKey(String),

    #[error("failed to prepare data directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
