use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Clock, Result, StorageMedium, StoreError};
use crate::models::Scope;

/// TTL applied to every reader-state entry unless configured otherwise.
pub const DEFAULT_TTL_DAYS: u32 = 365;
pub const SECONDS_PER_DAY: u64 = 86_400;

/// What actually lands in the medium: the TTL travels with the value so a read
/// can judge expiry on its own.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    ttl_days: u32,
    value: T,
}

/// Joins a key to the uid of the identity that owns it.
const SCOPE_SEPARATOR: char = '_';

/// Storage key for `key` under `scope`: the bare key for anonymous readers,
/// `<key>_<uid>` for a signed-in one. Keys holding the separator are refused
/// so no key can name a slot owned by another scope.
pub fn scoped_key(key: &str, scope: &Scope) -> Result<String> {
    if key.is_empty() || key.contains(SCOPE_SEPARATOR) {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(match scope {
        Scope::Anonymous => key.to_string(),
        Scope::Identity(uid) => format!("{key}{SCOPE_SEPARATOR}{uid}"),
    })
}

/// Scoped, TTL-aware key/value store. Expiry is checked lazily on read; there
/// is no background sweep.
pub struct PersistedStateStore {
    medium: Box<dyn StorageMedium>,
    clock: Box<dyn Clock>,
    default_ttl_days: u32,
}

impl PersistedStateStore {
    pub fn new(medium: impl StorageMedium + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            medium: Box::new(medium),
            clock: Box::new(clock),
            default_ttl_days: DEFAULT_TTL_DAYS,
        }
    }

    pub fn with_default_ttl(mut self, ttl_days: u32) -> Self {
        self.default_ttl_days = ttl_days;
        self
    }

    /// TTL used by the reader-state helpers in [`crate::state`].
    pub fn default_ttl_days(&self) -> u32 {
        self.default_ttl_days
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Direct access to the underlying medium, bypassing scoping and expiry.
    pub fn medium(&self) -> &dyn StorageMedium {
        self.medium.as_ref()
    }

    /// Write `value` under `key`/`scope`, stamped with the current time.
    pub fn set<T: Serialize>(
        &mut self,
        key: &str,
        scope: &Scope,
        value: &T,
        ttl_days: u32,
    ) -> Result<()> {
        let storage_key = scoped_key(key, scope)?;
        let payload = serde_json::to_string(&Envelope { ttl_days, value }).map_err(|source| {
            StoreError::Serialization {
                key: storage_key.clone(),
                source,
            }
        })?;
        self.medium.write(&storage_key, &payload, self.clock.now())
    }

    /// Read the value under `key`/`scope`. Expired and undecodable records are
    /// deleted and reported as absent.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str, scope: &Scope) -> Result<Option<T>> {
        let storage_key = scoped_key(key, scope)?;
        let Some(record) = self.medium.read(&storage_key)? else {
            return Ok(None);
        };

        let envelope: Envelope<T> = match serde_json::from_str(&record.value) {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!(key = %storage_key, error = %err, "discarding unreadable persisted record");
                self.medium.delete(&storage_key)?;
                return Ok(None);
            }
        };

        let age = self.clock.now().saturating_sub(record.written_at);
        if age > u64::from(envelope.ttl_days) * SECONDS_PER_DAY {
            debug!(key = %storage_key, age, ttl_days = envelope.ttl_days, "purging expired record");
            self.medium.delete(&storage_key)?;
            return Ok(None);
        }

        Ok(Some(envelope.value))
    }

    /// Unconditional delete. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &str, scope: &Scope) -> Result<()> {
        self.medium.delete(&scoped_key(key, scope)?)
    }
}
