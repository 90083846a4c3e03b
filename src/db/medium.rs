use rusqlite::{params, Connection, OptionalExtension};

use super::Result;

/// A raw stored value plus the moment it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub value: String,
    pub written_at: u64,
}

/// String-keyed storage with a record-level timestamp. The hosting environment
/// supplies this; [`super::PersistedStateStore`] adds scoping and expiry on top.
pub trait StorageMedium {
    fn read(&self, key: &str) -> Result<Option<StoredRecord>>;
    fn write(&mut self, key: &str, value: &str, written_at: u64) -> Result<()>;
    /// Deleting a key that does not exist is not an error.
    fn delete(&mut self, key: &str) -> Result<()>;
}

/// Storage medium backed by the `persisted_state` table.
pub struct SqliteMedium {
    conn: Connection,
}

impl SqliteMedium {
    /// Wrap a connection prepared by [`super::ensure_schema`] or
    /// [`super::open_in_memory`].
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open_in_memory() -> Result<Self> {
        super::open_in_memory().map(Self::new)
    }
}

impl StorageMedium for SqliteMedium {
    fn read(&self, key: &str) -> Result<Option<StoredRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT value, written_at FROM persisted_state WHERE key = ?1",
                [key],
                |row| {
                    let written_at: i64 = row.get(1)?;
                    Ok(StoredRecord {
                        value: row.get(0)?,
                        written_at: u64::try_from(written_at).unwrap_or(0),
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// `INSERT OR REPLACE` keeps repeated writes of the same value idempotent.
    fn write(&mut self, key: &str, value: &str, written_at: u64) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO persisted_state (key, value, written_at) VALUES (?1, ?2, ?3)",
            params![key, value, i64::try_from(written_at).unwrap_or(i64::MAX)],
        )?;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM persisted_state WHERE key = ?1", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_and_delete() {
        let mut medium = SqliteMedium::open_in_memory().expect("open");
        assert_eq!(medium.read("bookmark").expect("read"), None);

        medium.write("bookmark", "{}", 42).expect("write");
        assert_eq!(
            medium.read("bookmark").expect("read"),
            Some(StoredRecord {
                value: "{}".to_string(),
                written_at: 42
            })
        );

        medium.delete("bookmark").expect("delete");
        medium.delete("bookmark").expect("second delete is a no-op");
        assert_eq!(medium.read("bookmark").expect("read"), None);
    }

    #[test]
    fn rewriting_replaces_value_and_timestamp() {
        let mut medium = SqliteMedium::open_in_memory().expect("open");
        medium.write("k", "a", 1).expect("write");
        medium.write("k", "b", 2).expect("rewrite");
        let record = medium.read("k").expect("read").expect("present");
        assert_eq!(record.value, "b");
        assert_eq!(record.written_at, 2);
    }
}
