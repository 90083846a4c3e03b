use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use super::Result;

/// Open (creating if needed) the database at `path` and make sure the
/// `persisted_state` table exists. The parent directory is created on first
/// run.
pub fn ensure_schema(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    create_tables(&conn)?;
    debug!(path = %path.display(), "opened reader database");
    Ok(conn)
}

/// In-memory database with the same schema, for tests and throwaway sessions.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    create_tables(&conn)?;
    Ok(conn)
}

fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS persisted_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            written_at INTEGER NOT NULL
        )",
        [],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_schema_creates_missing_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("reader.sqlite");

        let conn = ensure_schema(&path).expect("open database");
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'persisted_state'",
                [],
                |row| row.get(0),
            )
            .expect("query sqlite_master");
        assert_eq!(tables, 1);
        assert!(path.exists());
    }

    #[test]
    fn ensure_schema_is_repeatable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("reader.sqlite");
        ensure_schema(&path).expect("first open");
        ensure_schema(&path).expect("second open");
    }
}
