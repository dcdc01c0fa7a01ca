use log::{debug, info};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::MigrateError;
use crate::schema::{CREATE_SCHEMA_SQL, MONITORED_USERS_TABLE};

fn probe(conn: &Connection) -> Result<(), rusqlite::Error> {
    // Opening is lazy; reading the schema cookie forces SQLite to validate the file
    conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))?;
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool, MigrateError> {
    let count: i64 = conn.query_row(
        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Read-only handle on the store holding the old `monitored_users` table.
pub struct SourceStore {
    conn: Connection,
    path: PathBuf,
}

impl SourceStore {
    pub fn open(path: &Path) -> Result<Self, MigrateError> {
        let unavailable = |source| MigrateError::StoreUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(unavailable)?;
        probe(&conn).map_err(unavailable)?;

        info!("Source store opened read-only at: {}", path.display());
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_monitored_users(&self) -> Result<bool, MigrateError> {
        table_exists(&self.conn, MONITORED_USERS_TABLE)
    }

    pub fn column_names(&self) -> Result<Vec<String>, MigrateError> {
        let stmt = self.conn.prepare("SELECT * FROM monitored_users LIMIT 0")?;
        Ok(stmt.column_names().into_iter().map(str::to_owned).collect())
    }

    pub fn row_count(&self) -> Result<usize, MigrateError> {
        let count: i64 =
            self.conn
                .query_row("SELECT count(*) FROM monitored_users", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn close(self) -> Result<(), MigrateError> {
        debug!("Closing source store: {}", self.path.display());
        self.conn.close().map_err(|(_, e)| MigrateError::DatabaseError(e))
    }
}

/// Writable handle on the store that receives the 12-column table. The file is
/// created if it does not exist.
pub struct DestinationStore {
    conn: Connection,
    path: PathBuf,
}

impl DestinationStore {
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self, MigrateError> {
        let unavailable = |source| MigrateError::StoreUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let conn = Connection::open(path).map_err(unavailable)?;
        probe(&conn).map_err(unavailable)?;
        conn.busy_timeout(busy_timeout)?;

        info!("Destination store opened at: {}", path.display());
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    #[cfg(test)]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_monitored_users(&self) -> Result<bool, MigrateError> {
        table_exists(&self.conn, MONITORED_USERS_TABLE)
    }

    /// Creates the 12-column `monitored_users` table and its indexes if absent.
    pub fn ensure_schema(&self) -> Result<(), MigrateError> {
        self.conn.execute_batch(CREATE_SCHEMA_SQL)?;
        debug!("Ensured monitored_users schema in {}", self.path.display());
        Ok(())
    }

    pub fn close(self) -> Result<(), MigrateError> {
        debug!("Closing destination store: {}", self.path.display());
        self.conn.close().map_err(|(_, e)| MigrateError::DatabaseError(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_source_open_missing_file_is_unavailable() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("bot-old.db");

        let result = SourceStore::open(&path);
        assert!(matches!(result, Err(MigrateError::StoreUnavailable { .. })));
        assert!(!path.exists(), "read-only open must not create the file");
    }

    #[test]
    fn test_source_open_garbage_file_is_unavailable() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file
            .write_all(&[b'x'; 1024])
            .expect("Failed to write temp file");

        let result = SourceStore::open(temp_file.path());
        assert!(matches!(result, Err(MigrateError::StoreUnavailable { .. })));
    }

    #[test]
    fn test_source_store_is_read_only() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("bot-old.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE monitored_users (guild_id TEXT, user_id TEXT);")
            .unwrap();
        conn.close().unwrap();

        let source = SourceStore::open(&path).unwrap();
        assert!(source.has_monitored_users().unwrap());
        assert_eq!(source.column_names().unwrap(), vec!["guild_id", "user_id"]);
        assert_eq!(source.row_count().unwrap(), 0);

        let write = source
            .conn()
            .execute("INSERT INTO monitored_users VALUES ('g1', 'u1')", []);
        assert!(write.is_err());
        source.close().unwrap();
    }

    #[test]
    fn test_destination_open_creates_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("bot.db");

        let dest = DestinationStore::open(&path, Duration::from_millis(100)).unwrap();
        assert!(path.exists());
        assert!(!dest.has_monitored_users().unwrap());
        assert_eq!(dest.path(), path.as_path());
        dest.close().unwrap();
    }

    #[test]
    fn test_destination_open_in_missing_directory_is_unavailable() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("no-such-dir").join("bot.db");

        let result = DestinationStore::open(&path, Duration::from_millis(100));
        assert!(matches!(result, Err(MigrateError::StoreUnavailable { .. })));
    }
}
