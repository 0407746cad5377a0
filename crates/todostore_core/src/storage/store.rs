use crate::error::{AppError, store_unavailable_from};
use crate::storage::bootstrap::{Bootstrap, BootstrapOutcome, Seed};
use crate::storage::{migrations, store_path};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// Hands out short-lived connections to the writable database.
///
/// Every open goes through [`Bootstrap::ensure_database`] first. Connections
/// are owned by the caller and closed when dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    bootstrap: Bootstrap,
}

impl Store {
    pub fn new(bootstrap: Bootstrap) -> Self {
        Self { bootstrap }
    }

    /// Store at the default data directory, seeded from the environment.
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(Bootstrap::new(Seed::from_env(), store_path()?)))
    }

    pub fn path(&self) -> &Path {
        self.bootstrap.target()
    }

    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    pub fn ensure_database(&self) -> Result<BootstrapOutcome, AppError> {
        self.bootstrap.ensure_database()
    }

    pub fn reset(&self) -> Result<u64, AppError> {
        self.bootstrap.reset()
    }

    pub fn open_for_read(&self) -> Result<Connection, AppError> {
        self.bootstrap.ensure_database()?;

        let conn = self.open_with(OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        if !migrations::needs_upgrade(&conn)? {
            return Ok(conn);
        }

        // A fresh file seed may predate the current schema.
        drop(conn);
        drop(self.open_for_write()?);
        self.open_with(OpenFlags::SQLITE_OPEN_READ_ONLY)
    }

    pub fn open_for_write(&self) -> Result<Connection, AppError> {
        self.bootstrap.ensure_database()?;

        let mut conn = self.open_with(OpenFlags::SQLITE_OPEN_READ_WRITE)?;
        migrations::apply(&mut conn)?;
        Ok(conn)
    }

    fn open_with(&self, access: OpenFlags) -> Result<Connection, AppError> {
        let path = self.path();
        Connection::open_with_flags(path, access | OpenFlags::SQLITE_OPEN_NO_MUTEX)
            .map_err(|err| store_unavailable_from(path, err))
    }
}

#[cfg(test)]
mod tests {
    use super::Store;
    use crate::storage::bootstrap::{BUNDLED_SEED, Bootstrap, Seed};
    use crate::storage::migrations::{latest_version, schema_version};
    use rusqlite::Connection;
    use std::fs;
    use tempfile::TempDir;

    fn bundled_store(dir: &TempDir) -> Store {
        Store::new(Bootstrap::new(Seed::Bundled, dir.path().join("todo.db")))
    }

    #[test]
    fn open_for_read_bootstraps_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = bundled_store(&dir);

        let conn = store.open_for_read().unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM todos", [], |row| row.get(0))
            .unwrap();

        assert_eq!(rows, 0);
        assert!(store.path().exists());
    }

    #[test]
    fn read_handle_rejects_writes() {
        let dir = TempDir::new().unwrap();
        let conn = bundled_store(&dir).open_for_read().unwrap();

        let result = conn.execute("DELETE FROM todos", []);

        assert!(result.is_err());
    }

    #[test]
    fn write_open_leaves_current_seed_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = bundled_store(&dir);

        drop(store.open_for_write().unwrap());

        assert_eq!(fs::read(store.path()).unwrap(), BUNDLED_SEED);
    }

    #[test]
    fn older_file_seed_is_migrated_on_first_read() {
        let dir = TempDir::new().unwrap();
        let seed = dir.path().join("seed.db");
        Connection::open(&seed)
            .unwrap()
            .execute_batch("CREATE TABLE scratch (x TEXT);")
            .unwrap();
        let store = Store::new(Bootstrap::new(
            Seed::File(seed),
            dir.path().join("data").join("todo.db"),
        ));

        let conn = store.open_for_read().unwrap();

        assert_eq!(schema_version(&conn).unwrap(), latest_version());
    }

    #[test]
    fn missing_seed_fails_every_open() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(Bootstrap::new(
            Seed::File(dir.path().join("absent.db")),
            dir.path().join("todo.db"),
        ));

        assert_eq!(store.open_for_read().unwrap_err().code(), "store_unavailable");
        assert_eq!(store.open_for_write().unwrap_err().code(), "store_unavailable");
    }

    #[test]
    fn newer_schema_is_store_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = bundled_store(&dir);
        store.ensure_database().unwrap();
        let conn = Connection::open(store.path()).unwrap();
        conn.pragma_update(None, "user_version", latest_version() + 1)
            .unwrap();
        drop(conn);

        assert_eq!(store.open_for_write().unwrap_err().code(), "store_unavailable");
        assert_eq!(store.open_for_read().unwrap_err().code(), "store_unavailable");
    }
}
