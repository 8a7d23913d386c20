//! Durable key-value storage.
//!
//! Backs the sync queue: queue contents live as JSON strings under
//! well-known keys, so absence of a key reads as an empty queue.

use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::StorageError;

use super::data_dir;

/// SQLite-backed key-value store.
pub struct KvStore {
    conn: Connection,
}

impl KvStore {
    /// Open the store at `<data_dir>/queue.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_default() -> Result<Self, StorageError> {
        let path = data_dir()?.join("queue.db");
        Self::open(&path)
    }

    /// Open the store at an explicit path, creating the schema if needed.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))
    }

    /// Get a value, or `None` if the key is absent.
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value, replacing any previous one.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key. Removing an absent key is not an error.
    pub fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_roundtrip() {
        let store = KvStore::open_memory().unwrap();
        assert!(store.get("missing").unwrap().is_none());
        store.set("greeting", "hello").unwrap();
        assert_eq!(store.get("greeting").unwrap().unwrap(), "hello");
        store.set("greeting", "replaced").unwrap();
        assert_eq!(store.get("greeting").unwrap().unwrap(), "replaced");
    }

    #[test]
    fn kv_delete() {
        let store = KvStore::open_memory().unwrap();
        store.set("key", "value").unwrap();
        store.delete("key").unwrap();
        assert!(store.get("key").unwrap().is_none());
        // Deleting again is fine.
        store.delete("key").unwrap();
    }

    #[test]
    fn kv_persists_across_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("queue.db");
        {
            let store = KvStore::open(&path).unwrap();
            store.set("durable", "yes").unwrap();
        }
        let store = KvStore::open(&path).unwrap();
        assert_eq!(store.get("durable").unwrap().unwrap(), "yes");
    }
}
