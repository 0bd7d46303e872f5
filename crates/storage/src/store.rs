#![forbid(unsafe_code)]

use crate::error::StoreError;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::time::Duration;

const DB_FILE: &str = "curriculum_city.db";
const MAX_KEY_LEN: usize = 256;

/// A single-file key/value store standing in for the browser's local storage.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let storage_dir = storage_dir.as_ref();
        std::fs::create_dir_all(storage_dir)?;

        let conn = Connection::open(storage_dir.join(DB_FILE))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        install_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Throwaway store; nothing survives the connection.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        install_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn local_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = validate_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn local_set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let key = validate_key(key)?;
        self.conn.execute(
            r#"
            INSERT INTO local_storage(key, value, updated_at_ms) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at_ms = excluded.updated_at_ms
            "#,
            params![key, value, now_ms()],
        )?;
        Ok(())
    }

    pub fn local_remove(&mut self, key: &str) -> Result<bool, StoreError> {
        let key = validate_key(key)?;
        let removed = self
            .conn
            .execute("DELETE FROM local_storage WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }
}

fn validate_key(key: &str) -> Result<&str, StoreError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(StoreError::InvalidInput("key must not be empty"));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(StoreError::InvalidInput("key is too long"));
    }
    Ok(key)
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS local_storage (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL,
          updated_at_ms INTEGER NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration,
        Err(_) => return 0,
    };

    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_and_remove_reports_presence() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.local_get("k").unwrap(), None);
        store.local_set("k", "one").unwrap();
        store.local_set("k", "two").unwrap();
        assert_eq!(store.local_get("k").unwrap().as_deref(), Some("two"));
        assert!(store.local_remove("k").unwrap());
        assert!(!store.local_remove("k").unwrap());
    }

    #[test]
    fn blank_keys_are_rejected() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            store.local_set("  ", "v"),
            Err(StoreError::InvalidInput(_))
        ));
        assert!(matches!(
            store.local_get(&"k".repeat(MAX_KEY_LEN + 1)),
            Err(StoreError::InvalidInput(_))
        ));
    }
}
