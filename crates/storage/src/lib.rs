//! Persisted gesture preferences.
//!
//! Per-gesture action assignments and the two boolean toggles (haptics,
//! proximity check on wake) live in a small key/value store. [`Database`]
//! keeps them in SQLite; [`InMemoryPreferences`] is used by tests and by
//! the daemon when no database path is configured.

mod memory;
pub mod prefs;

use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub use memory::InMemoryPreferences;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Key/value store for user preferences.
///
/// Values are stored as strings, matching how list preferences persist
/// their selected entry value.
pub trait PreferenceStore: Send + Sync {
    fn get_string(&self, key: &str) -> Result<Option<String>>;

    fn put_string(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;

    /// Read a boolean, falling back to `default` when the key is missing,
    /// unreadable or not a boolean.
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get_string(key) {
            Ok(Some(value)) => parse_bool(&value).unwrap_or_else(|| {
                tracing::warn!(key, value = %value, "stored preference is not a boolean");
                default
            }),
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read preference");
                default
            }
        }
    }

    fn put_bool(&self, key: &str, value: bool) -> Result<()> {
        self.put_string(key, if value { "true" } else { "false" })
    }
}

/// Type alias for a shared preference store.
pub type PreferenceStoreRef = Arc<dyn PreferenceStore>;

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt = conn.prepare("SELECT key FROM settings ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }
}

impl PreferenceStore for Database {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let value = conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            (key, value),
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let affected = conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
        if affected == 0 {
            return Err(StorageError::NotFound(format!("preference {key}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_accepts_words_and_digits() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }

    #[test]
    fn test_get_bool_falls_back_on_garbage() {
        let db = Database::open_in_memory().unwrap();
        db.put_string("flag", "maybe").unwrap();
        assert!(db.get_bool("flag", true));
        assert!(!db.get_bool("flag", false));
        assert!(db.get_bool("missing", true));
    }
}
