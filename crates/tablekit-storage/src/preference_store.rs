//! Durable key-value storage for per-table UI preferences.
//!
//! State components never touch a concrete backend directly; they depend on
//! the `PreferenceStore` capability. The SQLite implementation is the
//! production backend; the in-memory one serves tests and embedders that do
//! not want a database file. Every entry carries an expiry and `get` never
//! returns an expired value.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{Connection, params};
use thiserror::Error;

/// Errors raised by preference storage backends.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage lock poisoned")]
    LockPoisoned,
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Durable key-value capability with per-entry expiry.
///
/// `set` replaces any previous value under the key and restarts its
/// lifetime. Reads and writes are synchronous and complete before they
/// return.
pub trait PreferenceStore {
    /// Look up a non-expired value.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value that expires `ttl` from now.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        (**self).set(key, value, ttl)
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        (**self).set(key, value, ttl)
    }
}

fn expiry_timestamp(ttl: Duration) -> i64 {
    Utc::now()
        .timestamp()
        .saturating_add(ttl.as_secs().min(i64::MAX as u64) as i64)
}

/// Handle for database connections - either owned or shared
enum ConnectionHandle {
    Owned(Connection),
    Shared(Arc<Mutex<Connection>>),
}

impl ConnectionHandle {
    fn with_conn<T, F: FnOnce(&Connection) -> Result<T>>(&self, f: F) -> Result<T> {
        match self {
            ConnectionHandle::Owned(conn) => f(conn),
            ConnectionHandle::Shared(arc) => {
                let guard = arc.lock().map_err(|_| StorageError::LockPoisoned)?;
                f(&guard)
            }
        }
    }
}

/// SQLite-backed preference store.
pub struct SqlitePreferenceStore {
    db_path: PathBuf,
    /// Holds the connection for in-memory databases (where each open creates a new db)
    memory_conn: Option<Arc<Mutex<Connection>>>,
}

impl SqlitePreferenceStore {
    /// Open or create storage at the given path.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self {
            db_path,
            memory_conn: None,
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            db_path: PathBuf::from(":memory:"),
            memory_conn: Some(Arc::new(Mutex::new(conn))),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn connect(&self) -> Result<ConnectionHandle> {
        if let Some(ref conn) = self.memory_conn {
            Ok(ConnectionHandle::Shared(conn.clone()))
        } else {
            Ok(ConnectionHandle::Owned(Connection::open(&self.db_path)?))
        }
    }

    fn initialize_schema(&self) -> Result<()> {
        let handle = self.connect()?;
        handle.with_conn(|conn| {
            conn.execute(
                "CREATE TABLE IF NOT EXISTS preferences (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    expires_at INTEGER NOT NULL
                )",
                [],
            )?;
            conn.execute(
                "CREATE INDEX IF NOT EXISTS idx_preferences_expiry
                 ON preferences(expires_at)",
                [],
            )?;
            Ok(())
        })
    }

    /// Delete every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> Result<usize> {
        let handle = self.connect()?;
        let now = Utc::now().timestamp();
        let removed = handle.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM preferences WHERE expires_at <= ?1",
                params![now],
            )?)
        })?;
        if removed > 0 {
            tracing::debug!("Purged {} expired preference entries", removed);
        }
        Ok(removed)
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let handle = self.connect()?;
        let now = Utc::now().timestamp();
        handle.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT value, expires_at FROM preferences WHERE key = ?1")?;
            let result = stmt.query_row(params![key], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            });

            match result {
                Ok((value, expires_at)) => {
                    if expires_at <= now {
                        conn.execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
                        Ok(None)
                    } else {
                        Ok(Some(value))
                    }
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let handle = self.connect()?;
        let expires_at = expiry_timestamp(ttl);
        handle.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO preferences (key, value, expires_at)
                 VALUES (?1, ?2, ?3)",
                params![key, value, expires_at],
            )?;
            Ok(())
        })
    }
}

/// In-memory preference store with the same expiry semantics.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    entries: Mutex<HashMap<String, (String, i64)>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Utc::now().timestamp();
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        match entries.get(key) {
            Some((_, expires_at)) if *expires_at <= now => {
                entries.remove(key);
                Ok(None)
            }
            Some((value, _)) => Ok(Some(value.clone())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let expires_at = expiry_timestamp(ttl);
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::LockPoisoned)?;
        entries.insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }
}
