//! Single write connection. Serialized writes, no contention.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use sift_core::config::StorageConfig;
use sift_core::errors::SiftResult;

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

/// A single write connection behind a blocking mutex. Callers on an async
/// runtime reach it through `spawn_blocking`.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path, config: &StorageConfig) -> SiftResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory(config: &StorageConfig) -> SiftResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the write lock and execute a closure with the connection.
    pub fn with_conn<F, T>(&self, f: F) -> SiftResult<T>
    where
        F: FnOnce(&Connection) -> SiftResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| to_storage_err(format!("write connection lock poisoned: {e}")))?;
        f(&guard)
    }
}
