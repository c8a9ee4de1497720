//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use sift_core::config::StorageConfig;
use sift_core::errors::SiftResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// Manages the single write connection and the read connection pool.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    pub readers: ReadPool,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a connection pool for the given database file.
    pub fn open(path: &Path, config: &StorageConfig) -> SiftResult<Self> {
        let writer = WriteConnection::open(path, config)?;
        let readers = ReadPool::open(path, config)?;
        Ok(Self {
            writer,
            readers,
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory pool. Readers are isolated databases in this mode,
    /// so callers route reads through the writer.
    pub fn open_in_memory(config: &StorageConfig) -> SiftResult<Self> {
        let writer = WriteConnection::open_in_memory(config)?;
        let readers = ReadPool::open_in_memory(config)?;
        Ok(Self {
            writer,
            readers,
            db_path: None,
        })
    }
}
