//! Run synchronous store calls on the blocking thread pool.

use crate::errors::{SiftError, SiftResult, StorageError};

/// Run `f` with `tokio::task::spawn_blocking` and flatten the join error.
pub async fn run_blocking<F, T>(f: F) -> SiftResult<T>
where
    F: FnOnce() -> SiftResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) => Err(SiftError::from(StorageError::SqliteError {
            message: format!("blocking task failed: {e}"),
        })),
    }
}
