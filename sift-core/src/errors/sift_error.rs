use super::{CacheError, EmbeddingError, RerankError, RetrievalError, StorageError};

/// Top-level error for the whole workspace.
#[derive(Debug, thiserror::Error)]
pub enum SiftError {
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("rerank error: {0}")]
    RerankError(#[from] RerankError),

    #[error("retrieval error: {0}")]
    RetrievalError(#[from] RetrievalError),

    #[error("cache error: {0}")]
    CacheError(#[from] CacheError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("config error: {0}")]
    ConfigError(String),
}

impl SiftError {
    /// Classification consumed by [`crate::retry::RetryPolicy`].
    pub fn is_transient(&self) -> bool {
        match self {
            Self::EmbeddingError(e) => e.is_transient(),
            Self::RerankError(e) => e.is_transient(),
            Self::StorageError(StorageError::SqliteError { .. }) => true,
            _ => false,
        }
    }

    /// True for the provider-exhausted case callers are expected to branch on.
    pub fn is_provider_unavailable(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingError(EmbeddingError::ProviderUnavailable { .. })
                | Self::RerankError(RerankError::Unavailable { .. })
        )
    }
}

pub type SiftResult<T> = Result<T, SiftError>;
