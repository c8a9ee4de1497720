/// Embedding subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {reason}")]
    RequestFailed { reason: String, transient: bool },

    #[error("embedding provider rejected credentials: {status}")]
    AuthFailed { status: u16 },

    #[error("malformed embedding response: {reason}")]
    MalformedResponse { reason: String },

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("provider unavailable: {provider}: {reason}")]
    ProviderUnavailable { provider: String, reason: String },
}

impl EmbeddingError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed { transient, .. } => *transient,
            Self::MalformedResponse { .. } | Self::DimensionMismatch { .. } => true,
            Self::AuthFailed { .. } | Self::ProviderUnavailable { .. } => false,
        }
    }
}
