/// Reranking subsystem errors. Never surfaced by search; the rerank
/// stage turns every one of these into a pass-through.
#[derive(Debug, thiserror::Error)]
pub enum RerankError {
    #[error("rerank request failed: {reason}")]
    RequestFailed { reason: String, transient: bool },

    #[error("malformed rerank response: {reason}")]
    MalformedResponse { reason: String },

    #[error("reranker unavailable: {reason}")]
    Unavailable { reason: String },
}

impl RerankError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed { transient, .. } => *transient,
            Self::MalformedResponse { .. } => true,
            Self::Unavailable { .. } => false,
        }
    }
}
