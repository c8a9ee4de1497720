/// Retrieval subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("fusion input mismatch: {reason}")]
    FusionInputMismatch { reason: String },

    #[error("search unavailable: {reason}")]
    SearchUnavailable { reason: String },
}
