use serde::{Deserialize, Serialize};

use super::defaults;

/// Embedding subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding API; `/embeddings` is appended.
    pub api_base: String,
    /// API key. Usually supplied through the environment instead.
    pub api_key: Option<String>,
    /// Embedding model identifier.
    pub model: String,
    /// Requested and expected vector length.
    pub dimensions: usize,
    /// Maximum texts per request.
    pub batch_size: usize,
    /// Pause between consecutive batches.
    pub inter_batch_delay_ms: u64,
    /// Attempts per batch before giving up.
    pub max_retries: u32,
    /// First backoff delay; doubles per attempt.
    pub retry_base_delay_ms: u64,
    /// Per-request HTTP deadline.
    pub request_timeout_secs: u64,
    /// USD per million reported tokens.
    pub cost_per_million_tokens: f64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::DEFAULT_EMBEDDING_API_BASE.to_string(),
            api_key: None,
            model: defaults::DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: defaults::DEFAULT_EMBEDDING_DIMENSIONS,
            batch_size: defaults::DEFAULT_EMBEDDING_BATCH_SIZE,
            inter_batch_delay_ms: defaults::DEFAULT_INTER_BATCH_DELAY_MS,
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: defaults::DEFAULT_RETRY_BASE_DELAY_MS,
            request_timeout_secs: defaults::DEFAULT_REQUEST_TIMEOUT_SECS,
            cost_per_million_tokens: defaults::DEFAULT_COST_PER_MILLION_TOKENS,
        }
    }
}
