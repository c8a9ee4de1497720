use serde::{Deserialize, Serialize};

use super::defaults;

/// Rerank subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankConfig {
    /// Run the rerank stage by default (overridable per query).
    pub enabled: bool,
    /// Base URL of the rerank API; `/rerank` is appended.
    pub api_base: String,
    pub api_key: Option<String>,
    /// Model used for queries written in Latin script.
    pub model: String,
    /// Model used when the query contains other scripts.
    pub multilingual_model: String,
    /// Candidates beyond this count are appended unranked.
    pub max_documents: usize,
    /// Serialized candidate text is cut to this many characters.
    pub max_document_chars: usize,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_RERANK_ENABLED,
            api_base: defaults::DEFAULT_RERANK_API_BASE.to_string(),
            api_key: None,
            model: defaults::DEFAULT_RERANK_MODEL.to_string(),
            multilingual_model: defaults::DEFAULT_RERANK_MULTILINGUAL_MODEL.to_string(),
            max_documents: defaults::DEFAULT_RERANK_MAX_DOCUMENTS,
            max_document_chars: defaults::DEFAULT_RERANK_DOCUMENT_CHARS,
            max_retries: defaults::DEFAULT_MAX_RETRIES,
            retry_base_delay_ms: defaults::DEFAULT_RETRY_BASE_DELAY_MS,
            request_timeout_secs: defaults::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}
