use serde::{Deserialize, Serialize};

use super::defaults;

/// Result and embedding cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the search result cache.
    pub enabled: bool,
    /// Lifetime of a cached result list.
    pub result_ttl_secs: u64,
    /// Lifetime of a cached single-text embedding.
    pub embedding_ttl_secs: u64,
    /// Live entries allowed in the result cache.
    pub max_entries: usize,
    /// Live entries allowed in the embedding cache.
    pub embedding_max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::DEFAULT_CACHE_ENABLED,
            result_ttl_secs: defaults::DEFAULT_RESULT_TTL_SECS,
            embedding_ttl_secs: defaults::DEFAULT_EMBEDDING_TTL_SECS,
            max_entries: defaults::DEFAULT_CACHE_MAX_ENTRIES,
            embedding_max_entries: defaults::DEFAULT_EMBEDDING_CACHE_MAX_ENTRIES,
        }
    }
}
