use serde::{Deserialize, Serialize};

use super::Corpus;

/// Embedding coverage of one corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageStats {
    pub corpus: Corpus,
    pub total_entities: usize,
    pub embedded: usize,
    /// Entities with no vector or with a vector whose hash no longer matches.
    pub needs_embedding: usize,
}

impl CoverageStats {
    pub fn coverage_ratio(&self) -> f64 {
        if self.total_entities == 0 {
            return 0.0;
        }
        (self.total_entities - self.needs_embedding) as f64 / self.total_entities as f64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingStats {
    pub requests: u64,
    pub batches: u64,
    pub total_tokens: u64,
    pub total_cost_usd: f64,
    pub failures: u64,
    pub cache: CacheStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RerankStats {
    pub calls: u64,
    pub failures: u64,
    pub skipped: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCounters {
    pub total: u64,
    pub cache_hits: u64,
    pub degraded: u64,
    pub failed: u64,
}

/// Snapshot returned by `get_statistics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatistics {
    pub coverage: Vec<CoverageStats>,
    pub result_cache: CacheStats,
    pub embeddings: Option<EmbeddingStats>,
    pub rerank: RerankStats,
    pub searches: SearchCounters,
    pub active_degradations: usize,
    pub recent_degradations: usize,
}
