use serde::{Deserialize, Serialize};

use sift_core::models::{DegradationEvent, SearchResult};

/// Pipeline stages, in the order a query visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStage {
    Idle,
    DispatchingParallelSearch,
    Fusing,
    Reranking,
    SkipRerank,
    Truncating,
    CacheWrite,
    Done,
    Failed,
}

/// Ranked results plus how they were produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    /// A requested subsystem was missing or failed and a fallback was used.
    pub degraded: bool,
    pub degradations: Vec<DegradationEvent>,
    pub stages: Vec<SearchStage>,
    pub cache_hit: bool,
}

impl SearchResponse {
    pub(crate) fn empty() -> Self {
        Self {
            results: Vec::new(),
            degraded: false,
            degradations: Vec::new(),
            stages: vec![SearchStage::Idle, SearchStage::Done],
            cache_hit: false,
        }
    }

    pub(crate) fn cached(results: Vec<SearchResult>) -> Self {
        Self {
            cache_hit: true,
            results,
            ..Self::empty()
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.entity_id.as_str()).collect()
    }
}

/// Nodes and templates searched side by side. `results` holds the node
/// results followed by the template results; the two sets are not re-fused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedSearchResponse {
    pub nodes: Vec<SearchResult>,
    pub templates: Vec<SearchResult>,
    pub results: Vec<SearchResult>,
    pub degraded: bool,
    pub degradations: Vec<DegradationEvent>,
}

impl CombinedSearchResponse {
    pub(crate) fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            templates: Vec::new(),
            results: Vec::new(),
            degraded: false,
            degradations: Vec::new(),
        }
    }
}
