use serde::{Deserialize, Serialize};

use super::defaults;

/// Retrieval subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// RRF k-value for rank fusion.
    pub rrf_k: u32,
    /// Derive k from the candidate count instead of using `rrf_k`.
    pub adaptive_k: bool,
    /// Weight of the lexical list in fusion.
    pub lexical_weight: f64,
    /// Weight of the vector list in fusion.
    pub vector_weight: f64,
    /// Cosine floor for vector candidates.
    pub similarity_threshold: f64,
    /// Result limit when the caller does not pass one.
    pub default_limit: usize,
    /// Each branch fetches `limit * candidate_multiplier` candidates.
    pub candidate_multiplier: usize,
    /// Share of a combined search limit given to the nodes corpus.
    pub combined_node_share: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            rrf_k: defaults::DEFAULT_RRF_K,
            adaptive_k: defaults::DEFAULT_ADAPTIVE_K,
            lexical_weight: defaults::DEFAULT_LEXICAL_WEIGHT,
            vector_weight: defaults::DEFAULT_VECTOR_WEIGHT,
            similarity_threshold: defaults::DEFAULT_SIMILARITY_THRESHOLD,
            default_limit: defaults::DEFAULT_RESULT_LIMIT,
            candidate_multiplier: defaults::DEFAULT_CANDIDATE_MULTIPLIER,
            combined_node_share: defaults::DEFAULT_COMBINED_NODE_SHARE,
        }
    }
}
