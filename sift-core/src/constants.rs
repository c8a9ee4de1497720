/// Sift version string.
pub const SIFT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Component names used in degradation events and log fields.
pub mod components {
    pub const LEXICAL_SEARCH: &str = "lexical_search";
    pub const VECTOR_SEARCH: &str = "vector_search";
    pub const EMBEDDINGS: &str = "embeddings";
    pub const RERANKER: &str = "reranker";
    pub const RESULT_CACHE: &str = "result_cache";
    pub const NODE_SEARCH: &str = "node_search";
    pub const TEMPLATE_SEARCH: &str = "template_search";
}

/// Fallback labels recorded alongside a degradation event.
pub mod fallbacks {
    pub const LEXICAL_ONLY: &str = "lexical_only";
    pub const VECTOR_ONLY: &str = "vector_only";
    pub const PASS_THROUGH: &str = "pass_through";
    pub const UNCACHED: &str = "uncached";
    pub const PARTIAL_RESULTS: &str = "partial_results";
}
