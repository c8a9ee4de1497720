use serde::{Deserialize, Serialize};

/// Which retrieval branches a query may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Lexical,
    Vector,
    #[default]
    Hybrid,
}

impl SearchMode {
    pub fn includes_lexical(&self) -> bool {
        matches!(self, Self::Lexical | Self::Hybrid)
    }

    pub fn includes_vector(&self) -> bool {
        matches!(self, Self::Vector | Self::Hybrid)
    }
}

/// Per-query options. `None` fields fall back to engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub limit: Option<usize>,
    pub mode: Option<SearchMode>,
    pub enable_reranking: Option<bool>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_reranking(mut self, enabled: bool) -> Self {
        self.enable_reranking = Some(enabled);
        self
    }
}
