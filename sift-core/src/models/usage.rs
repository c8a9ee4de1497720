use serde::{Deserialize, Serialize};

/// Tokens and cost attributed to one embedding call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingUsage {
    pub tokens: u64,
    pub cost_usd: f64,
    /// Served from the in-process cache; tokens and cost are zero.
    pub cached: bool,
}

impl EmbeddingUsage {
    pub fn cached() -> Self {
        Self {
            tokens: 0,
            cost_usd: 0.0,
            cached: true,
        }
    }

    pub fn from_tokens(tokens: u64, cost_per_million_tokens: f64) -> Self {
        Self {
            tokens,
            cost_usd: tokens as f64 * cost_per_million_tokens / 1_000_000.0,
            cached: false,
        }
    }

    pub fn add(&mut self, other: EmbeddingUsage) {
        self.tokens += other.tokens;
        self.cost_usd += other.cost_usd;
        self.cached = self.cached && other.cached;
    }
}
