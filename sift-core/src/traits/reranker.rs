use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::SiftResult;

/// One scored document from a rerank call. `index` points into the
/// documents slice that was sent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RerankScore {
    pub index: usize,
    pub relevance_score: f64,
}

/// A remote cross-encoder. One call is one request.
#[async_trait]
pub trait IReranker: Send + Sync {
    async fn rerank(
        &self,
        model: &str,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> SiftResult<Vec<RerankScore>>;

    fn name(&self) -> &str;

    fn is_available(&self) -> bool;
}
