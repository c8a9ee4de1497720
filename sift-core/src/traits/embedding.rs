use async_trait::async_trait;

use crate::errors::SiftResult;

/// Vectors for one request, in input order, plus reported token usage.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingBatch {
    pub vectors: Vec<Vec<f32>>,
    pub total_tokens: u64,
}

/// A remote embedding model. One call is one request; batching, retry
/// and caching live in the service that wraps the provider.
#[async_trait]
pub trait IEmbeddingProvider: Send + Sync {
    /// Embed `texts` in a single request. The returned vectors must be in
    /// input order regardless of the order the API answered in.
    async fn embed_batch(&self, texts: &[String]) -> SiftResult<EmbeddingBatch>;

    /// Model identifier stored alongside each vector.
    fn model(&self) -> &str;

    /// The dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Whether this provider is configured well enough to be called.
    fn is_available(&self) -> bool {
        true
    }
}
