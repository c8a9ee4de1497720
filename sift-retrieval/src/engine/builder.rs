use std::sync::Arc;

use sift_core::clock::{Clock, SystemClock};
use sift_core::config::SiftConfig;
use sift_core::errors::SiftResult;
use sift_core::traits::{IEmbeddingProvider, ILexicalSearch, IReranker, IVectorStore};
use sift_embeddings::EmbeddingService;

use super::HybridSearchEngine;

/// Assembles a [`HybridSearchEngine`] from whichever components exist.
/// Anything left out is reported by `is_ready` and degrades searches
/// that ask for it.
pub struct EngineBuilder {
    config: SiftConfig,
    lexical: Option<Arc<dyn ILexicalSearch>>,
    vectors: Option<Arc<dyn IVectorStore>>,
    embeddings: Option<Arc<EmbeddingService>>,
    embedding_provider: Option<Arc<dyn IEmbeddingProvider>>,
    reranker: Option<Arc<dyn IReranker>>,
    clock: Option<Arc<dyn Clock>>,
}

impl EngineBuilder {
    pub fn new(config: SiftConfig) -> Self {
        Self {
            config,
            lexical: None,
            vectors: None,
            embeddings: None,
            embedding_provider: None,
            reranker: None,
            clock: None,
        }
    }

    pub fn lexical(mut self, lexical: Arc<dyn ILexicalSearch>) -> Self {
        self.lexical = Some(lexical);
        self
    }

    pub fn vector_store(mut self, store: Arc<dyn IVectorStore>) -> Self {
        self.vectors = Some(store);
        self
    }

    /// Use an existing service, sharing its cache and counters.
    pub fn embeddings(mut self, service: Arc<EmbeddingService>) -> Self {
        self.embeddings = Some(service);
        self
    }

    /// Wrap a provider in a service built from the embedding config.
    /// Ignored when [`Self::embeddings`] is also set.
    pub fn embedding_provider(mut self, provider: Arc<dyn IEmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    pub fn reranker(mut self, reranker: Arc<dyn IReranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> SiftResult<HybridSearchEngine> {
        self.config.validate()?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let embeddings = match (self.embeddings, self.embedding_provider) {
            (Some(service), _) => Some(service),
            (None, Some(provider)) => Some(Arc::new(EmbeddingService::new(
                provider,
                &self.config.embedding,
                &self.config.cache,
                clock.clone(),
            ))),
            (None, None) => None,
        };
        Ok(HybridSearchEngine::assemble(
            self.config,
            self.lexical,
            self.vectors,
            embeddings,
            self.reranker,
            clock,
        ))
    }
}
