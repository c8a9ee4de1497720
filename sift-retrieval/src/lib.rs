//! # sift-retrieval
//!
//! Hybrid search over the nodes and templates corpora.
//!
//! ## Architecture
//!
//! ```text
//! HybridSearchEngine
//! ├── ResultCache (TTL, keyed by normalized query + options)
//! ├── lexical branch  ── ILexicalSearch
//! ├── vector branch   ── EmbeddingService::embed_one → IVectorStore::find_similar
//! ├── fusion (weighted RRF)
//! ├── RerankStage (IReranker, retry, pass-through on failure)
//! └── DegradationTracker
//! ```

pub mod cache;
pub mod engine;
pub mod fusion;
pub mod rerank;

pub use cache::ResultCache;
pub use engine::{
    CombinedSearchResponse, EngineBuilder, HybridSearchEngine, SearchResponse, SearchStage,
};
pub use fusion::{fuse, fuse_lists, optimal_k, FusedCandidate, RankedList};
pub use rerank::{select_model, ApiReranker, RerankStage};
