//! Span definitions per operation: search, embedding, rerank.

/// Create a search span.
#[macro_export]
macro_rules! search_span {
    ($query:expr, $corpus:expr) => {
        tracing::info_span!("sift.search", query = %$query, corpus = %$corpus)
    };
}

/// Create an embedding span.
#[macro_export]
macro_rules! embedding_span {
    ($provider:expr, $batch:expr) => {
        tracing::info_span!("sift.embedding", provider = %$provider, batch = $batch)
    };
}

/// Create a rerank span.
#[macro_export]
macro_rules! rerank_span {
    ($model:expr, $documents:expr) => {
        tracing::info_span!("sift.rerank", model = %$model, documents = $documents)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const SEARCH: &str = "sift.search";
    pub const EMBEDDING: &str = "sift.embedding";
    pub const RERANK: &str = "sift.rerank";
}
