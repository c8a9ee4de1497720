//! Embedding providers.

pub mod api_provider;

pub use api_provider::ApiEmbeddingProvider;
