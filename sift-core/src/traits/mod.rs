mod document_store;
mod embedding;
mod lexical;
mod reranker;
mod vector_store;

pub use document_store::IDocumentStore;
pub use embedding::{EmbeddingBatch, IEmbeddingProvider};
pub use lexical::ILexicalSearch;
pub use reranker::{IReranker, RerankScore};
pub use vector_store::IVectorStore;
