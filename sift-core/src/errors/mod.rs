mod cache_error;
mod embedding_error;
mod rerank_error;
mod retrieval_error;
mod sift_error;
mod storage_error;

pub use cache_error::CacheError;
pub use embedding_error::EmbeddingError;
pub use rerank_error::RerankError;
pub use retrieval_error::RetrievalError;
pub use sift_error::{SiftError, SiftResult};
pub use storage_error::StorageError;
