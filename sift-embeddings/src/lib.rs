//! # sift-embeddings
//!
//! Text to vector conversion through a remote embedding API.
//!
//! ## Architecture
//!
//! ```text
//! EmbeddingService
//! ├── IEmbeddingProvider (one HTTP round trip per batch)
//! │   └── ApiEmbeddingProvider (OpenAI-compatible /embeddings)
//! ├── RetryPolicy (per batch, exponential backoff)
//! ├── TtlCache (embed_one, keyed by SHA-256 of the text)
//! └── cost accounting + lifetime stats
//! EmbeddingRefresher (stale entities → vectors → IVectorStore::save_batch)
//! ```

pub mod providers;
pub mod refresher;
pub mod service;

pub use providers::ApiEmbeddingProvider;
pub use refresher::{EmbeddingRefresher, RefreshReport};
pub use service::{EmbeddingOutput, EmbeddingService};
