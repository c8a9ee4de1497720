//! # sift-core
//!
//! Foundation crate for the Sift hybrid retrieval engine.
//! Defines models, traits, errors, config, constants, the injectable clock,
//! the TTL cache, the shared retry policy and the blocking-pool bridge. Every other crate depends on this.

pub mod blocking;
pub mod cache;
pub mod clock;
pub mod config;
pub mod constants;
pub mod errors;
pub mod hashing;
pub mod models;
pub mod retry;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use cache::TtlCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SiftConfig;
pub use errors::{SiftError, SiftResult};
pub use models::{Corpus, DisplayFields, Entity, SearchOptions, SearchResult};
pub use retry::RetryPolicy;
