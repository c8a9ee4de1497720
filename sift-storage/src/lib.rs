//! # sift-storage
//!
//! SQLite persistence for both corpora.
//!
//! ## Architecture
//!
//! ```text
//! StorageEngine (IDocumentStore + IVectorStore + ILexicalSearch)
//! ├── ConnectionPool
//! │   ├── WriteConnection (single writer)
//! │   └── ReadPool (round-robin readers, WAL)
//! ├── Migrations (PRAGMA user_version)
//! │   ├── v001 entity tables + FTS5 indexes
//! │   └── v002 embedding columns
//! └── Queries
//!     ├── entity_crud
//!     ├── embedding_ops (save, batch save, staleness)
//!     ├── vector_search (brute-force cosine scan)
//!     └── lexical_search (FTS5 + bm25)
//! ```

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;
pub use queries::vector_search::cosine_similarity;

use sift_core::errors::{SiftError, StorageError};

/// Wrap a SQLite failure message as a workspace error.
pub(crate) fn to_storage_err(message: String) -> SiftError {
    StorageError::SqliteError { message }.into()
}
