//! v002: embedding columns on both entity tables.
//!
//! Vectors are little-endian f32 blobs. `embedding_hash` is the SHA-256 of
//! the searchable text the vector was generated from.

use rusqlite::Connection;

use sift_core::errors::SiftResult;
use sift_core::models::Corpus;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> SiftResult<()> {
    for corpus in Corpus::ALL {
        let t = corpus.as_str();
        conn.execute_batch(&format!(
            "
            ALTER TABLE {t} ADD COLUMN embedding BLOB;
            ALTER TABLE {t} ADD COLUMN embedding_hash TEXT;
            ALTER TABLE {t} ADD COLUMN embedding_model TEXT;
            ALTER TABLE {t} ADD COLUMN embedding_dimensions INTEGER;
            ALTER TABLE {t} ADD COLUMN embedding_generated_at TEXT;
            "
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(())
}
