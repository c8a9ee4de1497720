//! Writes and reads of the embedding columns, plus staleness queries.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use sift_core::errors::{SiftResult, StorageError};
use sift_core::models::{Corpus, CoverageStats, EmbeddingRecord, Entity};

use super::entity_crud::{parse_entity_row, ENTITY_COLUMNS};
use super::vector_search::{bytes_to_f32_vec, f32_vec_to_bytes};
use crate::to_storage_err;

/// Whether `corpus` carries both the vector column and the fingerprint column.
pub fn has_embedding_schema(conn: &Connection, corpus: Corpus) -> SiftResult<bool> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", corpus.as_str()))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let (mut vector, mut hash) = (false, false);
    for name in names {
        match name.map_err(|e| to_storage_err(e.to_string()))?.as_str() {
            "embedding" => vector = true,
            "embedding_hash" => hash = true,
            _ => {}
        }
    }
    Ok(vector && hash)
}

pub(crate) fn ensure_schema(conn: &Connection, corpus: Corpus) -> SiftResult<()> {
    if has_embedding_schema(conn, corpus)? {
        Ok(())
    } else {
        Err(StorageError::SchemaNotReady {
            corpus: corpus.to_string(),
        }
        .into())
    }
}

/// Overwrite one entity's embedding in place.
pub fn save_embedding(conn: &Connection, corpus: Corpus, record: &EmbeddingRecord) -> SiftResult<()> {
    ensure_schema(conn, corpus)?;
    save_embedding_inner(conn, corpus, record)
}

/// Save every record inside one SAVEPOINT: all rows are written or none are.
pub fn save_embeddings_batch(
    conn: &Connection,
    corpus: Corpus,
    records: &[EmbeddingRecord],
) -> SiftResult<usize> {
    ensure_schema(conn, corpus)?;
    conn.execute_batch("SAVEPOINT save_embeddings")
        .map_err(|e| to_storage_err(format!("save_embeddings savepoint: {e}")))?;

    let result = records
        .iter()
        .try_for_each(|record| save_embedding_inner(conn, corpus, record));

    match result {
        Ok(()) => {
            conn.execute_batch("RELEASE save_embeddings")
                .map_err(|e| to_storage_err(format!("save_embeddings release: {e}")))?;
            Ok(records.len())
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK TO save_embeddings");
            let _ = conn.execute_batch("RELEASE save_embeddings");
            Err(e)
        }
    }
}

fn save_embedding_inner(conn: &Connection, corpus: Corpus, record: &EmbeddingRecord) -> SiftResult<()> {
    let blob = f32_vec_to_bytes(&record.vector);
    let updated = conn
        .execute(
            &format!(
                "UPDATE {t} SET
                    embedding = ?1,
                    embedding_hash = ?2,
                    embedding_model = ?3,
                    embedding_dimensions = ?4,
                    embedding_generated_at = ?5
                 WHERE id = ?6",
                t = corpus.as_str()
            ),
            params![
                blob,
                record.content_hash,
                record.model,
                record.vector.len() as i64,
                record.generated_at.to_rfc3339(),
                record.entity_id
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    if updated == 0 {
        return Err(StorageError::EntityNotFound {
            corpus: corpus.to_string(),
            id: record.entity_id.clone(),
        }
        .into());
    }
    Ok(())
}

pub fn get_embedding(conn: &Connection, corpus: Corpus, id: &str) -> SiftResult<Option<Vec<f32>>> {
    ensure_schema(conn, corpus)?;
    let blob: Option<Option<Vec<u8>>> = conn
        .query_row(
            &format!("SELECT embedding FROM {t} WHERE id = ?1", t = corpus.as_str()),
            params![id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(blob.flatten().map(|b| bytes_to_f32_vec(&b)))
}

pub fn get_embedding_record(
    conn: &Connection,
    corpus: Corpus,
    id: &str,
) -> SiftResult<Option<EmbeddingRecord>> {
    ensure_schema(conn, corpus)?;
    type RawRecord = (
        Option<Vec<u8>>,
        Option<String>,
        Option<String>,
        Option<String>,
    );
    let raw: Option<RawRecord> = conn
        .query_row(
            &format!(
                "SELECT embedding, embedding_hash, embedding_model, embedding_generated_at
                 FROM {t} WHERE id = ?1",
                t = corpus.as_str()
            ),
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let Some((Some(blob), Some(hash), model, generated_at)) = raw else {
        return Ok(None);
    };
    let generated_at = match generated_at {
        Some(ts) => parse_timestamp(&ts)?,
        None => DateTime::<Utc>::MIN_UTC,
    };
    Ok(Some(EmbeddingRecord::new(
        id,
        bytes_to_f32_vec(&blob),
        hash,
        model.unwrap_or_default(),
        generated_at,
    )))
}

/// Entities with no vector or whose stored hash differs from the SHA-256
/// of their current searchable text, in table order.
pub fn needs_embedding(
    conn: &Connection,
    corpus: Corpus,
    limit: Option<usize>,
) -> SiftResult<Vec<Entity>> {
    if limit == Some(0) {
        return Ok(Vec::new());
    }
    let mut stale = Vec::new();
    scan_staleness(conn, corpus, |entity, is_stale| {
        if is_stale {
            stale.push(entity);
        }
        limit.map_or(true, |l| stale.len() < l)
    })?;
    Ok(stale)
}

pub fn coverage(conn: &Connection, corpus: Corpus) -> SiftResult<CoverageStats> {
    let mut stats = CoverageStats {
        corpus,
        total_entities: 0,
        embedded: 0,
        needs_embedding: 0,
    };
    let embedded = embedded_count(conn, corpus)?;
    scan_staleness(conn, corpus, |_, is_stale| {
        stats.total_entities += 1;
        if is_stale {
            stats.needs_embedding += 1;
        }
        true
    })?;
    stats.embedded = embedded;
    Ok(stats)
}

fn embedded_count(conn: &Connection, corpus: Corpus) -> SiftResult<usize> {
    let count: i64 = conn
        .query_row(
            &format!(
                "SELECT COUNT(*) FROM {t} WHERE embedding IS NOT NULL",
                t = corpus.as_str()
            ),
            [],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as usize)
}

/// Visit every entity with its staleness flag until `visit` returns false.
fn scan_staleness<F>(conn: &Connection, corpus: Corpus, mut visit: F) -> SiftResult<()>
where
    F: FnMut(Entity, bool) -> bool,
{
    ensure_schema(conn, corpus)?;
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ENTITY_COLUMNS}, embedding IS NOT NULL, embedding_hash
             FROM {t}
             ORDER BY rowid",
            t = corpus.as_str()
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut rows = stmt.query([]).map_err(|e| to_storage_err(e.to_string()))?;
    while let Some(row) = rows.next().map_err(|e| to_storage_err(e.to_string()))? {
        let entity = parse_entity_row(row, corpus, 0)?;
        let has_vector: bool = row.get(5).map_err(|e| to_storage_err(e.to_string()))?;
        let stored_hash: Option<String> = row.get(6).map_err(|e| to_storage_err(e.to_string()))?;
        let is_stale = !has_vector || stored_hash.as_deref() != Some(entity.content_hash().as_str());
        if !visit(entity, is_stale) {
            break;
        }
    }
    Ok(())
}

fn parse_timestamp(ts: &str) -> SiftResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| to_storage_err(format!("bad embedding_generated_at {ts:?}: {e}")))
}
