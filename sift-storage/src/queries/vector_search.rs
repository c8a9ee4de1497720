//! Brute-force cosine similarity scan over stored embeddings.
//!
//! Every stored vector of the target corpus is loaded and scored, so cost
//! grows linearly with corpus size. That is fine for corpora in the low
//! thousands; larger corpora need an index this module does not provide.

use rusqlite::Connection;

use sift_core::errors::SiftResult;
use sift_core::models::{Corpus, SimilarityHit};

use super::entity_crud::{parse_entity_row, ENTITY_COLUMNS};
use crate::to_storage_err;

/// Candidates scoring at least `threshold`, ordered by similarity
/// descending (ties by id), truncated to `limit`.
pub fn find_similar(
    conn: &Connection,
    corpus: Corpus,
    query: &[f32],
    limit: usize,
    threshold: f64,
) -> SiftResult<Vec<SimilarityHit>> {
    if limit == 0 || query.is_empty() {
        return Ok(Vec::new());
    }

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ENTITY_COLUMNS}, embedding, embedding_dimensions
             FROM {t}
             WHERE embedding IS NOT NULL",
            t = corpus.as_str()
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut rows = stmt.query([]).map_err(|e| to_storage_err(e.to_string()))?;
    let mut scored: Vec<SimilarityHit> = Vec::new();
    while let Some(row) = rows.next().map_err(|e| to_storage_err(e.to_string()))? {
        let dims: Option<i64> = row.get(6).map_err(|e| to_storage_err(e.to_string()))?;
        // Skip dimension mismatches without deserializing the vector.
        if dims.map(|d| d as usize) != Some(query.len()) {
            continue;
        }
        let blob: Vec<u8> = row.get(5).map_err(|e| to_storage_err(e.to_string()))?;
        let stored = bytes_to_f32_vec(&blob);
        if stored.len() != query.len() {
            continue;
        }
        let similarity = cosine_similarity(query, &stored);
        if similarity < threshold {
            continue;
        }
        let entity = parse_entity_row(row, corpus, 0)?;
        scored.push(SimilarityHit { entity, similarity });
    }

    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.entity.id.cmp(&b.entity.id))
    });
    scored.truncate(limit);
    Ok(scored)
}

/// Cosine similarity clamped to [-1, 1]. Zero-norm inputs score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a: f64 = a
        .iter()
        .map(|x| (*x as f64) * (*x as f64))
        .sum::<f64>()
        .sqrt();
    let norm_b: f64 = b
        .iter()
        .map(|x| (*x as f64) * (*x as f64))
        .sum::<f64>()
        .sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let sim = dot / (norm_a * norm_b);
    if sim.is_nan() {
        return 0.0;
    }
    sim.clamp(-1.0, 1.0)
}

/// Convert f32 slice to bytes (little-endian).
pub(crate) fn f32_vec_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes back to an f32 vec. Trailing partial chunks are ignored.
pub(crate) fn bytes_to_f32_vec(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_roundtrip_is_lossless() {
        let v = vec![0.0, -1.5, 3.25, f32::MIN_POSITIVE];
        assert_eq!(bytes_to_f32_vec(&f32_vec_to_bytes(&v)), v);
    }

    #[test]
    fn zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn parallel_and_opposite_vectors() {
        assert!((cosine_similarity(&[1.0, 2.0], &[2.0, 4.0]) - 1.0).abs() < 1e-12);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
    }
}
