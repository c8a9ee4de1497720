use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;

/// A stored vector together with the fingerprint of the text that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    pub entity_id: String,
    pub vector: Vec<f32>,
    pub content_hash: String,
    pub model: String,
    pub dimensions: usize,
    pub generated_at: DateTime<Utc>,
}

impl EmbeddingRecord {
    pub fn new(
        entity_id: impl Into<String>,
        vector: Vec<f32>,
        content_hash: impl Into<String>,
        model: impl Into<String>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let dimensions = vector.len();
        Self {
            entity_id: entity_id.into(),
            vector,
            content_hash: content_hash.into(),
            model: model.into(),
            dimensions,
            generated_at,
        }
    }

    /// Stale when the entity's current text no longer hashes to the stored fingerprint.
    pub fn is_stale_for(&self, entity: &Entity) -> bool {
        self.content_hash != entity.content_hash()
    }
}

/// A vector-search candidate, hydrated with its display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityHit {
    pub entity: Entity,
    /// Cosine similarity in [-1, 1].
    pub similarity: f64,
}
