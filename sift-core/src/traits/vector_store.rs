use crate::errors::SiftResult;
use crate::models::{Corpus, CoverageStats, EmbeddingRecord, Entity, SimilarityHit};

/// Per-entity vectors with content fingerprints, searched by brute-force cosine scan.
pub trait IVectorStore: Send + Sync {
    /// Whether the vector and fingerprint columns exist for `corpus`.
    /// A missing schema is a capability signal, not an error.
    fn is_ready(&self, corpus: Corpus) -> SiftResult<bool>;

    /// Overwrite the embedding of one entity.
    fn save(&self, corpus: Corpus, record: &EmbeddingRecord) -> SiftResult<()>;

    /// Save every record or none of them.
    fn save_batch(&self, corpus: Corpus, records: &[EmbeddingRecord]) -> SiftResult<usize>;

    fn get(&self, corpus: Corpus, entity_id: &str) -> SiftResult<Option<Vec<f32>>>;

    fn get_record(&self, corpus: Corpus, entity_id: &str) -> SiftResult<Option<EmbeddingRecord>>;

    /// Candidates with similarity >= `threshold`, best first, at most `limit`.
    fn find_similar(
        &self,
        corpus: Corpus,
        query: &[f32],
        limit: usize,
        threshold: f64,
    ) -> SiftResult<Vec<SimilarityHit>>;

    /// Entities without a vector or whose stored hash no longer matches their text.
    fn needs_embedding(&self, corpus: Corpus, limit: Option<usize>) -> SiftResult<Vec<Entity>>;

    fn coverage(&self, corpus: Corpus) -> SiftResult<CoverageStats>;
}
