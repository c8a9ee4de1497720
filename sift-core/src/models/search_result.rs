use serde::{Deserialize, Serialize};

use super::{Corpus, DisplayFields, Entity};

/// Which stage(s) produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMethod {
    Lexical,
    Vector,
    Hybrid,
    /// Produced by the surviving branch after a requested branch failed or was not ready.
    Fallback,
}

/// Per-stage score breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreTrace {
    pub lexical_rank: Option<usize>,
    pub vector_rank: Option<usize>,
    pub vector_similarity: Option<f64>,
    pub fused_score: Option<f64>,
    pub rerank_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub entity_id: String,
    pub corpus: Corpus,
    pub fields: DisplayFields,
    pub relevance_score: f64,
    pub source_method: SourceMethod,
    pub score_trace: ScoreTrace,
}

impl SearchResult {
    pub fn from_entity(
        entity: Entity,
        relevance_score: f64,
        source_method: SourceMethod,
        score_trace: ScoreTrace,
    ) -> Self {
        Self {
            entity_id: entity.id,
            corpus: entity.corpus,
            fields: entity.fields,
            relevance_score,
            source_method,
            score_trace,
        }
    }
}

/// A lexical adapter hit. `rank` is 1-based and authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalHit {
    pub entity: Entity,
    pub rank: usize,
}
