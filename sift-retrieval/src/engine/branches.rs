//! The lexical and vector branches, and how their hits become results.

use std::collections::HashMap;

use tracing::{debug, warn};

use sift_core::blocking::run_blocking;
use sift_core::constants::components;
use sift_core::errors::{RetrievalError, SiftError, SiftResult, StorageError};
use sift_core::models::{
    Corpus, Entity, LexicalHit, ScoreTrace, SearchResult, SimilarityHit, SourceMethod,
};

use super::HybridSearchEngine;
use crate::fusion::{fuse, RankedList};

/// What one branch produced for a query.
pub(crate) enum Branch<T> {
    /// The query mode leaves this branch out.
    Skipped,
    Ready(Vec<T>),
    /// Requested but could not run, or ran and failed.
    Down(SiftError),
}

impl HybridSearchEngine {
    pub(crate) async fn lexical_branch(
        &self,
        corpus: Corpus,
        query: &str,
        limit: usize,
        requested: bool,
    ) -> Branch<LexicalHit> {
        if !requested {
            return Branch::Skipped;
        }
        let Some(lexical) = self.lexical.clone().filter(|l| l.is_available()) else {
            return Branch::Down(
                RetrievalError::SearchUnavailable {
                    reason: "no lexical search configured".to_string(),
                }
                .into(),
            );
        };
        let query = query.to_string();
        match run_blocking(move || lexical.search(corpus, &query, limit)).await {
            Ok(hits) => {
                debug!(corpus = %corpus, hits = hits.len(), "lexical branch complete");
                self.recovered(components::LEXICAL_SEARCH);
                Branch::Ready(hits)
            }
            Err(e) => {
                warn!(corpus = %corpus, error = %e, "lexical branch failed");
                Branch::Down(e)
            }
        }
    }

    pub(crate) async fn vector_branch(
        &self,
        corpus: Corpus,
        query: &str,
        limit: usize,
        requested: bool,
    ) -> Branch<SimilarityHit> {
        if !requested {
            return Branch::Skipped;
        }
        let (Some(store), Some(embeddings)) = (self.vectors.clone(), self.embeddings.as_ref())
        else {
            return Branch::Down(
                RetrievalError::SearchUnavailable {
                    reason: "no vector search configured".to_string(),
                }
                .into(),
            );
        };

        let probe = store.clone();
        match run_blocking(move || probe.is_ready(corpus)).await {
            Ok(true) => {}
            Ok(false) => {
                return Branch::Down(
                    StorageError::SchemaNotReady {
                        corpus: corpus.to_string(),
                    }
                    .into(),
                )
            }
            Err(e) => return Branch::Down(e),
        }

        let vector = match embeddings.embed_one(query).await {
            Ok((vector, _usage)) => vector,
            Err(e) => {
                warn!(corpus = %corpus, error = %e, "query embedding failed");
                return Branch::Down(e);
            }
        };
        self.recovered(components::EMBEDDINGS);

        let threshold = self.config.similarity_threshold;
        match run_blocking(move || store.find_similar(corpus, &vector, limit, threshold)).await {
            Ok(hits) => {
                debug!(corpus = %corpus, hits = hits.len(), "vector branch complete");
                self.recovered(components::VECTOR_SEARCH);
                Branch::Ready(hits)
            }
            Err(e) => {
                warn!(corpus = %corpus, error = %e, "vector branch failed");
                Branch::Down(e)
            }
        }
    }
}

/// Component charged with a vector branch failure.
pub(crate) fn vector_component(error: &SiftError) -> &'static str {
    match error {
        SiftError::EmbeddingError(_) => components::EMBEDDINGS,
        _ => components::VECTOR_SEARCH,
    }
}

pub(crate) fn is_schema_not_ready(error: &SiftError) -> bool {
    matches!(
        error,
        SiftError::StorageError(StorageError::SchemaNotReady { .. })
    )
}

/// Lexical hits alone, scored `weight / (k + rank)`.
pub(crate) fn lexical_results(
    mut hits: Vec<LexicalHit>,
    weight: f64,
    k: u32,
    source: SourceMethod,
) -> Vec<SearchResult> {
    hits.sort_by_key(|h| h.rank);
    hits.into_iter()
        .map(|hit| {
            let trace = ScoreTrace {
                lexical_rank: Some(hit.rank),
                ..ScoreTrace::default()
            };
            let score = weight / (k as f64 + hit.rank as f64);
            SearchResult::from_entity(hit.entity, score, source, trace)
        })
        .collect()
}

/// Vector hits alone, scored by cosine similarity.
pub(crate) fn vector_results(hits: Vec<SimilarityHit>, source: SourceMethod) -> Vec<SearchResult> {
    hits.into_iter()
        .enumerate()
        .map(|(i, hit)| {
            let trace = ScoreTrace {
                vector_rank: Some(i + 1),
                vector_similarity: Some(hit.similarity),
                ..ScoreTrace::default()
            };
            SearchResult::from_entity(hit.entity, hit.similarity, source, trace)
        })
        .collect()
}

/// Both lists through weighted RRF.
pub(crate) fn fused_results(
    lexical: Vec<LexicalHit>,
    vector: Vec<SimilarityHit>,
    lexical_weight: f64,
    vector_weight: f64,
    k: u32,
) -> SiftResult<Vec<SearchResult>> {
    let lexical_list = RankedList::new(
        lexical
            .iter()
            .map(|h| (h.entity.id.clone(), h.rank))
            .collect(),
        lexical_weight,
    );
    let vector_list = RankedList::from_ids(vector.iter().map(|h| h.entity.id.clone()), vector_weight);
    let fused = fuse(&lexical_list, &vector_list, k)?;

    let mut similarity: HashMap<String, f64> = HashMap::with_capacity(vector.len());
    let mut entities: HashMap<String, Entity> = HashMap::with_capacity(fused.len());
    for hit in lexical {
        entities.insert(hit.entity.id.clone(), hit.entity);
    }
    for hit in vector {
        similarity.insert(hit.entity.id.clone(), hit.similarity);
        entities.entry(hit.entity.id.clone()).or_insert(hit.entity);
    }

    let mut results = Vec::with_capacity(fused.len());
    for candidate in fused {
        let Some(entity) = entities.remove(&candidate.id) else {
            continue;
        };
        let lexical_rank = candidate.ranks.first().copied().flatten();
        let vector_rank = candidate.ranks.get(1).copied().flatten();
        let source = match (lexical_rank, vector_rank) {
            (Some(_), Some(_)) => SourceMethod::Hybrid,
            (Some(_), None) => SourceMethod::Lexical,
            _ => SourceMethod::Vector,
        };
        let trace = ScoreTrace {
            lexical_rank,
            vector_rank,
            vector_similarity: similarity.get(&candidate.id).copied(),
            fused_score: Some(candidate.score),
            rerank_score: None,
        };
        results.push(SearchResult::from_entity(entity, candidate.score, source, trace));
    }
    Ok(results)
}
