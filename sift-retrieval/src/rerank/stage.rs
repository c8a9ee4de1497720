//! The rerank step of the search pipeline.
//!
//! At most `max_documents` candidates are sent; the rest keep their order
//! behind the reranked prefix. Any failure returns the input unchanged.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{warn, Instrument};

use sift_core::config::RerankConfig;
use sift_core::errors::{RerankError, SiftError, SiftResult};
use sift_core::models::{RerankStats, SearchResult};
use sift_core::retry::RetryPolicy;
use sift_core::traits::{IReranker, RerankScore};
use sift_observability::rerank_span;
use sift_observability::tracing_setup::events;

use super::model_selection::select_model;

/// Result of running the stage.
#[derive(Debug)]
pub enum RerankOutcome {
    Reranked(Vec<SearchResult>),
    /// The input, unchanged, with the reason nothing was reranked.
    PassedThrough {
        results: Vec<SearchResult>,
        reason: String,
    },
}

impl RerankOutcome {
    pub fn into_results(self) -> Vec<SearchResult> {
        match self {
            Self::Reranked(results) | Self::PassedThrough { results, .. } => results,
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    calls: AtomicU64,
    failures: AtomicU64,
    skipped: AtomicU64,
}

pub struct RerankStage {
    reranker: Option<Arc<dyn IReranker>>,
    retry: RetryPolicy,
    enabled_by_default: bool,
    model: String,
    multilingual_model: String,
    max_documents: usize,
    max_document_chars: usize,
    counters: Counters,
}

impl RerankStage {
    pub fn new(reranker: Option<Arc<dyn IReranker>>, config: &RerankConfig) -> Self {
        Self {
            reranker,
            retry: RetryPolicy::from_millis(config.max_retries, config.retry_base_delay_ms),
            enabled_by_default: config.enabled,
            model: config.model.clone(),
            multilingual_model: config.multilingual_model.clone(),
            max_documents: config.max_documents.max(1),
            max_document_chars: config.max_document_chars,
            counters: Counters::default(),
        }
    }

    pub fn enabled_by_default(&self) -> bool {
        self.enabled_by_default
    }

    pub fn is_available(&self) -> bool {
        self.reranker.as_ref().is_some_and(|r| r.is_available())
    }

    /// Count a query that asked for reranking but did not get it.
    pub fn record_skip(&self, reason: &str, candidates: usize) {
        self.counters.skipped.fetch_add(1, Ordering::Relaxed);
        events::rerank_skipped(reason, candidates);
    }

    pub fn stats(&self) -> RerankStats {
        RerankStats {
            calls: self.counters.calls.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
        }
    }

    /// Reorder `results` by cross-encoder relevance.
    pub async fn apply(&self, query: &str, results: Vec<SearchResult>) -> RerankOutcome {
        let Some(reranker) = self.reranker.as_ref().filter(|r| r.is_available()) else {
            let reason = "reranker unavailable".to_string();
            self.record_skip(&reason, results.len());
            return RerankOutcome::PassedThrough { results, reason };
        };
        if results.is_empty() {
            return RerankOutcome::Reranked(results);
        }

        let head_len = results.len().min(self.max_documents);
        let documents: Vec<String> = results[..head_len]
            .iter()
            .map(|r| serialize_candidate(r, self.max_document_chars))
            .collect();
        let model = select_model(query, &self.model, &self.multilingual_model);

        self.counters.calls.fetch_add(1, Ordering::Relaxed);
        let span = rerank_span!(model, head_len);
        let scores = self
            .retry
            .run("rerank", || reranker.rerank(model, query, &documents, head_len))
            .instrument(span)
            .await;

        match scores {
            Ok(scores) => match reorder(results.clone(), head_len, scores) {
                Ok(reranked) => RerankOutcome::Reranked(reranked),
                Err(e) => self.fail(results, &e),
            },
            Err(failure) => self.fail(results, &failure.last_error),
        }
    }

    fn fail(&self, results: Vec<SearchResult>, error: &SiftError) -> RerankOutcome {
        self.counters.failures.fetch_add(1, Ordering::Relaxed);
        warn!(error = %error, candidates = results.len(), "rerank failed, keeping fused order");
        RerankOutcome::PassedThrough {
            results,
            reason: error.to_string(),
        }
    }
}

/// Compact text for one candidate: name, description, category and tags,
/// cut to `max_chars` characters.
pub fn serialize_candidate(result: &SearchResult, max_chars: usize) -> String {
    let fields = &result.fields;
    let mut text = fields.name.trim().to_string();
    let description = fields.description.trim();
    if !description.is_empty() {
        text.push_str(": ");
        text.push_str(description);
    }
    if let Some(category) = fields.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        text.push_str(" | ");
        text.push_str(category);
    }
    let tags: Vec<&str> = fields
        .tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    if !tags.is_empty() {
        text.push_str(" | ");
        text.push_str(&tags.join(", "));
    }
    if text.chars().count() > max_chars {
        text = text.chars().take(max_chars).collect();
    }
    text
}

/// Order the first `head_len` results by score; unscored head entries and
/// the tail follow in their original order with scores clamped so the list
/// stays non-increasing.
fn reorder(
    results: Vec<SearchResult>,
    head_len: usize,
    mut scores: Vec<RerankScore>,
) -> SiftResult<Vec<SearchResult>> {
    let mut seen = HashSet::with_capacity(scores.len());
    for score in &scores {
        if score.index >= head_len || !seen.insert(score.index) {
            return Err(RerankError::MalformedResponse {
                reason: format!("invalid or duplicate index {}", score.index),
            }
            .into());
        }
    }
    // Stable: equal scores keep their original order.
    scores.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.index.cmp(&b.index))
    });

    let mut slots: Vec<Option<SearchResult>> = results.into_iter().map(Some).collect();
    let mut out = Vec::with_capacity(slots.len());
    for score in &scores {
        if let Some(mut result) = slots[score.index].take() {
            result.relevance_score = score.relevance_score;
            result.score_trace.rerank_score = Some(score.relevance_score);
            out.push(result);
        }
    }
    let mut floor = out.last().map(|r| r.relevance_score);
    for mut result in slots.into_iter().flatten() {
        if let Some(f) = floor {
            if result.relevance_score > f {
                result.relevance_score = f;
            }
        }
        floor = Some(result.relevance_score);
        out.push(result);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use sift_core::models::{Corpus, DisplayFields, ScoreTrace, SourceMethod};

    struct FakeReranker {
        calls: Mutex<Vec<(String, Vec<String>)>>,
        fail: bool,
    }

    impl FakeReranker {
        fn new(fail: bool) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl IReranker for FakeReranker {
        async fn rerank(
            &self,
            model: &str,
            _query: &str,
            documents: &[String],
            _top_n: usize,
        ) -> SiftResult<Vec<RerankScore>> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), documents.to_vec()));
            if self.fail {
                return Err(RerankError::RequestFailed {
                    reason: "401".into(),
                    transient: false,
                }
                .into());
            }
            // Reverse the input order.
            let n = documents.len();
            Ok((0..n)
                .map(|i| RerankScore {
                    index: i,
                    relevance_score: (i + 1) as f64 / n as f64,
                })
                .collect())
        }
        fn name(&self) -> &str {
            "fake"
        }
        fn is_available(&self) -> bool {
            true
        }
    }

    fn result(id: &str, score: f64) -> SearchResult {
        SearchResult {
            entity_id: id.to_string(),
            corpus: Corpus::Nodes,
            fields: DisplayFields {
                name: id.to_uppercase(),
                description: format!("about {id}"),
                category: None,
                tags: vec![],
            },
            relevance_score: score,
            source_method: SourceMethod::Hybrid,
            score_trace: ScoreTrace::default(),
        }
    }

    fn ids(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.entity_id.as_str()).collect()
    }

    fn stage(reranker: Arc<FakeReranker>, max_documents: usize) -> RerankStage {
        let config = RerankConfig {
            enabled: true,
            max_documents,
            ..RerankConfig::default()
        };
        RerankStage::new(Some(reranker), &config)
    }

    #[tokio::test]
    async fn reorders_by_relevance() {
        let fake = Arc::new(FakeReranker::new(false));
        let stage = stage(fake.clone(), 1000);
        let input = vec![result("a", 0.3), result("b", 0.2), result("c", 0.1)];
        let out = stage.apply("query", input).await.into_results();
        assert_eq!(ids(&out), vec!["c", "b", "a"]);
        assert_eq!(out[0].relevance_score, 1.0);
        assert_eq!(out[0].score_trace.rerank_score, Some(1.0));
        assert_eq!(stage.stats().calls, 1);
    }

    #[tokio::test]
    async fn excess_candidates_are_appended_unranked() {
        let fake = Arc::new(FakeReranker::new(false));
        let stage = stage(fake.clone(), 2);
        let input = vec![
            result("a", 0.9),
            result("b", 0.8),
            result("c", 0.7),
            result("d", 0.01),
        ];
        let out = stage.apply("query", input).await.into_results();
        assert_eq!(ids(&out), vec!["b", "a", "c", "d"]);
        assert_eq!(fake.calls.lock().unwrap()[0].1.len(), 2);
        // c is clamped to a's rerank score; d already sits below it.
        assert_eq!(out[2].relevance_score, 0.5);
        assert_eq!(out[3].relevance_score, 0.01);
        assert!(out.windows(2).all(|w| w[0].relevance_score >= w[1].relevance_score));
        assert_eq!(out[2].score_trace.rerank_score, None);
    }

    #[tokio::test]
    async fn failure_returns_input_unchanged() {
        let fake = Arc::new(FakeReranker::new(true));
        let stage = stage(fake.clone(), 1000);
        let input = vec![result("a", 0.3), result("b", 0.2)];
        let outcome = stage.apply("query", input.clone()).await;
        assert!(matches!(outcome, RerankOutcome::PassedThrough { .. }));
        assert_eq!(outcome.into_results(), input);
        assert_eq!(stage.stats().failures, 1);
        // Non-transient errors are not retried.
        assert_eq!(fake.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_reranker_passes_through() {
        let stage = RerankStage::new(None, &RerankConfig::default());
        assert!(!stage.is_available());
        let input = vec![result("a", 0.3)];
        let outcome = stage.apply("query", input.clone()).await;
        assert!(matches!(outcome, RerankOutcome::PassedThrough { .. }));
        assert_eq!(stage.stats().skipped, 1);
    }

    #[tokio::test]
    async fn non_latin_query_uses_multilingual_model() {
        let fake = Arc::new(FakeReranker::new(false));
        let stage = stage(fake.clone(), 1000);
        stage.apply("メール送信", vec![result("a", 0.3)]).await;
        stage.apply("send mail", vec![result("a", 0.3)]).await;
        let calls = fake.calls.lock().unwrap();
        assert_eq!(calls[0].0, "rerank-multilingual-v3.0");
        assert_eq!(calls[1].0, "rerank-english-v3.0");
    }

    #[test]
    fn serialized_candidates_are_compact_and_capped() {
        let mut r = result("slack", 0.5);
        r.fields.category = Some("Communication".into());
        r.fields.tags = vec!["chat".into(), " ".into()];
        assert_eq!(
            serialize_candidate(&r, 1000),
            "SLACK: about slack | Communication | chat"
        );
        assert_eq!(serialize_candidate(&r, 5), "SLACK");
    }

    #[test]
    fn out_of_range_scores_are_rejected() {
        let input = vec![result("a", 0.3), result("b", 0.2)];
        let scores = vec![RerankScore {
            index: 2,
            relevance_score: 0.5,
        }];
        assert!(reorder(input, 2, scores).is_err());
    }
}
