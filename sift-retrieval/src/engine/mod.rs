//! HybridSearchEngine: cache lookup, parallel lexical + vector search,
//! RRF fusion, optional rerank, truncation and cache write.

mod branches;
mod builder;
mod response;

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use tracing::{debug, warn, Instrument};

use sift_core::blocking::run_blocking;
use sift_core::clock::Clock;
use sift_core::config::{RetrievalConfig, SiftConfig};
use sift_core::constants::{components, fallbacks};
use sift_core::errors::{RetrievalError, SiftError, SiftResult};
use sift_core::models::{
    Corpus, DegradationEvent, EngineStatistics, LexicalHit, ReadinessReport, SearchCounters,
    SearchMode, SearchOptions, SearchResult, SimilarityHit, SourceMethod,
};
use sift_core::traits::{ILexicalSearch, IReranker, IVectorStore};
use sift_embeddings::{ApiEmbeddingProvider, EmbeddingService};
use sift_observability::search_span;
use sift_observability::tracing_setup::events;
use sift_observability::DegradationTracker;

use crate::cache::{cache_key, ResultCache};
use crate::fusion::optimal_k;
use crate::rerank::{ApiReranker, RerankOutcome, RerankStage};

use branches::{
    fused_results, is_schema_not_ready, lexical_results, vector_component, vector_results, Branch,
};
pub use builder::EngineBuilder;
pub use response::{CombinedSearchResponse, SearchResponse, SearchStage};

#[derive(Debug, Default)]
struct Counters {
    total: AtomicU64,
    cache_hits: AtomicU64,
    degraded: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> SearchCounters {
        SearchCounters {
            total: self.total.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Per-query bookkeeping.
struct QueryRun {
    corpus: Corpus,
    stages: Vec<SearchStage>,
    degradations: Vec<DegradationEvent>,
    /// A requested search branch produced nothing, so the answer is partial.
    branch_lost: bool,
}

impl QueryRun {
    fn new(corpus: Corpus) -> Self {
        Self {
            corpus,
            stages: vec![SearchStage::Idle],
            degradations: Vec::new(),
            branch_lost: false,
        }
    }

    fn enter(&mut self, stage: SearchStage) {
        self.stages.push(stage);
    }
}

/// The hybrid search engine. Owns its caches and degradation history;
/// storage and providers are shared behind trait objects.
pub struct HybridSearchEngine {
    lexical: Option<Arc<dyn ILexicalSearch>>,
    vectors: Option<Arc<dyn IVectorStore>>,
    embeddings: Option<Arc<EmbeddingService>>,
    rerank: RerankStage,
    cache: ResultCache,
    config: RetrievalConfig,
    degradation_window_secs: i64,
    clock: Arc<dyn Clock>,
    tracker: Mutex<DegradationTracker>,
    counters: Counters,
}

impl HybridSearchEngine {
    /// Engine over one store that serves both lexical and vector search,
    /// with the HTTP embedding and rerank clients described by `config`.
    pub fn from_config<S>(config: SiftConfig, store: Arc<S>) -> SiftResult<Self>
    where
        S: ILexicalSearch + IVectorStore + 'static,
    {
        let provider = Arc::new(ApiEmbeddingProvider::from_config(&config.embedding)?);
        let reranker = Arc::new(ApiReranker::from_config(&config.rerank)?);
        EngineBuilder::new(config)
            .lexical(store.clone())
            .vector_store(store)
            .embedding_provider(provider)
            .reranker(reranker)
            .build()
    }

    pub fn builder(config: SiftConfig) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    fn assemble(
        config: SiftConfig,
        lexical: Option<Arc<dyn ILexicalSearch>>,
        vectors: Option<Arc<dyn IVectorStore>>,
        embeddings: Option<Arc<EmbeddingService>>,
        reranker: Option<Arc<dyn IReranker>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            lexical,
            vectors,
            embeddings,
            rerank: RerankStage::new(reranker, &config.rerank),
            cache: ResultCache::new(&config.cache, clock.clone()),
            config: config.retrieval,
            degradation_window_secs: config.observability.degradation_window_secs,
            tracker: Mutex::new(DegradationTracker::with_clock(clock.clone())),
            clock,
            counters: Counters::default(),
        }
    }

    /// Search the nodes corpus.
    pub async fn search(&self, query: &str, options: &SearchOptions) -> SiftResult<SearchResponse> {
        self.search_corpus(Corpus::Nodes, query, options).await
    }

    /// Search the templates corpus.
    pub async fn search_templates(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> SiftResult<SearchResponse> {
        self.search_corpus(Corpus::Templates, query, options).await
    }

    pub async fn search_corpus(
        &self,
        corpus: Corpus,
        query: &str,
        options: &SearchOptions,
    ) -> SiftResult<SearchResponse> {
        let span = search_span!(query, corpus);
        self.run_pipeline(corpus, query, options).instrument(span).await
    }

    /// Search both corpora at once. The limit is split by
    /// `combined_node_share` (70/30 by default) and each corpus runs its own
    /// pipeline. If one corpus fails the other's results are still returned.
    pub async fn search_combined(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> SiftResult<CombinedSearchResponse> {
        if query.trim().is_empty() {
            return Ok(CombinedSearchResponse::empty());
        }
        let limit = self.resolve_limit(options)?;
        let (node_limit, template_limit) = split_limit(limit, self.config.combined_node_share);

        let (nodes, templates) = tokio::join!(
            self.search_part(Corpus::Nodes, query, options, node_limit),
            self.search_part(Corpus::Templates, query, options, template_limit),
        );

        let (nodes, templates, extra) = match (nodes, templates) {
            (Ok(n), Ok(t)) => (n, t, None),
            (Ok(n), Err(e)) => {
                let event = self.partial_failure(components::TEMPLATE_SEARCH, &e);
                (n, SearchResponse::empty(), Some(event))
            }
            (Err(e), Ok(t)) => {
                let event = self.partial_failure(components::NODE_SEARCH, &e);
                (SearchResponse::empty(), t, Some(event))
            }
            (Err(node_err), Err(template_err)) => {
                return Err(RetrievalError::SearchUnavailable {
                    reason: format!("nodes: {node_err}; templates: {template_err}"),
                }
                .into());
            }
        };

        let mut degradations = nodes.degradations;
        degradations.extend(templates.degradations);
        degradations.extend(extra);
        let mut results = Vec::with_capacity(nodes.results.len() + templates.results.len());
        results.extend(nodes.results.iter().cloned());
        results.extend(templates.results.iter().cloned());
        Ok(CombinedSearchResponse {
            degraded: nodes.degraded || templates.degraded || !degradations.is_empty(),
            nodes: nodes.results,
            templates: templates.results,
            results,
            degradations,
        })
    }

    async fn search_part(
        &self,
        corpus: Corpus,
        query: &str,
        options: &SearchOptions,
        limit: usize,
    ) -> SiftResult<SearchResponse> {
        if limit == 0 {
            return Ok(SearchResponse::empty());
        }
        let options = options.clone().with_limit(limit);
        self.search_corpus(corpus, query, &options).await
    }

    /// Probe every subsystem. Probe errors count as not ready.
    pub async fn is_ready(&self) -> ReadinessReport {
        let (vector_nodes, vector_templates) = match self.vectors.clone() {
            Some(store) => run_blocking(move || {
                Ok((
                    store.is_ready(Corpus::Nodes).unwrap_or(false),
                    store.is_ready(Corpus::Templates).unwrap_or(false),
                ))
            })
            .await
            .unwrap_or((false, false)),
            None => (false, false),
        };
        ReadinessReport {
            lexical: self.lexical.as_ref().is_some_and(|l| l.is_available()),
            vector_nodes,
            vector_templates,
            embeddings: self.embeddings.as_ref().is_some_and(|e| e.is_available()),
            reranker: self.rerank.is_available(),
        }
    }

    /// Coverage of every corpus with a vector schema, plus cache, provider,
    /// rerank and search counters.
    pub async fn get_statistics(&self) -> SiftResult<EngineStatistics> {
        let coverage = match self.vectors.clone() {
            Some(store) => {
                run_blocking(move || {
                    let mut coverage = Vec::with_capacity(Corpus::ALL.len());
                    for corpus in Corpus::ALL {
                        if store.is_ready(corpus)? {
                            coverage.push(store.coverage(corpus)?);
                        }
                    }
                    Ok(coverage)
                })
                .await?
            }
            None => Vec::new(),
        };
        let tracker = self.tracker();
        Ok(EngineStatistics {
            coverage,
            result_cache: self.cache.stats(),
            embeddings: self.embeddings.as_ref().map(|e| e.stats()),
            rerank: self.rerank.stats(),
            searches: self.counters.snapshot(),
            active_degradations: tracker.active_degradations().len(),
            recent_degradations: tracker.count_all_recent(self.degradation_window_secs),
        })
    }

    /// Empty the result cache and the query embedding cache.
    pub fn clear_cache(&self) {
        self.cache.clear();
        if let Some(embeddings) = &self.embeddings {
            embeddings.clear_cache();
        }
        debug!("caches cleared");
    }

    fn resolve_limit(&self, options: &SearchOptions) -> SiftResult<usize> {
        match options.limit.unwrap_or(self.config.default_limit) {
            0 => Err(SiftError::InvalidQuery {
                reason: "limit must be at least 1".to_string(),
            }),
            limit => Ok(limit),
        }
    }

    async fn run_pipeline(
        &self,
        corpus: Corpus,
        query: &str,
        options: &SearchOptions,
    ) -> SiftResult<SearchResponse> {
        let started = Instant::now();
        if query.trim().is_empty() {
            return Ok(SearchResponse::empty());
        }
        self.counters.total.fetch_add(1, Ordering::Relaxed);
        let limit = match self.resolve_limit(options) {
            Ok(limit) => limit,
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                return Err(e);
            }
        };
        let mode = options.mode.unwrap_or_default();
        let rerank = options
            .enable_reranking
            .unwrap_or(self.rerank.enabled_by_default());

        let key = cache_key(query, corpus, limit, mode, rerank);
        if let Some(results) = self.cache.get(&key) {
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            events::search_completed(
                corpus.as_str(),
                results.len(),
                true,
                false,
                elapsed_ms(started),
            );
            return Ok(SearchResponse::cached(results));
        }

        let mut run = QueryRun::new(corpus);
        match self.execute(&mut run, query, limit, mode, rerank).await {
            Ok(results) => {
                let degraded = !run.degradations.is_empty();
                if degraded {
                    self.counters.degraded.fetch_add(1, Ordering::Relaxed);
                }
                run.enter(SearchStage::CacheWrite);
                // Answers missing a whole branch are not cached.
                if !run.branch_lost {
                    self.cache.insert(key, results.clone());
                }
                run.enter(SearchStage::Done);
                events::search_completed(
                    corpus.as_str(),
                    results.len(),
                    false,
                    degraded,
                    elapsed_ms(started),
                );
                Ok(SearchResponse {
                    results,
                    degraded,
                    degradations: run.degradations,
                    stages: run.stages,
                    cache_hit: false,
                })
            }
            Err(e) => {
                run.enter(SearchStage::Failed);
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                warn!(corpus = %corpus, error = %e, stages = ?run.stages, "search failed");
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        run: &mut QueryRun,
        query: &str,
        limit: usize,
        mode: SearchMode,
        rerank: bool,
    ) -> SiftResult<Vec<SearchResult>> {
        let corpus = run.corpus;
        let candidate_limit = limit.saturating_mul(self.config.candidate_multiplier.max(1));

        run.enter(SearchStage::DispatchingParallelSearch);
        let (lexical, vector) = tokio::join!(
            self.lexical_branch(corpus, query, candidate_limit, mode.includes_lexical()),
            self.vector_branch(corpus, query, candidate_limit, mode.includes_vector()),
        );

        let results = self
            .merge_branches(run, query, candidate_limit, lexical, vector)
            .await?;
        let mut results = self.rerank_step(run, query, results, rerank).await;

        run.enter(SearchStage::Truncating);
        results.truncate(limit);
        Ok(results)
    }

    /// Fuse when both branches have hits, pass a lone list through, and fall
    /// back to the surviving branch when a requested one is down.
    async fn merge_branches(
        &self,
        run: &mut QueryRun,
        query: &str,
        candidate_limit: usize,
        lexical: Branch<LexicalHit>,
        vector: Branch<SimilarityHit>,
    ) -> SiftResult<Vec<SearchResult>> {
        match (lexical, vector) {
            (Branch::Ready(l), Branch::Ready(v)) if l.is_empty() => {
                Ok(vector_results(v, SourceMethod::Vector))
            }
            (Branch::Ready(l), Branch::Ready(v)) if v.is_empty() => {
                Ok(self.lexical_only(l, SourceMethod::Lexical))
            }
            (Branch::Ready(l), Branch::Ready(v)) => {
                run.enter(SearchStage::Fusing);
                let k = self.fusion_k(&l, &v);
                fused_results(
                    l,
                    v,
                    self.config.lexical_weight,
                    self.config.vector_weight,
                    k,
                )
            }
            (Branch::Ready(l), Branch::Skipped) => Ok(self.lexical_only(l, SourceMethod::Lexical)),
            (Branch::Skipped, Branch::Ready(v)) => Ok(vector_results(v, SourceMethod::Vector)),
            (Branch::Ready(l), Branch::Down(e)) => {
                self.lose_branch(
                    run,
                    vector_component(&e),
                    &e.to_string(),
                    fallbacks::LEXICAL_ONLY,
                );
                Ok(self.lexical_only(l, SourceMethod::Fallback))
            }
            (Branch::Down(e), Branch::Ready(v)) => {
                self.lose_branch(
                    run,
                    components::LEXICAL_SEARCH,
                    &e.to_string(),
                    fallbacks::VECTOR_ONLY,
                );
                Ok(vector_results(v, SourceMethod::Fallback))
            }
            (Branch::Skipped, Branch::Down(e))
                if is_schema_not_ready(&e) && self.lexical.is_some() =>
            {
                self.lose_branch(
                    run,
                    components::VECTOR_SEARCH,
                    &e.to_string(),
                    fallbacks::LEXICAL_ONLY,
                );
                match self
                    .lexical_branch(run.corpus, query, candidate_limit, true)
                    .await
                {
                    Branch::Ready(l) => Ok(self.lexical_only(l, SourceMethod::Fallback)),
                    Branch::Down(lexical_err) => Err(lexical_err),
                    Branch::Skipped => Err(e),
                }
            }
            (Branch::Skipped, Branch::Down(e)) | (Branch::Down(e), Branch::Skipped) => Err(e),
            (Branch::Down(lexical_err), Branch::Down(vector_err)) => {
                Err(RetrievalError::SearchUnavailable {
                    reason: format!("lexical: {lexical_err}; vector: {vector_err}"),
                }
                .into())
            }
            (Branch::Skipped, Branch::Skipped) => Ok(Vec::new()),
        }
    }

    async fn rerank_step(
        &self,
        run: &mut QueryRun,
        query: &str,
        results: Vec<SearchResult>,
        requested: bool,
    ) -> Vec<SearchResult> {
        if !requested || results.is_empty() {
            run.enter(SearchStage::SkipRerank);
            return results;
        }
        if !self.rerank.is_available() {
            run.enter(SearchStage::SkipRerank);
            self.rerank.record_skip("reranker unavailable", results.len());
            return results;
        }

        run.enter(SearchStage::Reranking);
        match self.rerank.apply(query, results).await {
            RerankOutcome::Reranked(results) => {
                self.recovered(components::RERANKER);
                results
            }
            RerankOutcome::PassedThrough { results, reason } => {
                self.degrade(run, components::RERANKER, &reason, fallbacks::PASS_THROUGH);
                results
            }
        }
    }

    fn lexical_only(&self, hits: Vec<LexicalHit>, source: SourceMethod) -> Vec<SearchResult> {
        let k = if self.config.adaptive_k {
            optimal_k(hits.len())
        } else {
            self.config.rrf_k
        };
        lexical_results(hits, self.config.lexical_weight, k, source)
    }

    fn fusion_k(&self, lexical: &[LexicalHit], vector: &[SimilarityHit]) -> u32 {
        if !self.config.adaptive_k {
            return self.config.rrf_k;
        }
        let distinct: HashSet<&str> = lexical
            .iter()
            .map(|h| h.entity.id.as_str())
            .chain(vector.iter().map(|h| h.entity.id.as_str()))
            .collect();
        optimal_k(distinct.len())
    }

    fn tracker(&self) -> MutexGuard<'_, DegradationTracker> {
        self.tracker.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn degrade(&self, run: &mut QueryRun, component: &str, failure: &str, fallback: &str) {
        events::search_degraded(run.corpus.as_str(), component, failure);
        let event = DegradationEvent::new(component, failure, fallback, self.clock.now());
        {
            let mut tracker = self.tracker();
            tracker.prune(self.degradation_window_secs);
            tracker.record(event.clone());
        }
        run.degradations.push(event);
    }

    fn lose_branch(&self, run: &mut QueryRun, component: &str, failure: &str, fallback: &str) {
        run.branch_lost = true;
        self.degrade(run, component, failure, fallback);
    }

    fn partial_failure(&self, component: &str, error: &SiftError) -> DegradationEvent {
        let failure = error.to_string();
        events::search_degraded("combined", component, &failure);
        let event = DegradationEvent::new(
            component,
            failure,
            fallbacks::PARTIAL_RESULTS,
            self.clock.now(),
        );
        self.tracker().record(event.clone());
        event
    }

    fn recovered(&self, component: &str) {
        self.tracker().mark_recovered(component);
    }
}

/// Split `limit` between nodes and templates. Nodes get the rounded share.
pub(crate) fn split_limit(limit: usize, node_share: f64) -> (usize, usize) {
    let nodes = ((limit as f64) * node_share).round() as usize;
    let nodes = nodes.min(limit);
    (nodes, limit - nodes)
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_limit_splits_seventy_thirty() {
        assert_eq!(split_limit(10, 0.7), (7, 3));
        assert_eq!(split_limit(20, 0.7), (14, 6));
        assert_eq!(split_limit(1, 0.7), (1, 0));
        assert_eq!(split_limit(3, 0.7), (2, 1));
    }
}
