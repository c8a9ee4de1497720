//! Structured log events for key pipeline operations.
//!
//! Each function emits a `tracing` event with structured fields.

/// Log a completed search.
pub fn search_completed(corpus: &str, results: usize, cache_hit: bool, degraded: bool, elapsed_ms: u64) {
    tracing::info!(
        event = "search_completed",
        corpus = %corpus,
        results = results,
        cache_hit = cache_hit,
        degraded = degraded,
        elapsed_ms = elapsed_ms,
        "search completed"
    );
}

/// Log a search that fell back to a lower-quality mode.
pub fn search_degraded(corpus: &str, component: &str, reason: &str) {
    tracing::warn!(
        event = "search_degraded",
        corpus = %corpus,
        component = %component,
        reason = %reason,
        "search degraded"
    );
}

/// Log a swallowed cache write failure.
pub fn cache_write_failed(cache: &str, reason: &str) {
    tracing::warn!(
        event = "cache_write_failed",
        cache = %cache,
        reason = %reason,
        "cache write failed"
    );
}

/// Log a rerank stage that passed its input through.
pub fn rerank_skipped(reason: &str, candidates: usize) {
    tracing::debug!(
        event = "rerank_skipped",
        reason = %reason,
        candidates = candidates,
        "rerank skipped"
    );
}

/// Log an embedding batch that exhausted its retries.
pub fn embedding_batch_failed(provider: &str, batch_index: usize, attempts: u32, error: &str) {
    tracing::error!(
        event = "embedding_batch_failed",
        provider = %provider,
        batch_index = batch_index,
        attempts = attempts,
        error = %error,
        "embedding batch failed"
    );
}

/// Log a degradation trigger event.
pub fn degradation_triggered(component: &str, failure: &str, fallback: &str) {
    tracing::warn!(
        event = "degradation_triggered",
        component = %component,
        failure = %failure,
        fallback = %fallback,
        "degradation triggered"
    );
}
