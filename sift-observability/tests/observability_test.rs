//! Tests for degradation tracking, span macros and subscriber setup.

use std::sync::Arc;

use chrono::Duration;
use sift_core::clock::{Clock, ManualClock};
use sift_core::models::DegradationEvent;
use sift_observability::tracing_setup::spans::names;
use sift_observability::{DegradationTracker, RecoveryStatus};

fn tracker() -> (DegradationTracker, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    (DegradationTracker::with_clock(clock.clone()), clock)
}

fn event(clock: &ManualClock, component: &str, fallback: &str) -> DegradationEvent {
    DegradationEvent::new(component, "provider down", fallback, clock.now())
}

#[test]
fn record_and_recover() {
    let (mut tracker, clock) = tracker();
    assert!(tracker.record(event(&clock, "embeddings", "lexical_only")));
    assert!(tracker.is_degraded("embeddings"));
    assert_eq!(tracker.active_degradations().len(), 1);

    assert_eq!(tracker.mark_recovered("embeddings"), 1);
    assert!(!tracker.is_degraded("embeddings"));
    assert!(tracker.active_degradations().is_empty());
    let tracked = &tracker.events()[0];
    assert_eq!(tracked.recovery_status, RecoveryStatus::Recovered);
    assert_eq!(tracked.recovered_at, Some(clock.now()));
    assert_eq!(tracker.mark_recovered("embeddings"), 0);
}

#[test]
fn repeated_active_degradation_is_stored_once() {
    let (mut tracker, clock) = tracker();
    assert!(tracker.record(event(&clock, "embeddings", "lexical_only")));
    assert!(!tracker.record(event(&clock, "embeddings", "lexical_only")));
    assert!(tracker.record(event(&clock, "reranker", "pass_through")));
    assert_eq!(tracker.events().len(), 2);

    tracker.mark_recovered("embeddings");
    assert!(tracker.record(event(&clock, "embeddings", "lexical_only")));
    assert_eq!(tracker.events().len(), 3);
}

#[test]
fn recent_counts_follow_the_injected_clock() {
    let (mut tracker, clock) = tracker();
    tracker.record(event(&clock, "embeddings", "lexical_only"));
    tracker.mark_recovered("embeddings");
    clock.advance(Duration::minutes(30));
    tracker.record(event(&clock, "embeddings", "lexical_only"));
    tracker.record(event(&clock, "reranker", "pass_through"));

    assert_eq!(tracker.count_recent("embeddings", 3600), 2);
    assert_eq!(tracker.count_all_recent(3600), 3);

    clock.advance(Duration::minutes(45));
    assert_eq!(tracker.count_recent("embeddings", 3600), 1);
    assert_eq!(tracker.count_all_recent(3600), 2);
    assert_eq!(
        tracker.degraded_duration("reranker"),
        Some(Duration::minutes(45))
    );
    assert_eq!(tracker.degraded_duration("lexical_search"), None);
}

#[test]
fn prune_keeps_active_events() {
    let (mut tracker, clock) = tracker();
    tracker.record(event(&clock, "embeddings", "lexical_only"));
    tracker.record(event(&clock, "reranker", "pass_through"));
    tracker.mark_recovered("reranker");
    clock.advance(Duration::hours(2));

    assert_eq!(tracker.prune(3600), 1);
    assert_eq!(tracker.events().len(), 1);
    assert_eq!(tracker.events()[0].event.component, "embeddings");
}

#[test]
fn span_macros_use_exported_names() {
    let search = sift_observability::search_span!("send email", "nodes");
    let embedding = sift_observability::embedding_span!("openai", 3usize);
    let rerank = sift_observability::rerank_span!("rerank-english-v3.0", 10usize);
    for (span, name) in [
        (search, names::SEARCH),
        (embedding, names::EMBEDDING),
        (rerank, names::RERANK),
    ] {
        if let Some(meta) = span.metadata() {
            assert_eq!(meta.name(), name);
        }
    }
}

#[test]
fn init_tracing_is_idempotent() {
    sift_observability::init_tracing_with_filter("debug");
    sift_observability::init_tracing();
    tracing::info!("still logging after repeated init");
}
