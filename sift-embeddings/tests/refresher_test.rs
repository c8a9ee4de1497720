//! EmbeddingRefresher over a real StorageEngine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sift_core::clock::ManualClock;
use sift_core::config::{CacheConfig, EmbeddingConfig};
use sift_core::errors::{EmbeddingError, SiftResult};
use sift_core::models::{Corpus, DisplayFields, Entity};
use sift_core::traits::{EmbeddingBatch, IDocumentStore, IEmbeddingProvider, IVectorStore};
use sift_embeddings::{EmbeddingRefresher, EmbeddingService};
use sift_storage::StorageEngine;
use test_fixtures::load_corpus;

/// Deterministic provider that can be told to fail from the n-th call on.
struct CountingProvider {
    calls: AtomicUsize,
    fail_from_call: Option<usize>,
}

impl CountingProvider {
    fn new(fail_from_call: Option<usize>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_from_call,
        }
    }
}

#[async_trait]
impl IEmbeddingProvider for CountingProvider {
    async fn embed_batch(&self, texts: &[String]) -> SiftResult<EmbeddingBatch> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_from_call.is_some_and(|n| call >= n) {
            return Err(EmbeddingError::AuthFailed { status: 401 }.into());
        }
        Ok(EmbeddingBatch {
            vectors: texts
                .iter()
                .map(|t| vec![t.len() as f32, 1.0])
                .collect(),
            total_tokens: texts.len() as u64,
        })
    }
    fn model(&self) -> &str {
        "counting-model"
    }
    fn dimensions(&self) -> usize {
        2
    }
    fn name(&self) -> &str {
        "counting"
    }
}

fn setup(provider: Arc<CountingProvider>) -> (Arc<StorageEngine>, EmbeddingRefresher) {
    let store = Arc::new(StorageEngine::open_in_memory().unwrap());
    store.upsert_entities(&load_corpus(Corpus::Nodes)).unwrap();
    let config = EmbeddingConfig {
        batch_size: 3,
        inter_batch_delay_ms: 0,
        dimensions: 2,
        ..EmbeddingConfig::default()
    };
    let clock = Arc::new(ManualClock::default());
    let service = Arc::new(EmbeddingService::new(
        provider,
        &config,
        &CacheConfig::default(),
        clock.clone(),
    ));
    let refresher = EmbeddingRefresher::new(store.clone(), service, clock);
    (store, refresher)
}

#[tokio::test]
async fn refresh_embeds_every_stale_entity() {
    let provider = Arc::new(CountingProvider::new(None));
    let (store, refresher) = setup(provider.clone());
    let total = store.count_entities(Corpus::Nodes).unwrap();

    let report = refresher.refresh(Corpus::Nodes).await.unwrap();
    assert_eq!(report.stale, total);
    assert_eq!(report.embedded, total);
    assert_eq!(report.batches_committed, total.div_ceil(3));
    assert_eq!(report.remaining(), 0);
    assert!(report.stopped_early.is_none());
    assert_eq!(report.usage.tokens, total as u64);

    let coverage = store.coverage(Corpus::Nodes).unwrap();
    assert_eq!(coverage.needs_embedding, 0);
    assert_eq!(coverage.embedded, total);
    let record = store
        .get_record(Corpus::Nodes, "n8n-nodes-base.slack")
        .unwrap()
        .unwrap();
    assert_eq!(record.model, "counting-model");
    assert_eq!(record.dimensions, 2);

    let again = refresher.refresh(Corpus::Nodes).await.unwrap();
    assert_eq!(again.stale, 0);
    assert_eq!(provider.calls.load(Ordering::SeqCst), total.div_ceil(3));
}

#[tokio::test]
async fn refresh_only_touches_changed_entities() {
    let provider = Arc::new(CountingProvider::new(None));
    let (store, refresher) = setup(provider);
    refresher.refresh(Corpus::Nodes).await.unwrap();

    store
        .upsert_entity(&Entity::new(
            "n8n-nodes-base.code",
            Corpus::Nodes,
            DisplayFields {
                name: "Code".into(),
                description: "Run custom TypeScript".into(),
                category: None,
                tags: Vec::new(),
            },
        ))
        .unwrap();

    let report = refresher.refresh(Corpus::Nodes).await.unwrap();
    assert_eq!(report.stale, 1);
    assert_eq!(report.embedded, 1);
    assert!(store.needs_embedding(Corpus::Nodes, None).unwrap().is_empty());
}

#[tokio::test]
async fn provider_failure_keeps_committed_batches() {
    let provider = Arc::new(CountingProvider::new(Some(1)));
    let (store, refresher) = setup(provider.clone());
    let total = store.count_entities(Corpus::Nodes).unwrap();

    let report = refresher.refresh(Corpus::Nodes).await.unwrap();
    assert_eq!(report.embedded, 3);
    assert_eq!(report.batches_committed, 1);
    assert_eq!(report.remaining(), total - 3);
    assert!(report.stopped_early.is_some());
    // The auth failure is not retried and no later batch is attempted.
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

    assert_eq!(store.coverage(Corpus::Nodes).unwrap().embedded, 3);
}
