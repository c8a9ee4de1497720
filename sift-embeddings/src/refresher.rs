//! Regenerate stale or missing embeddings for a corpus.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use sift_core::blocking::run_blocking;
use sift_core::clock::Clock;
use sift_core::errors::SiftResult;
use sift_core::models::{Corpus, EmbeddingRecord, EmbeddingUsage};
use sift_core::traits::IVectorStore;

use crate::service::EmbeddingService;

/// Outcome of one refresh pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshReport {
    pub corpus: Corpus,
    /// Entities that needed an embedding when the pass started.
    pub stale: usize,
    /// Entities whose new embedding was committed.
    pub embedded: usize,
    pub batches_committed: usize,
    pub usage: EmbeddingUsage,
    /// Set when the provider gave out before every batch was done.
    pub stopped_early: Option<String>,
}

impl RefreshReport {
    pub fn remaining(&self) -> usize {
        self.stale - self.embedded
    }
}

pub struct EmbeddingRefresher {
    store: Arc<dyn IVectorStore>,
    service: Arc<EmbeddingService>,
    clock: Arc<dyn Clock>,
}

impl EmbeddingRefresher {
    pub fn new(
        store: Arc<dyn IVectorStore>,
        service: Arc<EmbeddingService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            service,
            clock,
        }
    }

    /// Embed every stale entity of `corpus`, one service batch at a time.
    ///
    /// Each batch is saved atomically as soon as it is embedded. An embedding
    /// failure ends the pass with the committed batches kept; storage errors
    /// are returned.
    pub async fn refresh(&self, corpus: Corpus) -> SiftResult<RefreshReport> {
        let store = self.store.clone();
        let stale = run_blocking(move || store.needs_embedding(corpus, None)).await?;
        let mut report = RefreshReport {
            corpus,
            stale: stale.len(),
            embedded: 0,
            batches_committed: 0,
            usage: EmbeddingUsage::default(),
            stopped_early: None,
        };
        if stale.is_empty() {
            return Ok(report);
        }
        info!(corpus = %corpus, stale = stale.len(), "refreshing embeddings");

        for (batch_index, chunk) in stale.chunks(self.service.batch_size()).enumerate() {
            if batch_index > 0 && !self.service.inter_batch_delay().is_zero() {
                tokio::time::sleep(self.service.inter_batch_delay()).await;
            }
            let texts: Vec<String> = chunk.iter().map(|e| e.searchable_text()).collect();
            let output = match self.service.embed(&texts).await {
                Ok(output) => output,
                Err(e) => {
                    warn!(
                        corpus = %corpus,
                        batch_index,
                        committed = report.embedded,
                        error = %e,
                        "embedding refresh stopped"
                    );
                    report.stopped_early = Some(e.to_string());
                    break;
                }
            };

            let generated_at = self.clock.now();
            let model = self.service.model().to_string();
            let records: Vec<EmbeddingRecord> = chunk
                .iter()
                .zip(output.vectors)
                .map(|(entity, vector)| {
                    EmbeddingRecord::new(
                        entity.id.clone(),
                        vector,
                        entity.content_hash(),
                        model.clone(),
                        generated_at,
                    )
                })
                .collect();

            let store = self.store.clone();
            let saved = run_blocking(move || store.save_batch(corpus, &records)).await?;
            report.embedded += saved;
            report.batches_committed += 1;
            report.usage.add(output.usage);
        }

        info!(
            corpus = %corpus,
            embedded = report.embedded,
            remaining = report.remaining(),
            tokens = report.usage.tokens,
            "embedding refresh finished"
        );
        Ok(report)
    }
}
