//! EmbeddingService: batching, retry, the embed-one cache and cost accounting
//! on top of a single-request provider.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, Instrument};

use sift_core::cache::TtlCache;
use sift_core::clock::Clock;
use sift_core::config::{CacheConfig, EmbeddingConfig};
use sift_core::errors::{EmbeddingError, SiftError, SiftResult};
use sift_core::hashing::sha256_hex;
use sift_core::models::{EmbeddingStats, EmbeddingUsage};
use sift_core::retry::RetryPolicy;
use sift_core::traits::{EmbeddingBatch, IEmbeddingProvider};
use sift_observability::embedding_span;
use sift_observability::tracing_setup::events;

use crate::providers::ApiEmbeddingProvider;

/// Vectors in input order plus the usage they cost.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingOutput {
    pub vectors: Vec<Vec<f32>>,
    pub usage: EmbeddingUsage,
}

#[derive(Debug, Default)]
struct Counters {
    requests: AtomicU64,
    batches: AtomicU64,
    tokens: AtomicU64,
    failures: AtomicU64,
}

pub struct EmbeddingService {
    provider: Arc<dyn IEmbeddingProvider>,
    retry: RetryPolicy,
    batch_size: usize,
    inter_batch_delay: Duration,
    cost_per_million_tokens: f64,
    cache: TtlCache<Vec<f32>>,
    counters: Counters,
}

impl EmbeddingService {
    pub fn new(
        provider: Arc<dyn IEmbeddingProvider>,
        config: &EmbeddingConfig,
        cache_config: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            retry: RetryPolicy::from_millis(config.max_retries, config.retry_base_delay_ms),
            batch_size: config.batch_size.max(1),
            inter_batch_delay: Duration::from_millis(config.inter_batch_delay_ms),
            cost_per_million_tokens: config.cost_per_million_tokens,
            cache: TtlCache::new(
                Duration::from_secs(cache_config.embedding_ttl_secs),
                cache_config.embedding_max_entries,
                clock,
            ),
            counters: Counters::default(),
        }
    }

    /// Service over the HTTP provider described by `config`.
    pub fn from_config(
        config: &EmbeddingConfig,
        cache_config: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> SiftResult<Self> {
        let provider = ApiEmbeddingProvider::from_config(config)?;
        Ok(Self::new(Arc::new(provider), config, cache_config, clock))
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub fn dimensions(&self) -> usize {
        self.provider.dimensions()
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_available()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn inter_batch_delay(&self) -> Duration {
        self.inter_batch_delay
    }

    /// Embed `texts` in order. Batches go out one at a time with a pause
    /// between them; a batch that exhausts its retries fails the whole call
    /// with `ProviderUnavailable`.
    pub async fn embed(&self, texts: &[String]) -> SiftResult<EmbeddingOutput> {
        self.counters.requests.fetch_add(1, Ordering::Relaxed);
        self.embed_uncounted(texts).await
    }

    async fn embed_uncounted(&self, texts: &[String]) -> SiftResult<EmbeddingOutput> {
        if texts.is_empty() {
            return Ok(EmbeddingOutput {
                vectors: Vec::new(),
                usage: EmbeddingUsage::default(),
            });
        }
        if !self.provider.is_available() {
            self.counters.failures.fetch_add(1, Ordering::Relaxed);
            return Err(self.unavailable("provider is not configured"));
        }

        let mut vectors = Vec::with_capacity(texts.len());
        let mut tokens = 0u64;
        for (batch_index, chunk) in texts.chunks(self.batch_size).enumerate() {
            if batch_index > 0 && !self.inter_batch_delay.is_zero() {
                tokio::time::sleep(self.inter_batch_delay).await;
            }
            let span = embedding_span!(self.provider.name(), batch_index);
            let batch = self
                .retry
                .run("embed_batch", || self.checked_batch(chunk))
                .instrument(span)
                .await
                .map_err(|failure| {
                    self.counters.failures.fetch_add(1, Ordering::Relaxed);
                    let error = failure.last_error.to_string();
                    events::embedding_batch_failed(
                        self.provider.name(),
                        batch_index,
                        failure.attempts,
                        &error,
                    );
                    self.unavailable(&format!(
                        "batch {batch_index} failed after {} attempt(s): {error}",
                        failure.attempts
                    ))
                })?;
            self.counters.batches.fetch_add(1, Ordering::Relaxed);
            tokens += batch.total_tokens;
            vectors.extend(batch.vectors);
        }

        self.counters.tokens.fetch_add(tokens, Ordering::Relaxed);
        let usage = EmbeddingUsage::from_tokens(tokens, self.cost_per_million_tokens);
        debug!(
            texts = texts.len(),
            tokens,
            cost_usd = usage.cost_usd,
            "embedding complete"
        );
        Ok(EmbeddingOutput { vectors, usage })
    }

    /// One provider call, held to the trait contract.
    async fn checked_batch(&self, chunk: &[String]) -> SiftResult<EmbeddingBatch> {
        let batch = self.provider.embed_batch(chunk).await?;
        if batch.vectors.len() != chunk.len() {
            return Err(EmbeddingError::MalformedResponse {
                reason: format!(
                    "provider returned {} vectors for {} texts",
                    batch.vectors.len(),
                    chunk.len()
                ),
            }
            .into());
        }
        let expected = self.provider.dimensions();
        if let Some(wrong) = batch.vectors.iter().find(|v| v.len() != expected) {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: wrong.len(),
            }
            .into());
        }
        Ok(batch)
    }

    /// Embed a single text, serving repeats from the cache for its TTL.
    /// A hit costs nothing and reports zero tokens.
    pub async fn embed_one(&self, text: &str) -> SiftResult<(Vec<f32>, EmbeddingUsage)> {
        self.counters.requests.fetch_add(1, Ordering::Relaxed);
        let key = sha256_hex(text);
        if let Some(vector) = self.cache.get(&key) {
            return Ok((vector, EmbeddingUsage::cached()));
        }

        let output = self.embed_uncounted(&[text.to_string()]).await?;
        let usage = output.usage;
        let Some(vector) = output.vectors.into_iter().next() else {
            return Err(EmbeddingError::MalformedResponse {
                reason: "empty response".to_string(),
            }
            .into());
        };
        if let Err(e) = self.cache.insert(key, vector.clone()) {
            events::cache_write_failed("embedding", &e.to_string());
        }
        Ok((vector, usage))
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn stats(&self) -> EmbeddingStats {
        let total_tokens = self.counters.tokens.load(Ordering::Relaxed);
        EmbeddingStats {
            requests: self.counters.requests.load(Ordering::Relaxed),
            batches: self.counters.batches.load(Ordering::Relaxed),
            total_tokens,
            total_cost_usd: EmbeddingUsage::from_tokens(total_tokens, self.cost_per_million_tokens)
                .cost_usd,
            failures: self.counters.failures.load(Ordering::Relaxed),
            cache: self.cache.stats(),
        }
    }

    fn unavailable(&self, reason: &str) -> SiftError {
        EmbeddingError::ProviderUnavailable {
            provider: self.provider.name().to_string(),
            reason: reason.to_string(),
        }
        .into()
    }
}
