//! Cloud API embedding provider.
//!
//! HTTP client for OpenAI-compatible `/embeddings` endpoints. One call is
//! one request: retry and batching live in [`crate::EmbeddingService`].

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sift_core::config::EmbeddingConfig;
use sift_core::errors::{EmbeddingError, SiftError, SiftResult};
use sift_core::traits::{EmbeddingBatch, IEmbeddingProvider};

const PROVIDER_NAME: &str = "openai-compatible";

/// Cloud API embedding provider.
pub struct ApiEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    dimensions: usize,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
    #[serde(default)]
    usage: Option<EmbedUsage>,
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbedUsage {
    total_tokens: u64,
}

impl ApiEmbeddingProvider {
    pub fn from_config(config: &EmbeddingConfig) -> SiftResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SiftError::ConfigError(format!("embedding http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.api_base.trim_end_matches('/')),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_request(&self, api_key: &str, texts: &[String]) -> SiftResult<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&EmbedRequest {
                model: &self.model,
                input: texts,
                dimensions: self.dimensions,
            })
            .send()
            .await
            .map_err(|e| EmbeddingError::RequestFailed {
                reason: if e.is_timeout() {
                    format!("request timed out: {e}")
                } else {
                    format!("HTTP error: {e}")
                },
                transient: true,
            })?;

        let status = response.status();
        if status.is_success() {
            return response.text().await.map_err(|e| {
                EmbeddingError::RequestFailed {
                    reason: format!("reading response body: {e}"),
                    transient: true,
                }
                .into()
            });
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status.as_u16(), &body).into())
    }
}

/// Map a non-success HTTP status onto the error taxonomy.
fn classify_status(status: u16, body: &str) -> EmbeddingError {
    match status {
        401 | 403 => EmbeddingError::AuthFailed { status },
        429 | 500..=599 => EmbeddingError::RequestFailed {
            reason: format!("API returned {status}: {body}"),
            transient: true,
        },
        _ => EmbeddingError::RequestFailed {
            reason: format!("API returned {status}: {body}"),
            transient: false,
        },
    }
}

/// Validate a response body against the request and return the vectors in
/// input order.
fn parse_response(body: &str, expected: usize, dimensions: usize) -> SiftResult<EmbeddingBatch> {
    let response: EmbedResponse =
        serde_json::from_str(body).map_err(|e| EmbeddingError::MalformedResponse {
            reason: format!("JSON parse error: {e}"),
        })?;

    if response.data.len() != expected {
        return Err(EmbeddingError::MalformedResponse {
            reason: format!(
                "expected {expected} embeddings, got {}",
                response.data.len()
            ),
        }
        .into());
    }

    let mut seen = HashSet::with_capacity(expected);
    for item in &response.data {
        if item.index >= expected || !seen.insert(item.index) {
            return Err(EmbeddingError::MalformedResponse {
                reason: format!("invalid or duplicate index {}", item.index),
            }
            .into());
        }
        if item.embedding.len() != dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dimensions,
                actual: item.embedding.len(),
            }
            .into());
        }
        if item.embedding.iter().any(|x| !x.is_finite()) {
            return Err(EmbeddingError::MalformedResponse {
                reason: format!("non-finite value in embedding {}", item.index),
            }
            .into());
        }
    }

    let mut data = response.data;
    data.sort_by_key(|d| d.index);
    Ok(EmbeddingBatch {
        vectors: data.into_iter().map(|d| d.embedding).collect(),
        total_tokens: response.usage.map_or(0, |u| u.total_tokens),
    })
}

#[async_trait]
impl IEmbeddingProvider for ApiEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> SiftResult<EmbeddingBatch> {
        if texts.is_empty() {
            return Ok(EmbeddingBatch {
                vectors: Vec::new(),
                total_tokens: 0,
            });
        }
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(EmbeddingError::ProviderUnavailable {
                provider: PROVIDER_NAME.to_string(),
                reason: "no API key configured".to_string(),
            }
            .into());
        };
        debug!(texts = texts.len(), model = %self.model, "sending embedding request");
        let body = self.send_request(api_key, texts).await?;
        parse_response(&body, texts.len(), self.dimensions)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(items: &[(usize, Vec<f32>)]) -> String {
        let data: Vec<serde_json::Value> = items
            .iter()
            .map(|(i, v)| serde_json::json!({ "index": i, "embedding": v }))
            .collect();
        serde_json::json!({ "data": data, "usage": { "total_tokens": 12 } }).to_string()
    }

    #[test]
    fn response_is_resorted_by_index() {
        let batch = parse_response(
            &body(&[(2, vec![2.0, 2.0]), (0, vec![0.0, 0.5]), (1, vec![1.0, 1.0])]),
            3,
            2,
        )
        .unwrap();
        assert_eq!(
            batch.vectors,
            vec![vec![0.0, 0.5], vec![1.0, 1.0], vec![2.0, 2.0]]
        );
        assert_eq!(batch.total_tokens, 12);
    }

    #[test]
    fn count_mismatch_is_malformed() {
        let err = parse_response(&body(&[(0, vec![1.0])]), 2, 1).unwrap_err();
        assert!(matches!(
            err,
            SiftError::EmbeddingError(EmbeddingError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn duplicate_or_out_of_range_index_is_malformed() {
        assert!(parse_response(&body(&[(0, vec![1.0]), (0, vec![1.0])]), 2, 1).is_err());
        assert!(parse_response(&body(&[(0, vec![1.0]), (5, vec![1.0])]), 2, 1).is_err());
    }

    #[test]
    fn wrong_dimensions_are_rejected() {
        let err = parse_response(&body(&[(0, vec![1.0, 2.0, 3.0])]), 1, 2).unwrap_err();
        assert!(matches!(
            err,
            SiftError::EmbeddingError(EmbeddingError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn missing_usage_counts_zero_tokens() {
        let raw = r#"{"data":[{"index":0,"embedding":[0.5]}]}"#;
        assert_eq!(parse_response(raw, 1, 1).unwrap().total_tokens, 0);
    }

    #[test]
    fn status_classification() {
        assert!(matches!(
            classify_status(401, ""),
            EmbeddingError::AuthFailed { status: 401 }
        ));
        assert!(!classify_status(403, "").is_transient());
        assert!(classify_status(429, "").is_transient());
        assert!(classify_status(503, "").is_transient());
        assert!(!classify_status(400, "bad input").is_transient());
    }

    #[test]
    fn missing_key_means_unavailable() {
        let provider = ApiEmbeddingProvider::from_config(&EmbeddingConfig::default()).unwrap();
        assert!(!provider.is_available());
        assert_eq!(provider.endpoint(), "https://api.openai.com/v1/embeddings");
    }
}
