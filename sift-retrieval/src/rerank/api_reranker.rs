//! Cohere-style `/rerank` HTTP client.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sift_core::config::RerankConfig;
use sift_core::errors::{RerankError, SiftError, SiftResult};
use sift_core::traits::{IReranker, RerankScore};

const PROVIDER_NAME: &str = "cohere-compatible";

pub struct ApiReranker {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    results: Vec<RerankResultItem>,
}

#[derive(Debug, Deserialize)]
struct RerankResultItem {
    index: usize,
    relevance_score: f64,
}

impl ApiReranker {
    pub fn from_config(config: &RerankConfig) -> SiftResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SiftError::ConfigError(format!("rerank http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/rerank", config.api_base.trim_end_matches('/')),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }
}

fn classify_status(status: u16, body: &str) -> RerankError {
    RerankError::RequestFailed {
        reason: format!("API returned {status}: {body}"),
        transient: status == 429 || (500..=599).contains(&status),
    }
}

fn parse_response(body: &str, documents: usize) -> SiftResult<Vec<RerankScore>> {
    let response: RerankResponse =
        serde_json::from_str(body).map_err(|e| RerankError::MalformedResponse {
            reason: format!("JSON parse error: {e}"),
        })?;
    let mut seen = HashSet::with_capacity(response.results.len());
    let mut scores = Vec::with_capacity(response.results.len());
    for item in response.results {
        if item.index >= documents || !seen.insert(item.index) {
            return Err(RerankError::MalformedResponse {
                reason: format!("invalid or duplicate index {}", item.index),
            }
            .into());
        }
        if !item.relevance_score.is_finite() {
            return Err(RerankError::MalformedResponse {
                reason: format!("non-finite score for index {}", item.index),
            }
            .into());
        }
        scores.push(RerankScore {
            index: item.index,
            relevance_score: item.relevance_score,
        });
    }
    Ok(scores)
}

#[async_trait]
impl IReranker for ApiReranker {
    async fn rerank(
        &self,
        model: &str,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> SiftResult<Vec<RerankScore>> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(RerankError::Unavailable {
                reason: "no API key configured".to_string(),
            }
            .into());
        };
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        debug!(documents = documents.len(), model, "sending rerank request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&RerankRequest {
                model,
                query,
                documents,
                top_n,
            })
            .send()
            .await
            .map_err(|e| RerankError::RequestFailed {
                reason: format!("HTTP error: {e}"),
                transient: true,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| RerankError::RequestFailed {
            reason: format!("reading response body: {e}"),
            transient: true,
        })?;
        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &body).into());
        }
        parse_response(&body, documents.len())
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

    #[test]
    fn parses_scores_and_rejects_bad_indices() {
        let body = r#"{"results":[{"index":1,"relevance_score":0.9},{"index":0,"relevance_score":0.1}]}"#;
        let scores = parse_response(body, 2).unwrap();
        assert_eq!(scores[0], RerankScore { index: 1, relevance_score: 0.9 });
        assert!(parse_response(body, 1).is_err());
        let dup = r#"{"results":[{"index":0,"relevance_score":0.9},{"index":0,"relevance_score":0.1}]}"#;
        assert!(parse_response(dup, 2).is_err());
        assert!(parse_response("{}", 2).is_err());
    }

    #[test]
    fn auth_errors_are_not_transient() {
        assert!(!classify_status(401, "").is_transient());
        assert!(!classify_status(400, "").is_transient());
        assert!(classify_status(429, "").is_transient());
        assert!(classify_status(502, "").is_transient());
    }
}
