//! ApiEmbeddingProvider and EmbeddingService against a canned HTTP server.

use std::sync::Arc;
use std::time::Duration;

use sift_core::clock::ManualClock;
use sift_core::config::{CacheConfig, EmbeddingConfig};
use sift_core::errors::{EmbeddingError, SiftError};
use sift_core::traits::IEmbeddingProvider;
use sift_embeddings::{ApiEmbeddingProvider, EmbeddingService};
use test_fixtures::{embedding_response_body, CannedResponse, MockHttpServer};

fn config(server: &MockHttpServer) -> EmbeddingConfig {
    EmbeddingConfig {
        api_base: server.url(),
        api_key: Some("test-key".to_string()),
        dimensions: 3,
        retry_base_delay_ms: 10,
        inter_batch_delay_ms: 0,
        request_timeout_secs: 5,
        ..EmbeddingConfig::default()
    }
}

fn service(config: &EmbeddingConfig) -> EmbeddingService {
    EmbeddingService::from_config(
        config,
        &CacheConfig::default(),
        Arc::new(ManualClock::default()),
    )
    .unwrap()
}

fn inputs() -> Vec<String> {
    vec!["first".to_string(), "second".to_string()]
}

#[tokio::test]
async fn sends_typed_request_and_resorts_response() {
    let server = MockHttpServer::start(vec![CannedResponse::ok(embedding_response_body(
        &[(1, vec![0.0, 1.0, 0.0]), (0, vec![1.0, 0.0, 0.0])],
        7,
    ))])
    .await;
    let provider = ApiEmbeddingProvider::from_config(&config(&server)).unwrap();

    let batch = provider.embed_batch(&inputs()).await.unwrap();
    assert_eq!(batch.vectors[0], vec![1.0, 0.0, 0.0]);
    assert_eq!(batch.vectors[1], vec![0.0, 1.0, 0.0]);
    assert_eq!(batch.total_tokens, 7);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].request_line.starts_with("POST /embeddings"));
    assert_eq!(requests[0].header("authorization"), Some("Bearer test-key"));
    let body = requests[0].json();
    assert_eq!(body["model"], "text-embedding-3-small");
    assert_eq!(body["dimensions"], 3);
    assert_eq!(body["input"], serde_json::json!(["first", "second"]));
}

#[tokio::test]
async fn auth_failure_is_not_retried() {
    let server = MockHttpServer::start(vec![CannedResponse::json(401, r#"{"error":"bad key"}"#)]).await;
    let cfg = config(&server);

    let provider = ApiEmbeddingProvider::from_config(&cfg).unwrap();
    let err = provider.embed_batch(&inputs()).await.unwrap_err();
    assert!(matches!(
        err,
        SiftError::EmbeddingError(EmbeddingError::AuthFailed { status: 401 })
    ));

    let server = MockHttpServer::start(vec![CannedResponse::json(403, "{}")]).await;
    let svc = service(&config(&server));
    let err = svc.embed(&inputs()).await.unwrap_err();
    assert!(err.is_provider_unavailable());
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn server_errors_are_retried_until_success() {
    let server = MockHttpServer::start(vec![
        CannedResponse::json(503, "{}"),
        CannedResponse::json(429, "{}"),
        CannedResponse::ok(embedding_response_body(
            &[(0, vec![1.0, 0.0, 0.0]), (1, vec![0.0, 0.0, 1.0])],
            4,
        )),
    ])
    .await;
    let svc = service(&config(&server));

    let output = svc.embed(&inputs()).await.unwrap();
    assert_eq!(output.vectors.len(), 2);
    assert_eq!(output.usage.tokens, 4);
    assert_eq!(server.request_count(), 3);
}

#[tokio::test]
async fn repeated_malformed_responses_exhaust_retries() {
    let server = MockHttpServer::start(vec![
        CannedResponse::ok("not json"),
        CannedResponse::ok(r#"{"data":[]}"#),
        CannedResponse::ok(embedding_response_body(&[(0, vec![1.0, 0.0])], 1)),
    ])
    .await;
    let svc = service(&config(&server));

    let err = svc.embed(&inputs()).await.unwrap_err();
    assert!(err.is_provider_unavailable());
    assert_eq!(server.request_count(), 3);
    assert_eq!(svc.stats().failures, 1);
}

#[tokio::test]
async fn timeout_counts_as_provider_failure() {
    let server = MockHttpServer::start(vec![CannedResponse::ok(embedding_response_body(
        &[(0, vec![1.0, 0.0, 0.0])],
        1,
    ))
    .delayed(Duration::from_secs(3))])
    .await;
    let cfg = EmbeddingConfig {
        request_timeout_secs: 1,
        max_retries: 1,
        ..config(&server)
    };
    let svc = service(&cfg);

    let err = svc.embed(&["slow".to_string()]).await.unwrap_err();
    assert!(err.is_provider_unavailable());
    assert!(err.to_string().contains("timed out"), "{err}");
}

#[tokio::test]
async fn missing_api_key_makes_no_request() {
    let server = MockHttpServer::start(Vec::new()).await;
    let cfg = EmbeddingConfig {
        api_key: None,
        ..config(&server)
    };
    let svc = service(&cfg);
    assert!(!svc.is_available());
    let err = svc.embed(&inputs()).await.unwrap_err();
    assert!(err.is_provider_unavailable());
    assert_eq!(server.request_count(), 0);
}
