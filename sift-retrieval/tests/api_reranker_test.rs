//! ApiReranker and RerankStage against a canned HTTP server.

use sift_core::config::RerankConfig;
use sift_core::errors::{RerankError, SiftError};
use sift_core::models::{Corpus, ScoreTrace, SearchResult, SourceMethod};
use sift_core::traits::IReranker;
use sift_retrieval::rerank::RerankOutcome;
use sift_retrieval::{ApiReranker, RerankStage};
use test_fixtures::{entity, rerank_response_body, CannedResponse, MockHttpServer};

fn config(server: &MockHttpServer) -> RerankConfig {
    RerankConfig {
        enabled: true,
        api_base: server.url(),
        api_key: Some("rerank-key".to_string()),
        retry_base_delay_ms: 10,
        request_timeout_secs: 5,
        ..RerankConfig::default()
    }
}

fn documents() -> Vec<String> {
    vec!["Gmail: send email".to_string(), "Slack: send messages".to_string()]
}

fn candidates() -> Vec<SearchResult> {
    ["gmail", "slack", "postgres"]
        .iter()
        .enumerate()
        .map(|(i, id)| {
            SearchResult::from_entity(
                entity(Corpus::Nodes, id, id, &format!("the {id} node")),
                0.5 - i as f64 * 0.1,
                SourceMethod::Hybrid,
                ScoreTrace::default(),
            )
        })
        .collect()
}

#[tokio::test]
async fn sends_typed_request() {
    let server = MockHttpServer::start(vec![CannedResponse::ok(rerank_response_body(&[
        (1, 0.8),
        (0, 0.3),
    ]))])
    .await;
    let reranker = ApiReranker::from_config(&config(&server)).unwrap();

    let scores = reranker
        .rerank("rerank-english-v3.0", "send email", &documents(), 2)
        .await
        .unwrap();
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].index, 1);

    let requests = server.requests();
    assert!(requests[0].request_line.starts_with("POST /rerank"));
    assert_eq!(requests[0].header("authorization"), Some("Bearer rerank-key"));
    let body = requests[0].json();
    assert_eq!(body["model"], "rerank-english-v3.0");
    assert_eq!(body["query"], "send email");
    assert_eq!(body["top_n"], 2);
    assert_eq!(body["documents"][1], "Slack: send messages");
}

#[tokio::test]
async fn missing_key_makes_no_request() {
    let server = MockHttpServer::start(vec![]).await;
    let reranker = ApiReranker::from_config(&RerankConfig {
        api_key: None,
        ..config(&server)
    })
    .unwrap();
    assert!(!reranker.is_available());
    let err = reranker
        .rerank("m", "q", &documents(), 2)
        .await
        .unwrap_err();
    assert!(matches!(err, SiftError::RerankError(RerankError::Unavailable { .. })));
    assert_eq!(server.request_count(), 0);
}

#[tokio::test]
async fn stage_retries_server_errors_then_reorders() {
    let server = MockHttpServer::start(vec![
        CannedResponse::json(503, r#"{"message":"overloaded"}"#),
        CannedResponse::ok(rerank_response_body(&[(2, 0.9), (0, 0.6), (1, 0.1)])),
    ])
    .await;
    let config = config(&server);
    let reranker = std::sync::Arc::new(ApiReranker::from_config(&config).unwrap());
    let stage = RerankStage::new(Some(reranker), &config);

    let outcome = stage.apply("database", candidates()).await;
    let RerankOutcome::Reranked(results) = outcome else {
        panic!("expected a reranked list");
    };
    let ids: Vec<&str> = results.iter().map(|r| r.entity_id.as_str()).collect();
    assert_eq!(ids, vec!["postgres", "gmail", "slack"]);
    assert_eq!(server.request_count(), 2);
}

#[tokio::test]
async fn stage_passes_through_on_auth_failure() {
    let server = MockHttpServer::start(vec![CannedResponse::json(
        401,
        r#"{"message":"invalid api token"}"#,
    )])
    .await;
    let config = config(&server);
    let reranker = std::sync::Arc::new(ApiReranker::from_config(&config).unwrap());
    let stage = RerankStage::new(Some(reranker), &config);

    let outcome = stage.apply("database", candidates()).await;
    assert!(matches!(outcome, RerankOutcome::PassedThrough { .. }));
    assert_eq!(outcome.into_results(), candidates());
    assert_eq!(server.request_count(), 1);
    assert_eq!(stage.stats().failures, 1);
}

#[tokio::test]
async fn stage_passes_through_on_malformed_response() {
    let server = MockHttpServer::start(vec![
        CannedResponse::ok(r#"{"results":[{"index":7,"relevance_score":0.9}]}"#),
        CannedResponse::ok("not json"),
        CannedResponse::ok(r#"{"unexpected":true}"#),
    ])
    .await;
    let config = config(&server);
    let reranker = std::sync::Arc::new(ApiReranker::from_config(&config).unwrap());
    let stage = RerankStage::new(Some(reranker), &config);

    let outcome = stage.apply("database", candidates()).await;
    assert_eq!(outcome.into_results(), candidates());
    assert_eq!(server.request_count(), 3);
}
