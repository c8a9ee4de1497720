//! Test fixtures for Sift: fixture corpora, entity and vector builders, and
//! a canned-response HTTP server for provider client tests.

pub mod mock_http;

use std::path::PathBuf;

use serde::Deserialize;
use sift_core::models::{Corpus, DisplayFields, Entity};

pub use mock_http::{CannedResponse, MockHttpServer, RecordedRequest};

/// Root directory of the fixture files.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

#[derive(Deserialize)]
struct FixtureEntity {
    id: String,
    #[serde(flatten)]
    fields: DisplayFields,
}

/// Load a corpus fixture (`corpus/nodes.json` or `corpus/templates.json`).
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_corpus(corpus: Corpus) -> Vec<Entity> {
    let path = fixtures_root()
        .join("corpus")
        .join(format!("{}.json", corpus.as_str()));
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    let raw: Vec<FixtureEntity> = serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e));
    raw.into_iter()
        .map(|f| Entity::new(f.id, corpus, f.fields))
        .collect()
}

/// Build an entity with a name and description only.
pub fn entity(corpus: Corpus, id: &str, name: &str, description: &str) -> Entity {
    Entity::new(
        id,
        corpus,
        DisplayFields {
            name: name.to_string(),
            description: description.to_string(),
            category: None,
            tags: Vec::new(),
        },
    )
}

/// A `dims`-long vector that is zero except for the given `(axis, value)` pairs.
pub fn sparse_vector(dims: usize, values: &[(usize, f32)]) -> Vec<f32> {
    let mut v = vec![0.0; dims];
    for (axis, value) in values {
        v[*axis] = *value;
    }
    v
}

/// Unit vector along `axis`.
pub fn axis_vector(dims: usize, axis: usize) -> Vec<f32> {
    sparse_vector(dims, &[(axis, 1.0)])
}

/// Embedding API response body in the provider's wire format. Items are
/// emitted in the given order, so callers can exercise re-sorting.
pub fn embedding_response_body(items: &[(usize, Vec<f32>)], total_tokens: u64) -> String {
    let data: Vec<serde_json::Value> = items
        .iter()
        .map(|(index, embedding)| {
            serde_json::json!({ "object": "embedding", "index": index, "embedding": embedding })
        })
        .collect();
    serde_json::json!({
        "object": "list",
        "data": data,
        "model": "text-embedding-3-small",
        "usage": { "prompt_tokens": total_tokens, "total_tokens": total_tokens }
    })
    .to_string()
}

/// Rerank API response body in the provider's wire format.
pub fn rerank_response_body(results: &[(usize, f64)]) -> String {
    let results: Vec<serde_json::Value> = results
        .iter()
        .map(|(index, score)| serde_json::json!({ "index": index, "relevance_score": score }))
        .collect();
    serde_json::json!({ "id": "rerank-test", "results": results }).to_string()
}
