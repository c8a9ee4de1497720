//! FTS5 full-text search over entity text, ranked by BM25.

use rusqlite::{params, Connection};

use sift_core::errors::SiftResult;
use sift_core::models::{Corpus, LexicalHit};

use super::entity_crud::parse_entity_row;
use crate::to_storage_err;

/// Column weights for bm25(): name, description, category, tags.
const BM25_WEIGHTS: &str = "10.0, 2.0, 1.0, 1.0";

/// Turn free text into an FTS5 expression: every alphanumeric token is
/// quoted, prefix-matched and OR-joined. Returns `None` when nothing
/// searchable remains.
pub fn build_match_expression(query: &str) -> Option<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
    {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    if tokens.is_empty() {
        return None;
    }
    Some(
        tokens
            .iter()
            .map(|t| format!("\"{t}\"*"))
            .collect::<Vec<_>>()
            .join(" OR "),
    )
}

/// Ranked hits, best first, with 1-based ranks.
pub fn search_fts(
    conn: &Connection,
    corpus: Corpus,
    query: &str,
    limit: usize,
) -> SiftResult<Vec<LexicalHit>> {
    let Some(expression) = build_match_expression(query) else {
        return Ok(Vec::new());
    };
    if limit == 0 {
        return Ok(Vec::new());
    }

    let t = corpus.as_str();
    let mut stmt = conn
        .prepare(&format!(
            "SELECT e.id, e.name, e.description, e.category, e.tags
             FROM {t}_fts
             JOIN {t} e ON e.rowid = {t}_fts.rowid
             WHERE {t}_fts MATCH ?1
             ORDER BY bm25({t}_fts, {BM25_WEIGHTS}), e.rowid
             LIMIT ?2"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut rows = stmt
        .query(params![expression, limit as i64])
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut hits = Vec::new();
    while let Some(row) = rows.next().map_err(|e| to_storage_err(e.to_string()))? {
        let entity = parse_entity_row(row, corpus, 0)?;
        hits.push(LexicalHit {
            entity,
            rank: hits.len() + 1,
        });
    }
    Ok(hits)
}
