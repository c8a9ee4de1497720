//! Reciprocal Rank Fusion: score = Σ w_i/(k + rank_i)
//!
//! Combines ranked lists into a single fused ranking without requiring
//! score normalization across retrieval methods.

use std::collections::HashMap;
use std::collections::HashSet;

use sift_core::errors::{RetrievalError, SiftResult};

/// One ranked input: `(entity_id, rank)` pairs with 1-based ranks.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedList {
    pub entries: Vec<(String, usize)>,
    pub weight: f64,
}

impl RankedList {
    pub fn new(entries: Vec<(String, usize)>, weight: f64) -> Self {
        Self { entries, weight }
    }

    /// Ranks taken from list position.
    pub fn from_ids<I, S>(ids: I, weight: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id.into(), i + 1))
            .collect();
        Self { entries, weight }
    }
}

/// A candidate after fusion.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedCandidate {
    pub id: String,
    /// Fused RRF score (higher = more relevant).
    pub score: f64,
    /// Rank in each input list, by list position. `None` when absent.
    pub ranks: Vec<Option<usize>>,
}

impl FusedCandidate {
    fn best_rank(&self) -> usize {
        self.ranks.iter().flatten().copied().min().unwrap_or(usize::MAX)
    }
}

/// Fuse two ranked lists.
pub fn fuse(a: &RankedList, b: &RankedList, k: u32) -> SiftResult<Vec<FusedCandidate>> {
    fuse_lists(&[a.clone(), b.clone()], k)
}

/// Fuse any number of ranked lists.
///
/// Sorted by score descending. Ties go to the better best rank, then to the
/// lexicographically smaller id, so the result does not depend on the order
/// of `lists`. A single non-empty list comes back in its own order.
pub fn fuse_lists(lists: &[RankedList], k: u32) -> SiftResult<Vec<FusedCandidate>> {
    validate(lists, k)?;

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut candidates: Vec<FusedCandidate> = Vec::new();
    for (list_idx, list) in lists.iter().enumerate() {
        for (id, rank) in &list.entries {
            let slot = *index.entry(id.as_str()).or_insert_with(|| {
                candidates.push(FusedCandidate {
                    id: id.clone(),
                    score: 0.0,
                    ranks: vec![None; lists.len()],
                });
                candidates.len() - 1
            });
            let candidate = &mut candidates[slot];
            candidate.score += list.weight / (k as f64 + *rank as f64);
            candidate.ranks[list_idx] = Some(*rank);
        }
    }

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.best_rank().cmp(&b.best_rank()))
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(candidates)
}

fn validate(lists: &[RankedList], k: u32) -> SiftResult<()> {
    let mismatch = |reason: String| -> SiftResult<()> {
        Err(RetrievalError::FusionInputMismatch { reason }.into())
    };
    if k == 0 {
        return mismatch("k must be at least 1".to_string());
    }
    for (list_idx, list) in lists.iter().enumerate() {
        if !list.weight.is_finite() || list.weight < 0.0 {
            return mismatch(format!("list {list_idx} has invalid weight {}", list.weight));
        }
        let mut seen = HashSet::with_capacity(list.entries.len());
        for (id, rank) in &list.entries {
            if *rank == 0 {
                return mismatch(format!("list {list_idx} has rank 0 for {id}"));
            }
            if !seen.insert(id.as_str()) {
                return mismatch(format!("list {list_idx} contains {id} twice"));
            }
        }
    }
    Ok(())
}

/// RRF k for a candidate pool of size `n`: small pools get a sharper
/// curve, large pools a flatter one.
pub fn optimal_k(n: usize) -> u32 {
    if n < 10 {
        30
    } else if n > 50 {
        90
    } else {
        60
    }
}
