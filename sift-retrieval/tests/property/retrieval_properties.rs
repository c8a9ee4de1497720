//! Property tests for rank fusion.

use std::collections::HashSet;

use proptest::prelude::*;
use sift_retrieval::{fuse, optimal_k, RankedList};

/// A list of distinct ids drawn from a small alphabet so lists overlap.
fn ranked_ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set(0u8..30, 0..20).prop_flat_map(|set| {
        let ids: Vec<String> = set.into_iter().map(|n| format!("e{n}")).collect();
        Just(ids).prop_shuffle()
    })
}

fn ids(fused: &[sift_retrieval::FusedCandidate]) -> Vec<&str> {
    fused.iter().map(|c| c.id.as_str()).collect()
}

proptest! {
    #[test]
    fn fusion_is_deterministic(a in ranked_ids(), b in ranked_ids(), k in 1u32..200) {
        let la = RankedList::from_ids(a, 1.0);
        let lb = RankedList::from_ids(b, 1.0);
        let first = fuse(&la, &lb, k).unwrap();
        let second = fuse(&la, &lb, k).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn swapping_sources_keeps_the_ranking(a in ranked_ids(), b in ranked_ids(), k in 1u32..200) {
        let la = RankedList::from_ids(a, 1.0);
        let lb = RankedList::from_ids(b, 1.0);
        let ab = fuse(&la, &lb, k).unwrap();
        let ba = fuse(&lb, &la, k).unwrap();
        prop_assert_eq!(ids(&ab), ids(&ba));
    }

    #[test]
    fn scores_are_exact_rrf_terms(a in ranked_ids(), b in ranked_ids(), k in 1u32..200) {
        let la = RankedList::from_ids(a.clone(), 1.0);
        let lb = RankedList::from_ids(b.clone(), 1.0);
        let fused = fuse(&la, &lb, k).unwrap();
        let k = k as f64;
        for candidate in &fused {
            let ra = a.iter().position(|id| *id == candidate.id).map(|p| p + 1);
            let rb = b.iter().position(|id| *id == candidate.id).map(|p| p + 1);
            let expected = ra.map_or(0.0, |r| 1.0 / (k + r as f64))
                + rb.map_or(0.0, |r| 1.0 / (k + r as f64));
            prop_assert!((candidate.score - expected).abs() < 1e-12);
            prop_assert!(ra.is_some() || rb.is_some());
        }
    }

    #[test]
    fn fusion_keeps_every_candidate_once(a in ranked_ids(), b in ranked_ids()) {
        let fused = fuse(&RankedList::from_ids(a.clone(), 1.0), &RankedList::from_ids(b.clone(), 1.0), 60).unwrap();
        let expected: HashSet<&str> = a.iter().chain(b.iter()).map(String::as_str).collect();
        let got: HashSet<&str> = fused.iter().map(|c| c.id.as_str()).collect();
        prop_assert_eq!(got.len(), fused.len());
        prop_assert_eq!(got, expected);
        prop_assert!(fused.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn single_side_passes_through_in_order(a in ranked_ids(), k in 1u32..200) {
        let fused = fuse(&RankedList::from_ids(a.clone(), 1.0), &RankedList::from_ids(Vec::<String>::new(), 1.0), k).unwrap();
        prop_assert_eq!(ids(&fused), a.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[test]
    fn optimal_k_is_one_of_three_values(n in 0usize..10_000) {
        prop_assert!([30, 60, 90].contains(&optimal_k(n)));
    }
}
