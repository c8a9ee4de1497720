//! Property tests for the cosine scan.

use proptest::prelude::*;
use sift_storage::cosine_similarity;

fn vector(dims: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-1000.0f32..1000.0, dims)
}

proptest! {
    #[test]
    fn cosine_stays_within_unit_range((a, b) in (1usize..64).prop_flat_map(|d| (vector(d), vector(d)))) {
        let sim = cosine_similarity(&a, &b);
        prop_assert!(sim.is_finite());
        prop_assert!((-1.0..=1.0).contains(&sim));
    }

    #[test]
    fn cosine_is_symmetric((a, b) in (1usize..64).prop_flat_map(|d| (vector(d), vector(d)))) {
        prop_assert!((cosine_similarity(&a, &b) - cosine_similarity(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn zero_vector_always_scores_zero(a in (1usize..64).prop_flat_map(vector)) {
        let zero = vec![0.0f32; a.len()];
        prop_assert_eq!(cosine_similarity(&a, &zero), 0.0);
        prop_assert_eq!(cosine_similarity(&zero, &a), 0.0);
    }

    #[test]
    fn self_similarity_is_one_for_non_zero_vectors(a in (1usize..64).prop_flat_map(vector)) {
        prop_assume!(a.iter().any(|x| *x != 0.0));
        prop_assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-9);
    }
}
