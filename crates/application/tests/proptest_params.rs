//! Property-based tests for policy parameters and the decision rule
//!
//! These tests use proptest to verify invariants across many random inputs.

use std::time::Duration;

use application::{ParamMap, PolicyParams, keys, scale_for_priority, weighted_trial};
use domain::EntityId;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

// ============================================================================
// Probability Validation
// ============================================================================

mod probability_tests {
    use super::*;

    proptest! {
        #[test]
        fn in_range_probabilities_accepted(p in 0.0f64..=1.0) {
            let source = ParamMap::new()
                .with(keys::FAULT_ACTION_PROBABILITY, p)
                .with(keys::PROC_RESET_SCHED_PROBABILITY, p);
            let params = PolicyParams::default().apply(&source).unwrap();
            prop_assert!((params.fault_action_probability - p).abs() < f64::EPSILON);
        }

        #[test]
        fn out_of_range_probabilities_rejected(
            p in prop_oneof![-1000.0f64..-1e-9, 1.000_000_1f64..1000.0]
        ) {
            let source = ParamMap::new().with(keys::FAULT_ACTION_PROBABILITY, p);
            prop_assert!(PolicyParams::default().apply(&source).is_err());
        }

        #[test]
        fn boundary_probabilities_are_absolute(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            prop_assert!(!weighted_trial(0.0, &mut rng));
            prop_assert!(weighted_trial(1.0, &mut rng));
        }
    }
}

// ============================================================================
// Interval Scaling
// ============================================================================

mod interval_tests {
    use super::*;

    proptest! {
        #[test]
        fn scaling_preserves_order(a in 0u64..10_000_000, b in 0u64..10_000_000) {
            let (lo, hi) = (a.min(b), a.max(b));
            let lo = scale_for_priority(Duration::from_micros(lo));
            let hi = scale_for_priority(Duration::from_micros(hi));
            prop_assert!(lo <= hi);
        }

        #[test]
        fn scaling_is_four_fifths(millis in 0u64..1_000_000) {
            let scaled = scale_for_priority(Duration::from_millis(millis * 5));
            prop_assert_eq!(scaled, Duration::from_millis(millis * 4));
        }

        #[test]
        fn only_prioritized_entities_are_scaled(
            min in 0u64..5_000,
            extra in 0u64..5_000,
            id in "[a-z]{1,8}"
        ) {
            let source = ParamMap::new()
                .with(keys::MIN_INTERVAL, i64::try_from(min).unwrap())
                .with(keys::MAX_INTERVAL, i64::try_from(min + extra).unwrap())
                .with(keys::PRIORITIZED_ENTITIES, vec!["prio"]);
            let params = PolicyParams::default().apply(&source).unwrap();
            let entity = EntityId::new(id.clone()).unwrap();
            let (lo, hi) = params.intervals_for(&entity);
            if id == "prio" {
                prop_assert_eq!(lo, scale_for_priority(params.min_interval));
                prop_assert_eq!(hi, scale_for_priority(params.max_interval));
            } else {
                prop_assert_eq!((lo, hi), (params.min_interval, params.max_interval));
            }
        }

        #[test]
        fn applying_twice_is_idempotent(
            min in 0u64..5_000,
            p in 0.0f64..=1.0,
            ids in proptest::collection::vec("[a-z]{1,6}", 0..5)
        ) {
            let source = ParamMap::new()
                .with(keys::MIN_INTERVAL, i64::try_from(min).unwrap())
                .with(keys::FAULT_ACTION_PROBABILITY, p)
                .with(keys::PRIORITIZED_ENTITIES, ids);
            let once = PolicyParams::default().apply(&source).unwrap();
            let twice = once.apply(&source).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
