//! Property-based tests for structural scoring.
//!
//! Strategies generate random `Value` trees (up to four levels deep) and check the
//! invariants that must hold for any pair of trees:
//!
//! - scoring a tree against itself is perfect unless the tree has no leaves
//! - the denominator is always the expected tree's leaf count
//! - matched never exceeds total and the score stays in [0, 1]
//! - extra keys on the generated side never move the score
//! - re-casing every string on the generated side never moves the score
use proptest::prelude::*;
use fieldscore_core::{count_leaves, score, Map, Value};

// ============================================================================
// Strategies
// ============================================================================

fn arb_key() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-zA-Z0-9_]{0,8}").unwrap()
}

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Boolean),
        (-1_000i64..1_000i64).prop_map(Value::from),
        (-10_000i64..10_000i64).prop_map(|n| Value::Number(n as f64 / 100.0)),
        "[a-zA-Zçãé ]{0,12}".prop_map(Value::String),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::List),
            prop::collection::vec((arb_key(), inner), 0..6)
                .prop_map(|entries| Value::Map(entries.into_iter().collect::<Map>())),
        ]
    })
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

/// Upper-case every string in the tree.
fn shout(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.to_uppercase()),
        Value::List(items) => Value::List(items.iter().map(shout).collect()),
        Value::Map(map) => Value::Map(map.iter().map(|(k, v)| (k, shout(v))).collect()),
        other => other.clone(),
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(config())]

    #[test]
    fn self_comparison_is_perfect_unless_leafless(expected in arb_value()) {
        let report = score(&expected, &expected);
        if count_leaves(&expected) == 0 {
            prop_assert_eq!(report.score, 0.0);
        } else {
            prop_assert_eq!(report.score, 1.0);
            prop_assert_eq!(report.mismatches().count(), 0);
            prop_assert_eq!(report.container_events().count(), 0);
        }
    }

    #[test]
    fn denominator_is_expected_leaf_count(expected in arb_value(), generated in arb_value()) {
        let report = score(&expected, &generated);
        prop_assert_eq!(report.total_leaves, count_leaves(&expected));
    }

    #[test]
    fn score_is_bounded(expected in arb_value(), generated in arb_value()) {
        let report = score(&expected, &generated);
        prop_assert!(report.matched_leaves <= report.total_leaves);
        prop_assert!((0.0..=1.0).contains(&report.score));
        prop_assert!(!report.score.is_nan());
    }

    #[test]
    fn matched_count_agrees_with_trace(expected in arb_value(), generated in arb_value()) {
        let report = score(&expected, &generated);
        let matched_in_trace = report.leaf_verdicts().filter(|l| l.matched).count();
        prop_assert_eq!(matched_in_trace, report.matched_leaves);
    }

    #[test]
    fn extra_generated_keys_never_change_score(
        entries in prop::collection::vec((arb_key(), arb_value()), 1..6),
        extra in prop::collection::vec((arb_key(), arb_value()), 1..4),
    ) {
        let expected_map: Map = entries.into_iter().collect();
        let mut generated_map = expected_map.clone();
        for (key, value) in extra {
            if !expected_map.contains_key(&key) {
                generated_map.insert(key, value);
            }
        }
        let expected = Value::Map(expected_map);
        let baseline = score(&expected, &expected);
        let widened = score(&expected, &Value::Map(generated_map));
        prop_assert_eq!(baseline.score, widened.score);
        prop_assert_eq!(baseline.matched_leaves, widened.matched_leaves);
    }

    #[test]
    fn recasing_strings_never_changes_score(expected in arb_value()) {
        let report = score(&expected, &shout(&expected));
        prop_assert_eq!(report.matched_leaves, count_leaves(&expected));
    }
}
