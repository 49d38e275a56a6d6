//! Property-based tests for overlay merging.

use super::merger::ConfigMerger;
use proptest::prelude::*;
use serde_yaml::{Mapping, Value};

// Strategy for leaf values
fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,12}".prop_map(Value::from),
        prop::collection::vec(any::<i32>().prop_map(Value::from), 0..4).prop_map(Value::Sequence),
    ]
}

// Strategy for nested mappings with a small key space so overlays collide
fn tree_strategy() -> impl Strategy<Value = Value> {
    let leaf = scalar_strategy();
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop::collection::btree_map("[a-e]", inner, 0..5).prop_map(|m| {
            Value::Mapping(m.into_iter().map(|(k, v)| (Value::from(k), v)).collect())
        })
    })
}

fn mapping_strategy() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-e]", tree_strategy(), 0..5)
        .prop_map(|m| Value::Mapping(m.into_iter().map(|(k, v)| (Value::from(k), v)).collect()))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // An empty overlay never changes the target
    #[test]
    fn merge_empty_overlay_is_identity(base in mapping_strategy()) {
        let mut merged = base.clone();
        ConfigMerger::merge_into(&mut merged, Value::Mapping(Mapping::new()));
        prop_assert_eq!(merged, base);
    }

    // Merging a tree onto itself yields the same tree
    #[test]
    fn merge_is_idempotent(base in mapping_strategy()) {
        let mut merged = base.clone();
        ConfigMerger::merge_into(&mut merged, base.clone());
        prop_assert_eq!(merged, base);
    }

    // Every top-level overlay scalar ends up in the result unchanged
    #[test]
    fn overlay_leaves_win(base in mapping_strategy(), overlay in mapping_strategy()) {
        let mut merged = base.clone();
        ConfigMerger::merge_into(&mut merged, overlay.clone());

        let merged_map = merged.as_mapping().unwrap();
        for (key, value) in overlay.as_mapping().unwrap() {
            if !value.is_mapping() {
                prop_assert_eq!(merged_map.get(key), Some(value));
            }
        }
    }

    // Keys are never lost: the result holds the union of both key sets
    #[test]
    fn merge_keeps_all_keys(base in mapping_strategy(), overlay in mapping_strategy()) {
        let mut merged = base.clone();
        ConfigMerger::merge_into(&mut merged, overlay.clone());

        let merged_map = merged.as_mapping().unwrap();
        for key in base.as_mapping().unwrap().keys() {
            prop_assert!(merged_map.contains_key(key));
        }
        for key in overlay.as_mapping().unwrap().keys() {
            prop_assert!(merged_map.contains_key(key));
        }
    }

    // Applying the same overlay twice is the same as applying it once
    #[test]
    fn repeated_overlay_is_stable(base in mapping_strategy(), overlay in mapping_strategy()) {
        let mut once = base.clone();
        ConfigMerger::merge_into(&mut once, overlay.clone());

        let mut twice = once.clone();
        ConfigMerger::merge_into(&mut twice, overlay);

        prop_assert_eq!(once, twice);
    }
}
