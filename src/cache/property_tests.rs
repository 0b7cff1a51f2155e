//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check key derivation and store invariants.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::{HashSet, VecDeque};
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{build_key, CacheStore, JsonPayload};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;
const TEST_TTL: u64 = 300;

// == Strategies ==
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,32}".prop_map(|s| s)
}

fn json_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 ]{0,32}".prop_map(|s| json!(s)),
        ("[a-z]{1,8}", -1000i32..1000).prop_map(|(k, v)| json!({ k: v })),
    ]
}

fn query_params_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[a-z_]{1,10}", "[a-zA-Z0-9.,=&]{0,12}"), 0..8)
}

fn path_strategy() -> impl Strategy<Value = String> {
    "(/[a-z0-9]{1,10}){1,4}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: Value },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    // Small key space so operations collide often
    let key = "[a-f]{1}";
    prop_oneof![
        (key, json_value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key.prop_map(|key| CacheOp::Get { key }),
        key.prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Reordering query parameters never changes the key.
    #[test]
    fn prop_key_permutation_invariance(
        path in path_strategy(),
        params in query_params_strategy(),
        seed in any::<u64>()
    ) {
        let mut shuffled = params.clone();
        // Deterministic rotation plus reversal driven by the seed
        if !shuffled.is_empty() {
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            if seed % 2 == 0 {
                shuffled.reverse();
            }
        }

        prop_assert_eq!(
            build_key("GET", &path, &params),
            build_key("GET", &path, &shuffled)
        );
    }

    // Changing a value, the path or the method changes the key.
    #[test]
    fn prop_key_sensitivity(
        path in path_strategy(),
        params in query_params_strategy(),
        name in "[a-z_]{1,10}",
        value in "[a-z0-9]{1,8}"
    ) {
        let base = build_key("GET", &path, &params);

        let mut with_extra = params.clone();
        with_extra.push((name, value));
        prop_assert_ne!(&base, &build_key("GET", &path, &with_extra));

        prop_assert_ne!(&base, &build_key("HEAD", &path, &params));

        let other_path = format!("{}/x", path);
        prop_assert_ne!(&base, &build_key("GET", &other_path, &params));
    }

    // A stored value reads back unchanged; an overwrite replaces it.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in json_value_strategy(),
        value2 in json_value_strategy()
    ) {
        let store = CacheStore::new(TEST_MAX_ENTRIES);

        store.set(key.clone(), value1.clone(), TEST_TTL);
        prop_assert_eq!(store.get(&key), Some(JsonPayload::from(value1)));

        store.set(key.clone(), value2.clone(), TEST_TTL);
        prop_assert_eq!(store.get(&key), Some(JsonPayload::from(value2)));
        prop_assert_eq!(store.len(), 1);
    }

    // The store never grows past its capacity.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec((valid_key_strategy(), json_value_strategy()), 1..200),
        max_entries in 1usize..60
    ) {
        let store = CacheStore::new(max_entries);

        for (key, value) in entries {
            store.set(key, value, TEST_TTL);
            prop_assert!(
                store.len() <= max_entries,
                "Cache size {} exceeds max {}",
                store.len(),
                max_entries
            );
        }
    }

    // Any interleaving of operations matches a simple recency-list model.
    #[test]
    fn prop_matches_lru_model(
        ops in prop::collection::vec(cache_op_strategy(), 1..80),
        capacity in 1usize..5
    ) {
        let store = CacheStore::new(capacity);
        // Front = least recently used
        let mut model: VecDeque<(String, Value)> = VecDeque::new();

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key.clone(), value.clone(), TEST_TTL);
                    let existed = model.iter().position(|(k, _)| *k == key);
                    match existed {
                        Some(pos) => {
                            model.remove(pos);
                        }
                        None if model.len() >= capacity => {
                            model.pop_front();
                        }
                        None => {}
                    }
                    model.push_back((key, value));
                }
                CacheOp::Get { key } => {
                    let expected = model.iter().position(|(k, _)| *k == key).and_then(|pos| model.remove(pos));
                    let actual = store.get(&key);
                    prop_assert_eq!(actual, expected.as_ref().map(|(_, v)| JsonPayload::from(v.clone())));
                    if let Some(entry) = expected {
                        model.push_back(entry);
                    }
                }
                CacheOp::Delete { key } => {
                    let pos = model.iter().position(|(k, _)| *k == key);
                    prop_assert_eq!(store.delete(&key), pos.is_some());
                    if let Some(pos) = pos {
                        model.remove(pos);
                    }
                }
            }
            prop_assert_eq!(store.len(), model.len());
        }
    }

    // Filling to capacity N and inserting one more evicts the first key.
    #[test]
    fn prop_lru_eviction_order(
        initial_keys in prop::collection::vec(valid_key_strategy(), 2..10),
        new_key in valid_key_strategy()
    ) {
        let mut seen = HashSet::new();
        let unique_keys: Vec<String> = initial_keys
            .into_iter()
            .filter(|k| seen.insert(k.clone()))
            .collect();

        prop_assume!(unique_keys.len() >= 2);
        prop_assume!(!unique_keys.contains(&new_key));

        let store = CacheStore::new(unique_keys.len());
        for key in &unique_keys {
            store.set(key.clone(), json!(key), TEST_TTL);
        }

        store.set(new_key.clone(), json!("new"), TEST_TTL);

        prop_assert_eq!(store.len(), unique_keys.len());
        prop_assert!(store.get(&unique_keys[0]).is_none(), "Oldest key should have been evicted");
        prop_assert!(store.get(&new_key).is_some());
        for key in unique_keys.iter().skip(1) {
            prop_assert!(store.get(key).is_some(), "Key '{}' should still exist", key);
        }
    }
}

// Fewer cases for time-sensitive TTL checks
proptest! {
    #![proptest_config(ProptestConfig::with_cases(3))]

    #[test]
    fn prop_ttl_expiration_behavior(
        key in valid_key_strategy(),
        value in json_value_strategy()
    ) {
        let store = CacheStore::new(TEST_MAX_ENTRIES);

        store.set(key.clone(), value.clone(), 1);
        prop_assert_eq!(store.get(&key), Some(JsonPayload::from(value)));

        sleep(Duration::from_millis(1010));

        prop_assert_eq!(store.get(&key), None);
    }
}
