//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify the store's core behavioral properties.

use proptest::prelude::*;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{KeyBuilder, TtlStore, resource_prefix};

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(300);

// == Strategies ==
/// Generates key segments that exercise the escaping logic too
fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9:&=]{1,8}".prop_map(|s| s)
}

/// Generates plain cache keys
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,32}".prop_map(|s| s)
}

/// Generates cache values
fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,64}".prop_map(|s| s)
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (valid_key_strategy(), valid_value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        valid_key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // For any sequence of operations with a long TTL, the store behaves like
    // a plain map and the hit/miss counters account for every get.
    #[test]
    fn prop_store_matches_model_map(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let mut store = TtlStore::new();
        let mut model = std::collections::HashMap::new();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key.clone(), value.clone(), TEST_TTL).unwrap();
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    let got = store.get(&key);
                    prop_assert_eq!(&got, &model.get(&key).cloned(), "get disagrees with model");
                    match got {
                        Some(_) => expected_hits += 1,
                        None => expected_misses += 1,
                    }
                }
                CacheOp::Delete { key } => {
                    let removed = store.delete(&key);
                    prop_assert_eq!(removed, model.remove(&key).is_some());
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, model.len(), "Total entries mismatch");
    }

    // For any valid key-value pair, storing then retrieving before expiry
    // returns the exact value that was stored.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in valid_value_strategy()) {
        let mut store = TtlStore::new();

        store.set(key.clone(), value.clone(), TEST_TTL).unwrap();

        prop_assert_eq!(store.get(&key), Some(value), "Round-trip value mismatch");
    }

    // For any key, a second delete is a quiet no-op.
    #[test]
    fn prop_delete_is_idempotent(key in valid_key_strategy(), value in valid_value_strategy()) {
        let mut store = TtlStore::new();

        store.set(key.clone(), value, TEST_TTL).unwrap();

        prop_assert!(store.delete(&key), "first delete removes the entry");
        prop_assert!(!store.delete(&key), "second delete finds nothing");
        prop_assert_eq!(store.get(&key), None);
    }

    // For any key, setting V1 then V2 leaves exactly one entry holding V2.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        let mut store = TtlStore::new();

        store.set(key.clone(), value1, TEST_TTL).unwrap();
        store.set(key.clone(), value2.clone(), TEST_TTL).unwrap();

        prop_assert_eq!(store.get(&key), Some(value2), "Overwrite should return new value");
        prop_assert_eq!(store.len(), 1, "Should have exactly one entry after overwrite");
    }

    // For any set of resources, invalidating one resource's prefix removes
    // exactly the keys built for that resource and no others.
    #[test]
    fn prop_prefix_invalidation_is_exact(
        resources in prop::collection::hash_set(
            (segment_strategy(), segment_strategy()),
            2..12
        ),
        views in prop::collection::vec(segment_strategy(), 1..4)
    ) {
        let resources: Vec<(String, String)> = resources.into_iter().collect();
        let mut store = TtlStore::new();
        let mut keys_of = vec![Vec::new(); resources.len()];

        for (i, (namespace, resource)) in resources.iter().enumerate() {
            for view in &views {
                let key = KeyBuilder::new(namespace.clone(), resource.clone(), view.clone()).build();
                store.set(key.clone(), "v".to_string(), TEST_TTL).unwrap();
                keys_of[i].push(key);
            }
        }
        // duplicate views collapse onto one key
        for keys in &mut keys_of {
            keys.sort();
            keys.dedup();
        }

        let (target_ns, target_id) = resources[0].clone();
        let prefix = resource_prefix(&target_ns, &target_id);
        let removed = store.invalidate_prefix(&prefix);

        prop_assert_eq!(removed, keys_of[0].len(), "removed count mismatch");
        for key in &keys_of[0] {
            prop_assert_eq!(store.get(key), None, "target key survived invalidation");
        }
        for keys in keys_of.iter().skip(1) {
            for key in keys {
                prop_assert!(store.get(key).is_some(), "unrelated key was invalidated");
            }
        }
    }

    // For any parameter set, key construction is order-insensitive.
    #[test]
    fn prop_key_stable_under_param_order(
        namespace in segment_strategy(),
        resource in segment_strategy(),
        view in segment_strategy(),
        params in prop::collection::vec((segment_strategy(), segment_strategy()), 0..6)
    ) {
        let mut forward = KeyBuilder::new(namespace.clone(), resource.clone(), view.clone());
        for (name, value) in &params {
            forward = forward.param(name.clone(), value.clone());
        }

        let mut reversed = KeyBuilder::new(namespace, resource, view);
        for (name, value) in params.iter().rev() {
            reversed = reversed.param(name.clone(), value.clone());
        }

        prop_assert_eq!(forward.build(), reversed.build());
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(3))]

    // For any entry stored with a TTL, once the TTL elapses a get misses.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in valid_key_strategy(),
        value in valid_value_strategy()
    ) {
        let mut store = TtlStore::new();

        store.set(key.clone(), value.clone(), Duration::from_millis(80)).unwrap();

        prop_assert_eq!(store.get(&key), Some(value), "Entry should exist before TTL expires");

        sleep(Duration::from_millis(120));

        prop_assert_eq!(store.get(&key), None, "Entry should be gone after TTL expires");
    }
}
