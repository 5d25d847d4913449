//! Property-Based Tests for the Repository
//!
//! Uses proptest to check the repository contract against a memory store.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use serde_json::Value;

use crate::cache::{Repository, Ttl};
use crate::memory::MemoryStore;

// == Strategies ==
/// Generates cache keys (non-empty)
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{1,32}"
}

/// Generates arbitrary JSON payloads, floats excluded so equality is exact
fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::from),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::hash_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn repository() -> Repository<MemoryStore> {
    Repository::new(MemoryStore::default())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // **Property 1: Round-trip**
    // Any payload written with a positive TTL reads back unchanged.
    #[test]
    fn prop_put_get_roundtrip(
        key in key_strategy(),
        value in value_strategy(),
        ttl in 1i64..100_000
    ) {
        let cache = repository();

        prop_assert!(cache.put(&key, value.clone(), ttl));
        prop_assert_eq!(cache.get(&key), Some(value));
    }

    // **Property 2: Absence**
    // On an empty store every key is missing and has() is its negation.
    #[test]
    fn prop_absent_keys_are_missing(key in key_strategy()) {
        let cache = repository();

        prop_assert!(!cache.has(&key));
        prop_assert!(cache.missing(&key));
    }

    // **Property 3: Elapsed TTL deletes**
    // A put whose TTL is zero or negative leaves the key absent, even if it
    // was present before.
    #[test]
    fn prop_elapsed_ttl_is_forget(
        key in key_strategy(),
        value in value_strategy(),
        ttl in -100_000i64..=0
    ) {
        let cache = repository();
        cache.forever(&key, Value::Bool(true));

        cache.put(&key, value, ttl);
        prop_assert!(cache.missing(&key));
    }

    // **Property 4: First add wins**
    #[test]
    fn prop_add_keeps_first_value(
        key in key_strategy(),
        first in value_strategy(),
        second in value_strategy()
    ) {
        let cache = repository();

        prop_assert!(cache.add(&key, first.clone(), Ttl::Forever));
        prop_assert!(!cache.add(&key, second, 60));
        prop_assert_eq!(cache.get(&key), Some(first));
    }

    // **Property 5: Batch reads are complete**
    // get_multiple returns exactly the requested keys, defaulting the missing ones.
    #[test]
    fn prop_get_multiple_covers_every_key(
        stored in prop::collection::hash_map(key_strategy(), value_strategy(), 0..8),
        extra in prop::collection::vec(key_strategy(), 0..8)
    ) {
        let cache = repository();
        prop_assert!(cache.put_many(stored.clone(), 300));

        let requested: Vec<String> = stored.keys().cloned().chain(extra).collect();
        let result = cache.get_multiple(&requested, Some(Value::from("default")));

        let expected: HashSet<&String> = requested.iter().collect();
        prop_assert_eq!(result.keys().collect::<HashSet<_>>(), expected);

        for (key, value) in result {
            let wanted = stored.get(&key).cloned().unwrap_or(Value::from("default"));
            prop_assert_eq!(value, Some(wanted));
        }
    }

    // **Property 6: Pull consumes**
    #[test]
    fn prop_pull_removes_key(key in key_strategy(), value in value_strategy()) {
        let cache = repository();
        cache.forever(&key, value.clone());

        prop_assert_eq!(cache.pull(&key), Some(value));
        prop_assert!(cache.missing(&key));
        prop_assert_eq!(cache.pull_or(&key, Value::from(0)), Value::from(0));
        prop_assert!(cache.store().is_empty());
    }

    // **Property 7: Counter arithmetic**
    // Increments and decrements sum like integers starting from zero.
    #[test]
    fn prop_counters_sum(deltas in prop::collection::vec(-1_000i64..1_000, 1..20)) {
        let cache = repository();
        let mut expected = 0i64;

        for delta in deltas {
            expected += delta;
            let value = if delta >= 0 {
                cache.increment_by("counter", delta)
            } else {
                cache.decrement_by("counter", -delta)
            };
            prop_assert_eq!(value, Ok(expected));
        }
    }

    // **Property 8: Deletes cover the whole batch**
    #[test]
    fn prop_delete_multiple_removes_all(
        stored in prop::collection::hash_map(key_strategy(), value_strategy(), 1..8)
    ) {
        let cache = repository();
        let keys: Vec<String> = stored.keys().cloned().collect();
        prop_assert!(cache.put_many(stored, Ttl::Forever));

        prop_assert!(cache.delete_multiple(&keys));
        let remaining: HashMap<String, Option<Value>> = cache.many(&keys);
        prop_assert!(remaining.values().all(Option::is_none));
    }
}
