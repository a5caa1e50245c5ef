//! Property-based tests for the LRU cache
//!
//! Every operation sequence is replayed against a plain `Vec` kept in recency
//! order (most recent first) and the cache must agree with it after each step.

use proptest::prelude::*;

use crate::comparer::{DefaultComparer, NullableComparer};
use crate::error::Error;
use crate::lru::LruCache;

// == Strategies ==
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: u8, value: u32 },
    Get { key: u8 },
    TryGet { key: u8 },
    Peek { key: u8 },
}

fn cache_op_strategy(key_space: u8) -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (0..key_space, any::<u32>()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        1 => (0..key_space).prop_map(|key| CacheOp::Get { key }),
        1 => (0..key_space).prop_map(|key| CacheOp::TryGet { key }),
        1 => (0..key_space).prop_map(|key| CacheOp::Peek { key }),
    ]
}

/// Reference model: entries most recent first
struct Model {
    entries: Vec<(u8, u32)>,
    capacity: usize,
}

impl Model {
    fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity,
        }
    }

    fn position(&self, key: u8) -> Option<usize> {
        self.entries.iter().position(|&(k, _)| k == key)
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        let pos = self.position(key)?;
        let entry = self.entries.remove(pos);
        self.entries.insert(0, entry);
        Some(entry.1)
    }

    fn peek(&self, key: u8) -> Option<u32> {
        self.position(key).map(|pos| self.entries[pos].1)
    }

    fn set(&mut self, key: u8, value: u32) {
        if let Some(pos) = self.position(key) {
            self.entries.remove(pos);
        } else if self.entries.len() == self.capacity {
            self.entries.pop();
        }
        self.entries.insert(0, (key, value));
    }
}

fn assert_matches_model(cache: &LruCache<u8, u32>, model: &Model) -> Result<(), TestCaseError> {
    let actual: Vec<(u8, u32)> = cache.iter().map(|(k, v)| (*k, *v)).collect();
    prop_assert_eq!(&actual, &model.entries);
    prop_assert_eq!(cache.len(), model.entries.len());
    prop_assert!(cache.check_invariants().is_ok(), "{:?}", cache.check_invariants());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Cache and model agree on contents and recency order after every operation
    #[test]
    fn prop_matches_reference_model(
        capacity in 1usize..12,
        ops in prop::collection::vec(cache_op_strategy(24), 1..200),
    ) {
        let mut cache = LruCache::new(capacity).unwrap();
        let mut model = Model::new(capacity);

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(key, value).unwrap();
                    model.set(key, value);
                }
                CacheOp::Get { key } => {
                    let expected = model.get(key);
                    match cache.get(&key) {
                        Ok(&value) => {
                            prop_assert_eq!(Some(value), expected);
                        }
                        Err(err) => {
                            prop_assert_eq!(err, Error::NotFound);
                            prop_assert_eq!(expected, None);
                        }
                    }
                }
                CacheOp::TryGet { key } => {
                    let expected = model.get(key);
                    prop_assert_eq!(cache.try_get(&key).unwrap().copied(), expected);
                }
                CacheOp::Peek { key } => {
                    prop_assert_eq!(cache.peek(&key).unwrap().copied(), model.peek(key));
                }
            }
            assert_matches_model(&cache, &model)?;
        }
    }

    // Below capacity every distinct key stays retrievable with its latest value
    #[test]
    fn prop_no_eviction_below_capacity(
        sets in prop::collection::vec((0u8..32, any::<u32>()), 1..100),
    ) {
        let mut cache = LruCache::new(64).unwrap();
        let mut latest = std::collections::HashMap::new();

        for (key, value) in sets {
            cache.set(key, value).unwrap();
            latest.insert(key, value);
        }

        prop_assert_eq!(cache.len(), latest.len());
        for (key, value) in latest {
            prop_assert_eq!(cache.get(&key), Ok(&value));
        }
    }

    // Updating a present key never changes len and never evicts
    #[test]
    fn prop_update_keeps_len(
        capacity in 1usize..16,
        updates in prop::collection::vec(any::<u32>(), 1..20),
    ) {
        let mut cache = LruCache::new(capacity).unwrap();
        for key in 0..capacity {
            cache.set(key, 0u32).unwrap();
        }
        let before: Vec<usize> = cache.iter().map(|(k, _)| *k).collect();

        for value in updates {
            cache.set(0, value).unwrap();
            prop_assert_eq!(cache.len(), capacity);
        }

        let mut after: Vec<usize> = cache.iter().map(|(k, _)| *k).collect();
        let mut sorted_before = before;
        sorted_before.sort_unstable();
        after.sort_unstable();
        prop_assert_eq!(after, sorted_before);
    }

    // Forward and backward traversals are mirror images
    #[test]
    fn prop_traversals_mirror(
        capacity in 1usize..20,
        keys in prop::collection::vec(0u16..50, 1..150),
    ) {
        let mut cache = LruCache::new(capacity).unwrap();
        for (i, key) in keys.into_iter().enumerate() {
            if i % 3 == 0 {
                let _ = cache.try_get(&key).unwrap();
            } else {
                cache.set(key, i).unwrap();
            }
        }

        let forward: Vec<u16> = cache.iter().map(|(k, _)| *k).collect();
        let mut backward: Vec<u16> = cache.iter().rev().map(|(k, _)| *k).collect();
        backward.reverse();
        prop_assert_eq!(forward.len(), cache.len());
        prop_assert_eq!(forward, backward);
    }

    // The null key is rejected without touching the cache
    #[test]
    fn prop_null_key_rejected(keys in prop::collection::vec(any::<u8>(), 0..20)) {
        let mut cache = LruCache::with_comparer(8, NullableComparer::new(DefaultComparer::new())).unwrap();
        for key in &keys {
            cache.set(Some(*key), ()).unwrap();
        }
        let before: Vec<Option<u8>> = cache.iter().map(|(k, _)| *k).collect();

        prop_assert!(matches!(cache.get(&None), Err(Error::InvalidArgument(_))));
        prop_assert!(matches!(cache.set(None, ()), Err(Error::InvalidArgument(_))));

        let after: Vec<Option<u8>> = cache.iter().map(|(k, _)| *k).collect();
        prop_assert_eq!(before, after);
    }
}
