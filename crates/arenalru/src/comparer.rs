//! Key equality and hashing strategies
//!
//! The cache never calls `Hash`/`Eq` on keys directly; it goes through a
//! [`KeyComparer`]. This lets callers plug in case-insensitive matching,
//! custom hashing, or a null-key convention without wrapping every key.
//!
//! A comparer must keep `equals(a, b) => hash(a) == hash(b)`. The cache does
//! not check this; an inconsistent comparer makes lookups miss.

use std::hash::{BuildHasher, Hash};

use ahash::RandomState;

/// Hashing and equality strategy for cache keys
pub trait KeyComparer<K> {
    /// Hash a key down to the 32 bits stored in each slot
    fn hash(&self, key: &K) -> u32;

    /// Full key equality, only consulted after the hashes match
    fn equals(&self, a: &K, b: &K) -> bool;

    /// Whether `key` is the null sentinel, which every keyed operation rejects
    fn is_null(&self, _key: &K) -> bool {
        false
    }
}

/// Natural `Hash + Eq` comparer backed by AHash
#[derive(Debug, Clone, Default)]
pub struct DefaultComparer {
    state: RandomState,
}

impl DefaultComparer {
    /// Create a comparer with a random hash seed
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a comparer with a fixed hash seed
    pub fn with_seeds(k0: u64, k1: u64, k2: u64, k3: u64) -> Self {
        Self {
            state: RandomState::with_seeds(k0, k1, k2, k3),
        }
    }
}

impl<K: Hash + Eq> KeyComparer<K> for DefaultComparer {
    #[inline]
    fn hash(&self, key: &K) -> u32 {
        let full = BuildHasher::hash_one(&self.state, key);
        // fold the high half in so a truncating hash keeps its entropy
        (full ^ (full >> 32)) as u32
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Comparer for `Option<K>` keys: `None` is the null key
#[derive(Debug, Clone, Default)]
pub struct NullableComparer<C = DefaultComparer> {
    inner: C,
}

impl<C> NullableComparer<C> {
    /// Wrap a comparer for the inner key type
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<K, C: KeyComparer<K>> KeyComparer<Option<K>> for NullableComparer<C> {
    fn hash(&self, key: &Option<K>) -> u32 {
        match key {
            Some(key) => self.inner.hash(key),
            None => 0,
        }
    }

    fn equals(&self, a: &Option<K>, b: &Option<K>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => self.inner.equals(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    fn is_null(&self, key: &Option<K>) -> bool {
        key.is_none()
    }
}
