//! Cache configuration
//!
//! ```rust
//! use arenalru::LruBuilder;
//!
//! let mut cache = LruBuilder::new(100).seeded(42).build::<u64, String>().unwrap();
//! cache.set(1, "hello".to_string()).unwrap();
//! assert_eq!(cache.get(&1).unwrap(), "hello");
//! ```

use crate::comparer::{DefaultComparer, KeyComparer};
use crate::error::Result;
use crate::lru::LruCache;

/// Builder for [`LruCache`]
#[derive(Debug, Clone)]
pub struct LruBuilder<C = DefaultComparer> {
    capacity: usize,
    comparer: C,
}

impl LruBuilder {
    /// Start a builder for a cache holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            comparer: DefaultComparer::new(),
        }
    }

    /// Hash with a fixed seed instead of a random one
    pub fn seeded(mut self, seed: u64) -> Self {
        self.comparer = DefaultComparer::with_seeds(seed, seed, seed, seed);
        self
    }
}

impl<C> LruBuilder<C> {
    /// Override the capacity
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Use a custom key comparer
    pub fn comparer<D>(self, comparer: D) -> LruBuilder<D> {
        LruBuilder {
            capacity: self.capacity,
            comparer,
        }
    }

    /// Build the cache
    ///
    /// # Errors
    /// * `Error::InvalidArgument` - capacity is zero
    pub fn build<K, V>(self) -> Result<LruCache<K, V, C>>
    where
        C: KeyComparer<K>,
    {
        LruCache::with_comparer(self.capacity, self.comparer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparer::NullableComparer;
    use crate::error::Error;

    #[test]
    fn test_builder_basic() {
        let mut cache = LruBuilder::new(2).build::<i32, &str>().unwrap();

        cache.set(1, "a").unwrap();
        assert_eq!(cache.capacity(), 2);
        assert_eq!(cache.get(&1), Ok(&"a"));
    }

    #[test]
    fn test_builder_zero_capacity() {
        let result = LruBuilder::new(8).capacity(0).build::<i32, i32>();
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_builder_comparer() {
        let mut cache = LruBuilder::new(4)
            .comparer(NullableComparer::new(DefaultComparer::new()))
            .build::<Option<u8>, u8>()
            .unwrap();

        cache.set(Some(1), 1).unwrap();
        assert!(cache.set(None, 2).is_err());
        assert_eq!(cache.len(), 1);
    }
}
