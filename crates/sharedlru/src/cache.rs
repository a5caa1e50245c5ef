//! SharedLruCache: an `LruCache` behind one lock, with statistics

use std::hash::Hash;
use std::sync::Arc;

use arenalru::{DefaultComparer, Error, KeyComparer, LruCache, Result};
use parking_lot::Mutex;
use tracing::debug;

use crate::stats::{CacheStats, SetOutcome, StatsSnapshot};

/// Cloneable, thread-safe handle to a single LRU cache
///
/// Every operation, lookups included, takes the same mutex: a hit reorders
/// the recency list, so there is no read-only path to share.
pub struct SharedLruCache<K, V, C = DefaultComparer> {
    /// The cache itself
    cache: Arc<Mutex<LruCache<K, V, C>>>,

    /// Cache statistics
    stats: Arc<CacheStats>,

    /// Cache capacity
    capacity: usize,
}

impl<K: Hash + Eq, V> SharedLruCache<K, V> {
    /// Create a new shared cache with the given capacity
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of items in cache
    ///
    /// # Returns
    /// * `Result<SharedLruCache>` - Empty cache handle, or
    ///   `Error::InvalidArgument` for a zero capacity
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_comparer(capacity, DefaultComparer::new())
    }
}

impl<K, V, C: KeyComparer<K>> SharedLruCache<K, V, C> {
    /// Create a new shared cache using a custom key comparer
    pub fn with_comparer(capacity: usize, comparer: C) -> Result<Self> {
        Ok(Self::from_cache(LruCache::with_comparer(capacity, comparer)?))
    }

    /// Wrap an existing cache
    pub fn from_cache(cache: LruCache<K, V, C>) -> Self {
        let capacity = cache.capacity();

        Self {
            cache: Arc::new(Mutex::new(cache)),
            stats: Arc::new(CacheStats::new()),
            capacity,
        }
    }

    /// Get a copy of a cached value
    ///
    /// # Arguments
    /// * `key` - Key to look up
    ///
    /// # Returns
    /// * `Result<V>` - The value, `Error::NotFound` on a miss, or
    ///   `Error::InvalidArgument` for a null key
    pub fn get(&self, key: &K) -> Result<V>
    where
        V: Clone,
    {
        self.try_get(key)?.ok_or(Error::NotFound)
    }

    /// Get a copy of a cached value if present
    pub fn try_get(&self, key: &K) -> Result<Option<V>>
    where
        V: Clone,
    {
        let value = self.cache.lock().try_get(key)?.cloned();
        self.stats.record_lookup(value.is_some());
        Ok(value)
    }

    /// Run `f` on a cached value without cloning it
    pub fn with_value<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Result<Option<R>> {
        let mut cache = self.cache.lock();
        let result = cache.try_get(key)?.map(f);
        self.stats.record_lookup(result.is_some());
        Ok(result)
    }

    /// Insert or update a value
    ///
    /// # Arguments
    /// * `key` - Key to store under
    /// * `value` - Value to cache
    ///
    /// # Returns
    /// * `Result<()>` - Ok once stored, `Error::InvalidArgument` for a null key
    pub fn set(&self, key: K, value: V) -> Result<()> {
        let mut cache = self.cache.lock();

        let outcome = if cache.contains_key(&key)? {
            SetOutcome::Updated
        } else if cache.len() == cache.capacity() {
            SetOutcome::Evicted
        } else {
            SetOutcome::Inserted
        };

        cache.set(key, value)?;
        self.stats.record_set(outcome);
        Ok(())
    }

    /// Check membership without changing recency order or statistics
    pub fn contains_key(&self, key: &K) -> Result<bool> {
        self.cache.lock().contains_key(key)
    }
}

impl<K, V, C> SharedLruCache<K, V, C> {
    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Copy the statistics together with the current length
    pub fn snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot(self.len(), self.capacity)
    }

    /// Get current cache size
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }

    /// Get cache capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry and reset statistics
    pub fn clear(&self) {
        let mut cache = self.cache.lock();
        debug!(len = cache.len(), "clearing shared lru cache");
        cache.clear();
        self.stats.reset();
    }
}

impl<K, V, C> Clone for SharedLruCache<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            stats: Arc::clone(&self.stats),
            capacity: self.capacity,
        }
    }
}
