//! LRU (Least Recently Used) cache implementation
//!
//! A chained hash table and a doubly-linked recency list share one arena of
//! slots. Both structures link by slot index, so there is no per-entry
//! allocation and no separate node type.
//!
//! ```text
//!   buckets                slots (arena)
//!   ┌───┐        ┌──────┬──────┬─────────────┬───────────┬───────────┐
//!   │ 0 │──► 2   │ slot │ hash │ chain_next  │ list_prev │ list_next │
//!   │ 1 │──► NIL ├──────┼──────┼─────────────┼───────────┼───────────┤
//!   │ 2 │──► 1   │  0   │  …   │ NIL         │ 1         │ NIL       │ ◄── tail
//!   └───┘        │  1   │  …   │ 0           │ 2         │ 0         │
//!                │  2   │  …   │ NIL         │ NIL       │ 1         │ ◄── head
//!                └──────┴──────┴─────────────┴───────────┴───────────┘
//! ```
//!
//! ## Slot lifecycle
//! - Below capacity, new keys append to the arena. When the arena is full the
//!   arena and bucket table grow together to the next prime size.
//! - At capacity, the tail slot is unlinked from both structures and reused
//!   in place for the incoming key. The arena never grows again.
//!
//! ## Performance
//! - `get` / `try_get` / `set`: O(1) average, O(chain length) worst case
//! - eviction: O(chain length) to splice the tail out of its bucket
//! - growth: O(len) rehash, amortized over the inserts that filled the table

use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;

use tracing::{debug, trace};

use crate::comparer::{DefaultComparer, KeyComparer};
use crate::error::{Error, Result};
use crate::primes;

/// Sentinel slot index meaning "no link"
const NIL: usize = usize::MAX;

/// One arena record: a key/value pair plus its chain and recency links
struct Slot<K, V> {
    hash: u32,
    key: K,
    value: V,
    /// Next slot in the same bucket chain
    chain_next: usize,
    /// Neighbour towards the head (more recently used)
    list_prev: usize,
    /// Neighbour towards the tail (less recently used)
    list_next: usize,
}

/// LRU cache with fixed capacity
pub struct LruCache<K, V, C = DefaultComparer> {
    comparer: C,
    buckets: Vec<usize>,
    slots: Vec<Slot<K, V>>,
    head: usize,
    tail: usize,
    len: usize,
    capacity: usize,
}

impl<K: Hash + Eq, V> LruCache<K, V> {
    /// Create a new LRU cache with the given capacity
    ///
    /// Nothing is allocated until the first insert.
    ///
    /// # Errors
    /// * `Error::InvalidArgument` - `capacity` is zero
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_comparer(capacity, DefaultComparer::new())
    }
}

impl<K, V, C> LruCache<K, V, C> {
    /// Get the number of cached entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry and release the arena
    ///
    /// The cache returns to its unallocated state; capacity and comparer are kept.
    pub fn clear(&mut self) {
        self.buckets = Vec::new();
        self.slots = Vec::new();
        self.head = NIL;
        self.tail = NIL;
        self.len = 0;
    }

    /// Iterate entries from most to least recently used
    ///
    /// Iteration does not change recency order. `.rev()` walks from the tail.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }
}

impl<K, V, C: KeyComparer<K>> LruCache<K, V, C> {
    /// Create a new LRU cache that hashes and compares keys with `comparer`
    ///
    /// # Errors
    /// * `Error::InvalidArgument` - `capacity` is zero
    pub fn with_comparer(capacity: usize, comparer: C) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidArgument("capacity must be greater than 0"));
        }

        Ok(Self {
            comparer,
            buckets: Vec::new(),
            slots: Vec::new(),
            head: NIL,
            tail: NIL,
            len: 0,
            capacity,
        })
    }

    /// Get a value and mark it most recently used
    ///
    /// # Errors
    /// * `Error::NotFound` - key is not cached
    /// * `Error::InvalidArgument` - key is null
    pub fn get(&mut self, key: &K) -> Result<&V> {
        self.try_get(key)?.ok_or(Error::NotFound)
    }

    /// Get a value if present and mark it most recently used
    ///
    /// # Errors
    /// * `Error::InvalidArgument` - key is null
    pub fn try_get(&mut self, key: &K) -> Result<Option<&V>> {
        let idx = self.find(key)?;
        if idx == NIL {
            return Ok(None);
        }

        self.touch(idx);
        Ok(Some(&self.slots[idx].value))
    }

    /// Get a value without changing recency order
    pub fn peek(&self, key: &K) -> Result<Option<&V>> {
        let idx = self.find(key)?;
        Ok((idx != NIL).then(|| &self.slots[idx].value))
    }

    /// Check membership without changing recency order
    pub fn contains_key(&self, key: &K) -> Result<bool> {
        Ok(self.find(key)? != NIL)
    }

    /// Insert or update a key-value pair and mark it most recently used
    ///
    /// Updating an existing key never evicts. Inserting a new key into a full
    /// cache evicts the least recently used entry and drops its value.
    ///
    /// # Errors
    /// * `Error::InvalidArgument` - key is null
    /// * `Error::InvalidOperation` - no table size can hold `capacity`
    pub fn set(&mut self, key: K, value: V) -> Result<()> {
        self.check_key(&key)?;

        if self.buckets.is_empty() {
            self.initialize();
        }

        let hash = self.comparer.hash(&key);

        // Update existing
        let idx = self.find_in_chain(hash, &key);
        if idx != NIL {
            self.slots[idx].value = value;
            self.touch(idx);
            return Ok(());
        }

        let slot = Slot {
            hash,
            key,
            value,
            chain_next: NIL,
            list_prev: NIL,
            list_next: NIL,
        };

        let idx = if self.len == self.capacity {
            let idx = self.evict_tail();
            self.slots[idx] = slot;
            idx
        } else {
            if self.slots.len() == self.buckets.len() {
                self.grow()?;
            }
            self.slots.push(slot);
            self.slots.len() - 1
        };

        self.link_bucket(idx);
        self.link_front(idx);
        self.len += 1;
        Ok(())
    }

    /// Walk both structures and report the first broken invariant
    ///
    /// # Errors
    /// * `Error::InvalidOperation` - describes the violated invariant
    pub fn check_invariants(&self) -> Result<()> {
        if self.len > self.capacity {
            return Err(invariant(format!(
                "len {} exceeds capacity {}",
                self.len, self.capacity
            )));
        }
        if self.slots.len() != self.len {
            return Err(invariant(format!(
                "{} slots allocated for {} live entries",
                self.slots.len(),
                self.len
            )));
        }
        if (self.head == NIL) != (self.tail == NIL) || (self.head == NIL) != (self.len == 0) {
            return Err(invariant("head, tail and len disagree on emptiness"));
        }
        if self.buckets.is_empty() {
            return if self.len == 0 {
                Ok(())
            } else {
                Err(invariant("live entries without a bucket table"))
            };
        }

        // Forward walk checks back links and bounds the length
        let mut prev = NIL;
        let mut idx = self.head;
        let mut forward = Vec::with_capacity(self.len);
        while idx != NIL {
            if forward.len() == self.len || idx >= self.slots.len() {
                return Err(invariant("recency list is cyclic or out of bounds"));
            }
            if self.slots[idx].list_prev != prev {
                return Err(invariant(format!("slot {} has a stale list_prev", idx)));
            }
            forward.push(idx);
            prev = idx;
            idx = self.slots[idx].list_next;
        }
        if prev != self.tail || forward.len() != self.len {
            return Err(invariant(format!(
                "recency list holds {} slots, expected {}",
                forward.len(),
                self.len
            )));
        }

        let backward: Vec<usize> = {
            let mut order = Vec::with_capacity(self.len);
            let mut idx = self.tail;
            while idx != NIL && order.len() < self.len {
                order.push(idx);
                idx = self.slots[idx].list_prev;
            }
            order
        };
        if !backward.iter().rev().eq(forward.iter()) {
            return Err(invariant("backward walk is not the reverse of forward walk"));
        }

        // Every slot sits in exactly one chain, in the bucket its hash selects
        let mut chained = 0;
        for (bucket, &first) in self.buckets.iter().enumerate() {
            let mut idx = first;
            let mut chain = Vec::new();
            while idx != NIL {
                if chained == self.len || idx >= self.slots.len() {
                    return Err(invariant("bucket chain is cyclic or out of bounds"));
                }
                let slot = &self.slots[idx];
                if self.bucket_of(slot.hash) != bucket {
                    return Err(invariant(format!("slot {} chained in wrong bucket", idx)));
                }
                if self.comparer.hash(&slot.key) != slot.hash {
                    return Err(invariant(format!("slot {} has a stale hash", idx)));
                }
                if chain
                    .iter()
                    .any(|&other: &usize| self.comparer.equals(&self.slots[other].key, &slot.key))
                {
                    return Err(invariant(format!("slot {} duplicates a key", idx)));
                }
                chain.push(idx);
                chained += 1;
                idx = slot.chain_next;
            }
        }
        if chained != self.len {
            return Err(invariant(format!(
                "bucket chains hold {} slots, expected {}",
                chained, self.len
            )));
        }

        Ok(())
    }

    fn check_key(&self, key: &K) -> Result<()> {
        if self.comparer.is_null(key) {
            return Err(Error::InvalidArgument("key must not be null"));
        }
        Ok(())
    }

    fn find(&self, key: &K) -> Result<usize> {
        self.check_key(key)?;

        if self.buckets.is_empty() {
            return Ok(NIL);
        }

        let hash = self.comparer.hash(key);
        Ok(self.find_in_chain(hash, key))
    }

    fn find_in_chain(&self, hash: u32, key: &K) -> usize {
        let mut idx = self.buckets[self.bucket_of(hash)];
        while idx != NIL {
            let slot = &self.slots[idx];
            // Cheap reject on hash before the full comparison
            if slot.hash == hash && self.comparer.equals(&slot.key, key) {
                return idx;
            }
            idx = slot.chain_next;
        }
        NIL
    }

    #[inline]
    fn bucket_of(&self, hash: u32) -> usize {
        hash as usize % self.buckets.len()
    }

    fn initialize(&mut self) {
        debug!(
            size = primes::INITIAL_SIZE,
            capacity = self.capacity,
            "allocating lru arena"
        );
        self.buckets = vec![NIL; primes::INITIAL_SIZE];
        self.slots = Vec::with_capacity(primes::INITIAL_SIZE);
    }

    /// Move a slot to the head of the recency list
    fn touch(&mut self, idx: usize) {
        debug_assert!(self.head != NIL && self.tail != NIL);

        let prev = self.slots[idx].list_prev;
        if prev == NIL {
            // Already head, which also covers the single-entry list
            debug_assert_eq!(self.head, idx);
            return;
        }

        let next = self.slots[idx].list_next;
        self.slots[prev].list_next = next;
        if next == NIL {
            debug_assert_eq!(self.tail, idx);
            self.tail = prev;
        } else {
            self.slots[next].list_prev = prev;
        }

        self.link_front(idx);
    }

    /// Link a slot in as the new head. Its old list links are ignored.
    fn link_front(&mut self, idx: usize) {
        let old_head = self.head;

        let slot = &mut self.slots[idx];
        slot.list_prev = NIL;
        slot.list_next = old_head;

        if old_head == NIL {
            self.tail = idx;
        } else {
            self.slots[old_head].list_prev = idx;
        }
        self.head = idx;
    }

    fn link_bucket(&mut self, idx: usize) {
        let bucket = self.bucket_of(self.slots[idx].hash);
        self.slots[idx].chain_next = self.buckets[bucket];
        self.buckets[bucket] = idx;
    }

    fn unlink_bucket(&mut self, idx: usize) {
        let bucket = self.bucket_of(self.slots[idx].hash);

        let mut prev = NIL;
        let mut cur = self.buckets[bucket];
        while cur != NIL {
            let next = self.slots[cur].chain_next;
            if cur == idx {
                if prev == NIL {
                    self.buckets[bucket] = next;
                } else {
                    self.slots[prev].chain_next = next;
                }
                return;
            }
            prev = cur;
            cur = next;
        }
    }

    /// Unlink the least recently used slot from both structures.
    ///
    /// The returned slot is in no list or chain; the caller must relink it.
    fn evict_tail(&mut self) -> usize {
        debug_assert!(self.tail != NIL);

        let freed = self.tail;
        if self.len == 1 {
            debug_assert_eq!(self.head, freed);
            self.head = NIL;
            self.tail = NIL;
        } else {
            debug_assert!(self.head != freed);
            debug_assert_eq!(self.slots[freed].list_next, NIL);
            let prev = self.slots[freed].list_prev;
            self.slots[prev].list_next = NIL;
            self.tail = prev;
        }

        self.unlink_bucket(freed);
        self.len -= 1;

        trace!(slot = freed, "evicting least recently used entry");
        freed
    }

    /// Grow the arena and bucket table to the next prime size and rehash.
    ///
    /// Recency links are slot indices, so only the chains need rebuilding.
    fn grow(&mut self) -> Result<()> {
        debug_assert!(self.len < self.capacity);

        let target = self.capacity.min(self.len.saturating_mul(2));
        let size = primes::next_prime(target).ok_or_else(|| {
            Error::InvalidOperation(format!(
                "capacity {} is too big for the lru table",
                self.capacity
            ))
        })?;
        debug_assert!(size > self.slots.len());

        debug!(
            from = self.buckets.len(),
            to = size,
            len = self.len,
            "growing lru arena"
        );

        let mut buckets = vec![NIL; size];
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            let bucket = slot.hash as usize % size;
            slot.chain_next = buckets[bucket];
            buckets[bucket] = idx;
        }

        self.slots.reserve_exact(size - self.slots.len());
        self.buckets = buckets;
        Ok(())
    }
}

fn invariant(msg: impl Into<String>) -> Error {
    Error::InvalidOperation(msg.into())
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for LruCache<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C> IntoIterator for &'a LruCache<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over cache entries in recency order, most recent first
pub struct Iter<'a, K, V> {
    slots: &'a [Slot<K, V>],
    front: usize,
    back: usize,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let slot = &self.slots[self.front];
        self.front = slot.list_next;
        self.remaining -= 1;
        Some((&slot.key, &slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let slot = &self.slots[self.back];
        self.back = slot.list_prev;
        self.remaining -= 1;
        Some((&slot.key, &slot.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
