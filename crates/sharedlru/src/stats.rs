//! Cache statistics tracking

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the counters, plus gauges captured with it
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    /// Lookups that found their key
    pub hits: u64,
    /// Lookups that missed
    pub misses: u64,
    /// Sets that stored a new key
    pub inserts: u64,
    /// Sets that overwrote an existing key
    pub updates: u64,
    /// Entries dropped to make room for a new key
    pub evictions: u64,
    /// Entries cached when the snapshot was taken
    pub len: usize,
    /// Cache capacity
    pub capacity: usize,
}

impl StatsSnapshot {
    /// Hit ratio (0.0 to 1.0), zero before the first lookup
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Lock-free counters updated alongside every cache operation
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_lookup(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_set(&self, outcome: SetOutcome) {
        match outcome {
            SetOutcome::Updated => {
                self.updates.fetch_add(1, Ordering::Relaxed);
            }
            SetOutcome::Inserted => {
                self.inserts.fetch_add(1, Ordering::Relaxed);
            }
            SetOutcome::Evicted => {
                self.inserts.fetch_add(1, Ordering::Relaxed);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Get total hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get total misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get total evictions
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Get total inserts of new keys
    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    /// Get total overwrites of existing keys
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        self.snapshot(0, 0).hit_ratio()
    }

    /// Copy the counters out together with the given gauges
    pub fn snapshot(&self, len: usize, capacity: usize) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits(),
            misses: self.misses(),
            inserts: self.inserts(),
            updates: self.updates(),
            evictions: self.evictions(),
            len,
            capacity,
        }
    }

    /// Reset all statistics
    pub fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.inserts,
            &self.updates,
            &self.evictions,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// What a `set` did to the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetOutcome {
    Updated,
    Inserted,
    Evicted,
}
