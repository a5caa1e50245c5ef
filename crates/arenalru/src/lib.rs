//! # arenalru
//!
//! Fixed-capacity LRU cache with no per-entry allocation.
//!
//! ## Architecture
//! - **Arena**: one `Vec` of slots holding every key/value pair
//! - **Hash table**: prime-sized buckets chaining slots by index (O(1))
//! - **LRU list**: doubly-linked list threaded through the same slots (O(1))
//! - **Eviction**: the tail slot is reused in place once capacity is reached
//!
//! ```rust
//! use arenalru::{Error, LruCache};
//!
//! let mut cache = LruCache::new(2)?;
//! cache.set("a", 1)?;
//! cache.set("b", 2)?;
//! cache.get(&"a")?;
//! cache.set("c", 3)?; // evicts "b"
//!
//! assert_eq!(cache.try_get(&"b")?, None);
//! assert_eq!(cache.get(&"b"), Err(Error::NotFound));
//! # Ok::<(), Error>(())
//! ```
//!
//! The cache is single-owner. Share it behind a lock around the whole
//! instance; lookups reorder the recency list, so readers mutate too.

#![warn(missing_docs)]

mod builder;
mod comparer;
mod error;
mod lru;
mod primes;

#[cfg(test)]
mod property_tests;

pub use builder::LruBuilder;
pub use comparer::{DefaultComparer, KeyComparer, NullableComparer};
pub use error::{Error, Result};
pub use lru::{Iter, LruCache};
