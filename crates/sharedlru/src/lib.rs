//! # sharedlru
//!
//! Thread-safe handle around an [`arenalru::LruCache`].
//!
//! ## Architecture
//! - **Cache**: one `LruCache` behind a `parking_lot::Mutex`
//! - **Handle**: `Arc`-backed, cheap to clone across threads
//! - **Stats**: lock-free hit/miss/insert/update/eviction counters

#![warn(missing_docs)]

mod cache;
mod stats;

pub use arenalru::{Error, Result};
pub use cache::SharedLruCache;
pub use stats::{CacheStats, StatsSnapshot};
