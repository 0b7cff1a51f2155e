//! Cache Module
//!
//! Cache keys plus an in-memory store with TTL expiration and LRU eviction.

mod entry;
mod key;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{CacheEntry, JsonPayload};
pub use key::{build_key, CacheKey, KeyBuilder};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{CacheStore, SharedStore};

// == Public Constants ==
/// Namespace tag prefixed to every key by default
pub const DEFAULT_NAMESPACE: &str = "mobile";

/// Default number of entries the store holds
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Default TTL in seconds for stored responses
pub const DEFAULT_TTL_SECS: u64 = 300;
