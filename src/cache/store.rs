//! Cache Store Module
//!
//! Bounded key/value store combining HashMap storage with LRU tracking and
//! per-entry TTL expiration. Safe to share across request tasks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats, JsonPayload, LruTracker};

/// Store handle shared between the interceptor, handlers and background tasks.
pub type SharedStore = Arc<CacheStore>;

// == Store State ==
/// Everything guarded by the store lock.
#[derive(Debug, Default)]
struct StoreState {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
}

impl StoreState {
    fn remove(&mut self, key: &str) -> bool {
        self.lru.remove(key);
        self.entries.remove(key).is_some()
    }

    fn sync_len(&mut self) {
        let len = self.entries.len();
        debug_assert_eq!(self.lru.len(), len, "LRU tracker out of step with entries");
        self.stats.set_total_entries(len);
    }
}

// == Cache Store ==
/// Fixed-capacity TTL store with least-recently-used eviction.
///
/// Every operation runs inside one critical section, so other callers never
/// observe a half-applied write or a partially cleared store. The lock is
/// never held across an `.await`.
#[derive(Debug)]
pub struct CacheStore {
    state: Mutex<StoreState>,
    /// Maximum number of entries allowed
    max_entries: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` entries (minimum 1).
    pub fn new(max_entries: usize) -> Self {
        Self {
            state: Mutex::new(StoreState::default()),
            max_entries: max_entries.max(1),
        }
    }

    /// Creates a store already wrapped for sharing.
    pub fn shared(max_entries: usize) -> SharedStore {
        Arc::new(Self::new(max_entries))
    }

    // Every mutation leaves the state consistent before anything can panic,
    // so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Get ==
    /// Returns the live payload stored under `key`.
    ///
    /// Expired entries are removed on sight and reported as absent. A hit
    /// marks the key as most recently used.
    pub fn get(&self, key: &str) -> Option<JsonPayload> {
        let mut state = self.lock();
        let now = current_timestamp_ms();

        let expired = match state.entries.get(key).map(|entry| entry.is_expired_at(now)) {
            Some(expired) => expired,
            None => {
                state.stats.record_miss();
                return None;
            }
        };

        if expired {
            state.remove(key);
            state.sync_len();
            state.stats.record_expirations(1);
            state.stats.record_miss();
            return None;
        }

        let payload = state.entries.get(key).map(|entry| entry.payload.clone());
        state.lru.touch(key);
        state.stats.record_hit();
        payload
    }

    // == Set ==
    /// Stores `payload` under `key` for `ttl_seconds`.
    ///
    /// Overwrites any existing entry and resets its TTL. When the store is
    /// full and `key` is new, exactly one least recently used entry is
    /// evicted first. Never fails for lack of room.
    pub fn set(&self, key: impl Into<String>, payload: impl Into<JsonPayload>, ttl_seconds: u64) {
        let key = key.into();
        let payload = payload.into();
        let mut state = self.lock();

        if !state.entries.contains_key(&key) && state.entries.len() >= self.max_entries {
            if let Some(evicted) = state.lru.evict_oldest() {
                state.entries.remove(&evicted);
                state.stats.record_eviction();
                tracing::trace!(key = %evicted, "evicted least recently used entry");
            }
        }

        state.lru.touch(&key);
        state.entries.insert(key, CacheEntry::new(payload, ttl_seconds));
        state.stats.record_store();
        state.sync_len();
    }

    // == Delete ==
    /// Removes `key` if present. Returns whether an entry was removed.
    pub fn delete(&self, key: &str) -> bool {
        let mut state = self.lock();
        let removed = state.remove(key);
        state.sync_len();
        removed
    }

    // == Clear ==
    /// Drops every entry in a single step. Counters are kept.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.lru.clear();
        state.sync_len();
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let mut state = self.lock();
        let now = current_timestamp_ms();

        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.remove(key);
        }

        state.stats.record_expirations(expired.len());
        state.sync_len();
        expired.len()
    }

    // == Stats ==
    /// Returns a snapshot of the store counters.
    pub fn stats(&self) -> CacheStats {
        self.lock().stats.clone()
    }

    /// Number of entries currently held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.max_entries
    }
}
