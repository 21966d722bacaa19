//! Cache Store Module
//!
//! TTL cache keyed by string, with content-hash validators and glob invalidation.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{fingerprint, CacheCounters, CacheEntry, CacheStats, KeyPattern};
use crate::error::Result;

// == Cache Store ==
/// In-memory TTL cache.
///
/// Expired entries are never returned: reads check expiry and drop stale
/// entries on the spot, and the reaper task sweeps the rest periodically.
/// There is no capacity bound and no LRU policy.
#[derive(Debug)]
pub struct CacheStore<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// Diagnostic counters
    counters: CacheCounters,
}

impl<T> Default for CacheStore<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            counters: CacheCounters::default(),
        }
    }
}

impl<T: Serialize + Clone> CacheStore<T> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Set ==
    /// Stores a value for `ttl_secs` seconds and returns the stored entry.
    ///
    /// The returned entry carries the content hash, so callers can emit the
    /// validator without a second lookup. Overwrites reset the TTL.
    pub fn set(&mut self, key: impl Into<String>, value: T, ttl_secs: u64) -> Result<CacheEntry<T>> {
        self.set_at(key, value, ttl_secs, current_timestamp_ms())
    }

    /// Same as [`set`](Self::set) with an explicit current time.
    pub fn set_at(
        &mut self,
        key: impl Into<String>,
        value: T,
        ttl_secs: u64,
        now: u64,
    ) -> Result<CacheEntry<T>> {
        let print = fingerprint(&value)?;
        let entry = CacheEntry::new(value, print.etag, print.size_bytes, ttl_secs, now);
        self.entries.insert(key.into(), entry.clone());
        Ok(entry)
    }

    // == Get ==
    /// Returns the entry if present and fresh.
    pub fn get(&mut self, key: &str) -> Option<CacheEntry<T>> {
        self.get_at(key, current_timestamp_ms())
    }

    /// Same as [`get`](Self::get) with an explicit current time.
    pub fn get_at(&mut self, key: &str, now: u64) -> Option<CacheEntry<T>> {
        let found = self.fresh_at(key, now).cloned();
        if found.is_some() {
            self.counters.record_hit();
        } else {
            self.counters.record_miss();
        }
        found
    }

    /// Like [`get`](Self::get) but leaves the hit/miss counters alone.
    pub fn peek(&mut self, key: &str) -> Option<CacheEntry<T>> {
        self.fresh_at(key, current_timestamp_ms()).cloned()
    }

    // == Has ==
    /// Returns true if a fresh entry exists. Does not touch hit/miss counters.
    pub fn has(&mut self, key: &str) -> bool {
        self.has_at(key, current_timestamp_ms())
    }

    /// Same as [`has`](Self::has) with an explicit current time.
    pub fn has_at(&mut self, key: &str, now: u64) -> bool {
        self.fresh_at(key, now).is_some()
    }

    /// Looks up a key, dropping it first if it has expired.
    fn fresh_at(&mut self, key: &str, now: u64) -> Option<&CacheEntry<T>> {
        if self.remove_if_expired_at(key, now) {
            debug!(key, "dropped expired entry on read");
            return None;
        }
        self.entries.get(key)
    }

    // == Delete ==
    /// Removes a single key. Returns true if it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Invalidate ==
    /// Removes every key matching a glob pattern and returns how many went.
    ///
    /// A pattern without `*` only matches the identical key.
    pub fn invalidate(&mut self, pattern: &str) -> Result<usize> {
        let pattern = KeyPattern::compile(pattern)?;

        if let KeyPattern::Exact(key) = &pattern {
            return Ok(usize::from(self.entries.remove(key).is_some()));
        }

        let before = self.entries.len();
        self.entries.retain(|key, _| !pattern.matches(key));
        Ok(before - self.entries.len())
    }

    // == Clear ==
    /// Drops all entries. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // == Stats ==
    /// Returns a diagnostic snapshot.
    pub fn stats(&self) -> CacheStats {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();

        let approximate_memory = self
            .entries
            .iter()
            .map(|(key, entry)| key.len() + entry.size_bytes)
            .sum();

        CacheStats {
            size: self.entries.len(),
            keys,
            approximate_memory,
            hits: self.counters.hits,
            misses: self.counters.misses,
            expirations: self.counters.expirations,
        }
    }

    // == Expiry Sweep ==
    /// Snapshot of keys that are expired at `now`.
    pub fn expired_keys_at(&self, now: u64) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Removes `key` only if it is still expired at `now`.
    ///
    /// An entry overwritten since the snapshot was taken is kept.
    pub fn remove_if_expired_at(&mut self, key: &str, now: u64) -> bool {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_expired_at(now));

        if expired {
            self.entries.remove(key);
            self.counters.record_expirations(1);
        }
        expired
    }

    // == Length ==
    /// Returns the number of stored entries, including not-yet-reaped stale ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
