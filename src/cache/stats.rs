//! Cache Statistics Module
//!
//! Diagnostic counters and a point-in-time snapshot of the store. Nothing in
//! here drives eviction; expiry is purely time based.

use serde::Serialize;

// == Cache Counters ==
/// Running counters maintained by the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheCounters {
    /// Number of fresh entries returned
    pub hits: u64,
    /// Number of lookups that found nothing fresh
    pub misses: u64,
    /// Number of entries dropped because their TTL elapsed
    pub expirations: u64,
}

impl CacheCounters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }
}

// == Cache Stats ==
/// Snapshot returned by `CacheStore::stats`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Current number of entries, fresh or not yet reaped
    pub size: usize,
    /// Stored keys, sorted
    pub keys: Vec<String>,
    /// Sum of key lengths and serialized payload sizes, in bytes
    pub approximate_memory: usize,
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn stats(hits: u64, misses: u64) -> CacheStats {
        CacheStats {
            hits,
            misses,
            ..Default::default()
        }
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(stats(0, 0).hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        assert_eq!(stats(3, 0).hit_rate(), 1.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        assert_eq!(stats(1, 1).hit_rate(), 0.5);
    }

    #[test]
    fn test_counters() {
        let mut counters = CacheCounters::default();
        counters.record_hit();
        counters.record_miss();
        counters.record_miss();
        counters.record_expirations(3);
        assert_eq!(counters.hits, 1);
        assert_eq!(counters.misses, 2);
        assert_eq!(counters.expirations, 3);
    }
}
