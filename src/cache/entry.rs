//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL and content hash.

use std::time::{SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// A cached payload with its validator and lifetime metadata.
///
/// Entries are owned by the store. Callers receive clones and never observe
/// in-place mutation: an entry is only ever replaced by a new `set` or removed.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    /// The stored payload
    pub data: T,
    /// Quoted content hash, usable directly as an `ETag` value
    pub content_hash: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// TTL the entry was stored with, in seconds
    pub ttl_secs: u64,
    /// Serialized payload size in bytes
    pub size_bytes: usize,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry expiring `ttl_secs` after `now`.
    pub fn new(data: T, content_hash: String, size_bytes: usize, ttl_secs: u64, now: u64) -> Self {
        Self {
            data,
            content_hash,
            created_at: now,
            expires_at: now.saturating_add(ttl_secs.saturating_mul(1000)),
            ttl_secs,
            size_bytes,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at the given instant.
    ///
    /// An entry is expired once `now >= expires_at`, so a TTL that has fully
    /// elapsed never yields a hit.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds at the given instant (0 once expired).
    pub fn ttl_remaining_ms_at(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ttl_secs: u64, now: u64) -> CacheEntry<&'static str> {
        CacheEntry::new("page", "\"abc\"".to_string(), 4, ttl_secs, now)
    }

    #[test]
    fn test_entry_expiry_timestamps() {
        let e = entry(120, 1_000);
        assert_eq!(e.created_at, 1_000);
        assert_eq!(e.expires_at, 121_000);
        assert_eq!(e.ttl_secs, 120);
    }

    #[test]
    fn test_entry_not_expired_before_deadline() {
        let e = entry(120, 0);
        assert!(!e.is_expired_at(119_999));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let e = entry(120, 0);
        assert!(e.is_expired_at(120_000), "Entry should be expired at boundary");
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let e = entry(0, 5_000);
        assert!(e.is_expired_at(5_000));
    }

    #[test]
    fn test_ttl_remaining() {
        let e = entry(10, 0);
        assert_eq!(e.ttl_remaining_ms_at(4_000), 6_000);
        assert_eq!(e.ttl_remaining_ms_at(20_000), 0);
    }

    #[test]
    fn test_fresh_entry_against_wall_clock() {
        let e = entry(60, current_timestamp_ms());
        let now = current_timestamp_ms();
        assert!(!e.is_expired_at(now));
        let remaining = e.ttl_remaining_ms_at(now) / 1000;
        assert!((59..=60).contains(&remaining));
    }
}
