//! Cache Module
//!
//! In-memory TTL response cache with content-hash validators.
//!
//! - `keys`: deterministic key construction
//! - `store`: the TTL map itself, with lazy expiry on read
//! - `etag`: content hashing of payloads
//! - `pattern`: glob matching used by invalidation
//! - `conditional`: `If-None-Match` negotiation and response headers
//! - `flight`: per-key coalescing of concurrent misses

pub mod conditional;
mod entry;
mod etag;
mod flight;
pub mod keys;
mod pattern;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use conditional::{cached_response, negotiate, CacheOutcome, Negotiation};
pub use entry::{current_timestamp_ms, CacheEntry};
pub use etag::{fingerprint, generate_etag, Fingerprint};
pub use flight::{FlightGuard, InFlight};
pub use keys::{create_key, KEY_DELIMITER};
pub use pattern::{KeyPattern, WILDCARD};
pub use stats::{CacheCounters, CacheStats};
pub use store::CacheStore;

/// Store of JSON payloads shared by handlers, the invalidation router and the reaper.
pub type SharedCache = Arc<RwLock<CacheStore<serde_json::Value>>>;

/// Creates an empty shared store.
pub fn shared_cache() -> SharedCache {
    Arc::new(RwLock::new(CacheStore::new()))
}
