//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies. Cached mobile
//! payloads are served as-is and have no DTO here.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::invalidation::Domain;

/// Response body for the invalidation endpoints
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Number of cache entries removed
    pub removed: usize,
    /// Domains that were invalidated, in request order
    pub domains: Vec<Domain>,
}

/// Response body for `DELETE /admin/cache`
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Number of entries dropped
    pub cleared: usize,
}

/// Response body for the stats endpoint (GET /admin/cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of stored entries
    pub size: usize,
    /// Stored keys, sorted
    pub keys: Vec<String>,
    /// Approximate bytes held by keys and payloads
    pub approximate_memory: usize,
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Keys with a miss computation currently running
    pub in_flight: usize,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a store snapshot
    pub fn new(stats: CacheStats, in_flight: usize) -> Self {
        let hit_rate = stats.hit_rate();
        Self {
            size: stats.size,
            keys: stats.keys,
            approximate_memory: stats.approximate_memory,
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            hit_rate,
            in_flight,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_hit_rate() {
        let stats = CacheStats {
            size: 1,
            keys: vec!["mobile:cards:all".to_string()],
            approximate_memory: 40,
            hits: 80,
            misses: 20,
            expirations: 0,
        };
        let resp = StatsResponse::new(stats, 0);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.keys.len(), 1);
    }

    #[test]
    fn test_invalidate_response_serialize() {
        let resp = InvalidateResponse {
            removed: 3,
            domains: vec![Domain::Polls],
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["removed"], 3);
        assert_eq!(json["domains"][0], "polls");
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
