//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::ratelimit::RateLimitConfig;

/// TTLs, in seconds, of the mobile API resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlConfig {
    pub news_page: u64,
    pub cards: u64,
    pub news_detail: u64,
    pub app_config: u64,
    pub polls: u64,
}

impl Default for TtlConfig {
    fn default() -> Self {
        Self {
            news_page: 120,
            cards: 180,
            news_detail: 300,
            app_config: 600,
            polls: 60,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Seconds between reaper sweeps
    pub reaper_interval: u64,
    /// Per-resource cache lifetimes
    pub ttl: TtlConfig,
    /// Budget for stream connectivity tests
    pub stream_test_limit: RateLimitConfig,
    /// Budget for stream metadata scraping
    pub metadata_limit: RateLimitConfig,
    /// Timeout for outbound stream probes, in seconds
    pub probe_timeout_secs: u64,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `REAPER_INTERVAL` - Reaper frequency in seconds (default: 60)
    /// - `NEWS_PAGE_TTL`, `CARDS_TTL`, `NEWS_DETAIL_TTL`, `APP_CONFIG_TTL`,
    ///   `POLLS_TTL` - resource TTLs in seconds (120, 180, 300, 600, 60)
    /// - `STREAM_TEST_LIMIT` / `STREAM_TEST_WINDOW_MS` (default: 10 per 60000)
    /// - `METADATA_LIMIT` / `METADATA_WINDOW_MS` (default: 30 per 60000)
    /// - `PROBE_TIMEOUT_SECS` - outbound probe timeout (default: 10)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            reaper_interval: env_or("REAPER_INTERVAL", defaults.reaper_interval),
            ttl: TtlConfig {
                news_page: env_or("NEWS_PAGE_TTL", defaults.ttl.news_page),
                cards: env_or("CARDS_TTL", defaults.ttl.cards),
                news_detail: env_or("NEWS_DETAIL_TTL", defaults.ttl.news_detail),
                app_config: env_or("APP_CONFIG_TTL", defaults.ttl.app_config),
                polls: env_or("POLLS_TTL", defaults.ttl.polls),
            },
            stream_test_limit: RateLimitConfig::new(
                env_or("STREAM_TEST_LIMIT", defaults.stream_test_limit.limit),
                env_or("STREAM_TEST_WINDOW_MS", defaults.stream_test_limit.window_ms),
            ),
            metadata_limit: RateLimitConfig::new(
                env_or("METADATA_LIMIT", defaults.metadata_limit.limit),
                env_or("METADATA_WINDOW_MS", defaults.metadata_limit.window_ms),
            ),
            probe_timeout_secs: env_or("PROBE_TIMEOUT_SECS", defaults.probe_timeout_secs),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            reaper_interval: 60,
            ttl: TtlConfig::default(),
            stream_test_limit: RateLimitConfig::new(10, 60_000),
            metadata_limit: RateLimitConfig::new(30, 60_000),
            probe_timeout_secs: 10,
        }
    }
}
