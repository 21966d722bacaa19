//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{shared_cache, InFlight, SharedCache};
use crate::config::{Config, TtlConfig};
use crate::error::Result;
use crate::invalidation::{Domain, InvalidationRouter};
use crate::ratelimit::RateLimiter;
use crate::services::{ContentSource, HttpStreamProbe, InMemoryContent, RadioConfigCache, StreamProbe};

/// Name of the limiter guarding stream connectivity tests.
pub const STREAM_TEST_LIMITER: &str = "stream-test";
/// Name of the limiter guarding metadata scrapes.
pub const METADATA_LIMITER: &str = "metadata";

/// Process-wide singletons handed to every handler.
///
/// Everything is behind an `Arc`, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Response cache for the mobile API
    pub cache: SharedCache,
    /// Miss computations currently running, per key
    pub flights: Arc<InFlight>,
    /// Maps domain writes to cache key patterns
    pub router: Arc<InvalidationRouter>,
    pub stream_limiter: Arc<RateLimiter>,
    pub metadata_limiter: Arc<RateLimiter>,
    /// Where fresh payloads come from on a miss
    pub source: Arc<dyn ContentSource>,
    pub probe: Arc<dyn StreamProbe>,
    /// Memoized radio configuration, dropped on radio invalidation
    pub radio: Arc<RadioConfigCache>,
    pub ttl: TtlConfig,
}

impl AppState {
    /// Wires the caching layer around the given collaborators.
    ///
    /// Registers the radio config cache with the invalidation router.
    pub fn new(
        config: &Config,
        source: Arc<dyn ContentSource>,
        probe: Arc<dyn StreamProbe>,
    ) -> Self {
        let cache = shared_cache();
        let router = Arc::new(InvalidationRouter::new(cache.clone()));

        let radio = Arc::new(RadioConfigCache::new());
        let radio_cache = Arc::clone(&radio);
        router.register_callback(Domain::Radio, move || radio_cache.clear());

        Self {
            cache,
            flights: Arc::new(InFlight::new()),
            router,
            stream_limiter: Arc::new(RateLimiter::new(STREAM_TEST_LIMITER, config.stream_test_limit)),
            metadata_limiter: Arc::new(RateLimiter::new(METADATA_LIMITER, config.metadata_limit)),
            source,
            probe,
            radio,
            ttl: config.ttl,
        }
    }

    /// Creates the production state: seeded in-memory content and an HTTP stream probe.
    pub fn from_config(config: &Config) -> Result<Self> {
        let probe = HttpStreamProbe::new(Duration::from_secs(config.probe_timeout_secs))?;
        Ok(Self::new(
            config,
            Arc::new(InMemoryContent::seeded()),
            Arc::new(probe),
        ))
    }

    /// Limiters whose elapsed records the reaper should prune.
    pub fn limiters(&self) -> Vec<Arc<RateLimiter>> {
        vec![
            Arc::clone(&self.stream_limiter),
            Arc::clone(&self.metadata_limiter),
        ]
    }
}
