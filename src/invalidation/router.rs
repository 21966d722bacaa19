//! Invalidation Router
//!
//! Turns a write-completion signal (domain + optional entity id) into cache
//! deletions, then runs the cleanup callbacks other modules registered for
//! that domain.
//!
//! Call sites must invoke the router only after their write has committed.
//! Invalidating earlier lets a concurrent reader repopulate the cache with the
//! pre-write data.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::cache::{SharedCache, WILDCARD};
use crate::invalidation::Domain;

/// Cleanup hook run after a domain's patterns are deleted.
pub type InvalidationCallback = Arc<dyn Fn() + Send + Sync>;

/// Routes domain invalidations to the shared cache and registered callbacks.
pub struct InvalidationRouter {
    cache: SharedCache,
    callbacks: RwLock<HashMap<Domain, Vec<InvalidationCallback>>>,
}

impl InvalidationRouter {
    pub fn new(cache: SharedCache) -> Self {
        Self {
            cache,
            callbacks: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a callback invoked whenever `domain` is invalidated.
    pub fn register_callback<F>(&self, domain: Domain, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(domain)
            .or_default()
            .push(Arc::new(callback));
        info!(%domain, "invalidation callback registered");
    }

    pub fn callback_count(&self, domain: Domain) -> usize {
        self.callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&domain)
            .map_or(0, Vec::len)
    }

    /// Patterns deleted for a domain and optional id.
    pub fn patterns_for(domain: Domain, id: Option<&str>) -> Vec<String> {
        let mut patterns: Vec<String> = domain
            .general_patterns()
            .iter()
            .map(|p| p.to_string())
            .collect();

        match id {
            Some(id) if id.contains(WILDCARD) => {
                warn!(%domain, id, "entity id contains a wildcard, skipping id-scoped patterns");
            }
            Some(id) => patterns.extend(domain.id_patterns(id)),
            None => {}
        }
        patterns
    }

    /// Deletes every cache entry owned by `domain` (and `id`, when given),
    /// then runs the domain's callbacks. Returns the number of entries removed.
    ///
    /// A pattern that fails to compile is logged and skipped; the remaining
    /// patterns and callbacks still run.
    pub async fn invalidate_entity_cache(&self, domain: Domain, id: Option<&str>) -> usize {
        let patterns = Self::patterns_for(domain, id);

        let removed: usize = {
            let mut store = self.cache.write().await;
            patterns
                .iter()
                .map(|pattern| match store.invalidate(pattern) {
                    Ok(count) => count,
                    Err(e) => {
                        warn!(%domain, pattern = %pattern, error = %e, "ignoring malformed invalidation pattern");
                        0
                    }
                })
                .sum()
        };

        let callbacks: Vec<InvalidationCallback> = self
            .callbacks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&domain)
            .cloned()
            .unwrap_or_default();
        for callback in &callbacks {
            callback();
        }

        info!(
            %domain,
            id = id.unwrap_or("-"),
            removed,
            callbacks = callbacks.len(),
            "cache invalidated"
        );
        removed
    }

    /// Invalidates several domains. Each one is handled independently, so the
    /// order of `entities` does not affect the outcome.
    pub async fn invalidate_multiple_entities(&self, entities: &[(Domain, Option<String>)]) -> usize {
        let mut removed = 0;
        for (domain, id) in entities {
            removed += self.invalidate_entity_cache(*domain, id.as_deref()).await;
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::shared_cache;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn seeded() -> (SharedCache, InvalidationRouter) {
        let cache = shared_cache();
        {
            let mut store = cache.write().await;
            for key in [
                "mobile:news:1:10:all",
                "mobile:news:detail:9",
                "news:9:comments",
                "mobile:polls:active",
                "polls:5:results",
                "polls:6:results",
                "mobile:config:app",
                "mobile:cards:all",
            ] {
                store.set(key, json!(key), 300).unwrap();
            }
        }
        let router = InvalidationRouter::new(cache.clone());
        (cache, router)
    }

    #[tokio::test]
    async fn test_polls_invalidation_leaves_news() {
        let (cache, router) = seeded().await;

        let removed = router.invalidate_entity_cache(Domain::Polls, Some("5")).await;

        assert_eq!(removed, 3);
        let mut store = cache.write().await;
        assert!(!store.has("polls:5:results"));
        assert!(!store.has("mobile:polls:active"));
        assert!(store.has("mobile:news:1:10:all"));
        assert!(store.has("mobile:config:app"));
    }

    #[tokio::test]
    async fn test_radio_drops_app_config_and_runs_callbacks() {
        let (cache, router) = seeded().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        router.register_callback(Domain::Radio, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        router.invalidate_entity_cache(Domain::Radio, None).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!cache.write().await.has("mobile:config:app"));
    }

    #[tokio::test]
    async fn test_callbacks_only_for_their_domain() {
        let (_cache, router) = seeded().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        router.register_callback(Domain::Radio, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        router.invalidate_entity_cache(Domain::News, None).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(router.callback_count(Domain::Radio), 1);
        assert_eq!(router.callback_count(Domain::News), 0);
    }

    #[tokio::test]
    async fn test_multiple_entities_order_independent() {
        let (cache_a, router_a) = seeded().await;
        let (cache_b, router_b) = seeded().await;

        let forward = vec![(Domain::News, Some("9".to_string())), (Domain::Media, None)];
        let backward: Vec<_> = forward.iter().cloned().rev().collect();

        let removed_a = router_a.invalidate_multiple_entities(&forward).await;
        let removed_b = router_b.invalidate_multiple_entities(&backward).await;

        assert_eq!(removed_a, removed_b);
        assert_eq!(cache_a.read().await.stats().keys, cache_b.read().await.stats().keys);
    }

    #[test]
    fn test_wildcard_id_is_not_expanded() {
        let patterns = InvalidationRouter::patterns_for(Domain::Polls, Some("*"));
        assert_eq!(patterns, vec!["mobile:polls:*".to_string(), "polls:*".to_string()]);
    }
}
