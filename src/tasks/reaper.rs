//! Background Reaper
//!
//! Periodically removes expired cache entries and elapsed rate-limit records,
//! so memory stays bounded even for keys nobody reads again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{current_timestamp_ms, SharedCache};
use crate::ratelimit::RateLimiter;

/// Handle to the running reaper task.
#[derive(Debug)]
pub struct Reaper {
    handle: JoinHandle<()>,
    cache: SharedCache,
    limiters: Vec<Arc<RateLimiter>>,
}

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub entries: usize,
    pub records: usize,
}

impl Reaper {
    /// Spawns the sweep loop, running every `interval_secs` (at least 1).
    pub fn spawn(cache: SharedCache, limiters: Vec<Arc<RateLimiter>>, interval_secs: u64) -> Self {
        let interval = Duration::from_secs(interval_secs.max(1));
        let task_cache = cache.clone();
        let task_limiters = limiters.clone();

        let handle = tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "reaper started");

            loop {
                tokio::time::sleep(interval).await;

                let report = sweep(&task_cache, &task_limiters, current_timestamp_ms()).await;
                if report.entries > 0 || report.records > 0 {
                    info!(
                        entries = report.entries,
                        records = report.records,
                        "reaper removed expired state"
                    );
                } else {
                    debug!("reaper found nothing to remove");
                }
            }
        });

        Self {
            handle,
            cache,
            limiters,
        }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stops the timer and clears the cache and limiter tables.
    pub async fn stop(self) {
        self.handle.abort();
        let _ = self.handle.await;

        self.cache.write().await.clear();
        for limiter in &self.limiters {
            limiter.clear();
        }
        info!("reaper stopped, cache cleared");
    }
}

/// One sweep at `now`.
///
/// Expired keys are snapshotted under the read lock, then each is removed
/// under its own short write lock after re-checking expiry, so readers are
/// never blocked for the whole scan.
pub async fn sweep(cache: &SharedCache, limiters: &[Arc<RateLimiter>], now: u64) -> SweepReport {
    let expired = cache.read().await.expired_keys_at(now);

    let mut entries = 0;
    for key in expired {
        if cache.write().await.remove_if_expired_at(&key, now) {
            entries += 1;
        }
    }

    let records = limiters
        .iter()
        .map(|limiter| limiter.prune_expired_at(now))
        .sum();

    SweepReport { entries, records }
}
