//! Per-key in-flight registry
//!
//! Serialises cache-miss computations for the same key. The first request to
//! miss holds the key's guard while it computes; concurrent misses wait on the
//! guard, then re-check the store and find the fresh entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type KeyLock = Arc<AsyncMutex<()>>;

/// Registry of per-key async locks.
#[derive(Debug, Default)]
pub struct InFlight {
    locks: Mutex<HashMap<String, KeyLock>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, KeyLock>> {
        // The map is only touched by short insert/remove sections.
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits until no other computation for `key` is running and claims it.
    pub async fn acquire(&self, key: &str) -> FlightGuard<'_> {
        let lock = self
            .table()
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();

        let guard = lock.lock_owned().await;

        FlightGuard {
            registry: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of keys with a computation running or queued.
    pub fn pending(&self) -> usize {
        self.table().len()
    }
}

/// Held for the duration of one miss computation.
#[derive(Debug)]
pub struct FlightGuard<'a> {
    registry: &'a InFlight,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut table = self.registry.table();
        // Only the table's own handle left means nobody is waiting.
        if table
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            table.remove(&self.key);
        }
    }
}
