//! Radio configuration cache
//!
//! The radio service memoizes its configuration outside the response cache.
//! It registers [`RadioConfigCache::clear`] with the invalidation router at
//! startup so radio writes drop the memoized copy too.

use std::sync::{PoisonError, RwLock};

use serde_json::Value;
use tracing::debug;

use super::{ContentSource, SourceError};

/// Memoized radio configuration.
#[derive(Debug, Default)]
pub struct RadioConfigCache {
    slot: RwLock<Option<Value>>,
}

impl RadioConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized config, loading it from `source` when empty.
    ///
    /// Failed loads leave the slot empty.
    pub async fn get_or_load(&self, source: &dyn ContentSource) -> Result<Value, SourceError> {
        if let Some(config) = self.cached() {
            return Ok(config);
        }

        let config = source.radio_config().await?;
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(config.clone());
        debug!("radio config loaded");
        Ok(config)
    }

    /// Current memoized value, if any.
    pub fn cached(&self) -> Option<Value> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Drops the memoized value.
    pub fn clear(&self) {
        self.slot.write().unwrap_or_else(PoisonError::into_inner).take();
        debug!("radio config cache cleared");
    }
}
