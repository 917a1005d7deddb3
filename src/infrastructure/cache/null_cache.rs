//! No-op cache implementation for disabled caching.

use std::sync::Arc;

use super::service::{CacheLookup, CacheService};
use crate::domain::entities::Link;
use tracing::debug;

/// A cache implementation that stores nothing.
///
/// Selected with `CACHE_ENABLED=false`; every redirect then reads the store.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheService for NullCache {
    fn lookup(&self, _code: &str) -> CacheLookup {
        CacheLookup::Miss
    }

    fn insert(&self, _code: &str, link: Link) -> Arc<Link> {
        Arc::new(link)
    }

    fn len(&self) -> usize {
        0
    }

    fn describe(&self) -> String {
        "Disabled".to_string()
    }
}
