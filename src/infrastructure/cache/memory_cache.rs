//! In-process redirect cache backed by a sharded concurrent map.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::service::{CacheLookup, CacheService};
use crate::domain::entities::Link;

/// Unbounded concurrent map from short code to link snapshot.
///
/// Reads take a shard read lock only. Inserts lock the single shard owning
/// the key, so populating unrelated codes never serializes on a common lock.
/// Entries are never evicted or refreshed.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Arc<Link>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheService for MemoryCache {
    fn lookup(&self, code: &str) -> CacheLookup {
        match self.entries.get(code) {
            Some(entry) => {
                debug!("Cache HIT: {}", code);
                CacheLookup::Hit(entry.value().clone())
            }
            None => {
                debug!("Cache MISS: {}", code);
                CacheLookup::Miss
            }
        }
    }

    fn insert(&self, code: &str, link: Link) -> Arc<Link> {
        self.entries
            .entry(code.to_string())
            .or_insert_with(|| Arc::new(link))
            .value()
            .clone()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn describe(&self) -> String {
        format!("In-memory, {} entries", self.len())
    }
}
