//! Redirect cache trait and lookup result.

use std::sync::Arc;

use crate::domain::entities::Link;

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(Arc<Link>),
    Miss,
}

/// Read-through cache of short code to link snapshot.
///
/// The cache never talks to the store itself. On a miss the caller loads the
/// link and hands it to [`CacheService::insert`]. Only links that exist are
/// ever inserted, so a code allocated after a failed lookup becomes visible
/// without invalidation.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::MemoryCache`] - Concurrent in-process map
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
pub trait CacheService: Send + Sync {
    /// Looks up a snapshot for `code`.
    fn lookup(&self, code: &str) -> CacheLookup;

    /// Stores `link` under `code` unless an entry is already present.
    ///
    /// Returns the snapshot held by the cache after the call, which is the
    /// earlier entry when two callers race on the same code.
    fn insert(&self, code: &str, link: Link) -> Arc<Link>;

    /// Number of cached entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short description used by the health endpoint.
    fn describe(&self) -> String;
}
