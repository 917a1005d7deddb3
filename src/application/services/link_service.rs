//! Link creation and read-through resolution service.

use std::sync::Arc;

use crate::application::services::CodeAllocator;
use crate::domain::entities::Link;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheLookup, CacheService};
use crate::utils::code_generator::is_valid_code;
use serde_json::json;

/// Service for creating, resolving and listing short links.
///
/// Redirect lookups go through the cache first; on a miss the link is read
/// from the store and inserted into the cache. Codes the store does not know
/// are never cached.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    allocator: CodeAllocator,
    base_url: String,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            allocator: CodeAllocator::new(repository.clone()),
            repository,
            cache,
            base_url: base_url.into(),
        }
    }

    /// Shortens `url` under the next sequential code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `url` is blank; nothing is
    /// allocated in that case.
    ///
    /// Returns [`AppError::AllocationFailure`] if the store fails during allocation.
    pub async fn create_short_link(&self, url: String) -> Result<Link, AppError> {
        if url.trim().is_empty() {
            return Err(AppError::bad_request(
                "URL is required",
                json!({ "field": "url" }),
            ));
        }

        self.allocator.allocate(url).await
    }

    /// Resolves a short code to its link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code was never allocated.
    /// Returns [`AppError::Store`] if the store lookup fails.
    pub async fn resolve(&self, code: &str) -> Result<Arc<Link>, AppError> {
        if !is_valid_code(code) {
            return Err(not_found(code));
        }

        if let CacheLookup::Hit(link) = self.cache.lookup(code) {
            metrics::counter!("redirect_cache_hits_total").increment(1);
            return Ok(link);
        }
        metrics::counter!("redirect_cache_misses_total").increment(1);

        let link = self
            .repository
            .find_by_id(code)
            .await?
            .ok_or_else(|| not_found(code))?;

        Ok(self.cache.insert(code, link))
    }

    /// Lists every link, oldest first, with current click counts.
    ///
    /// Always reads the store; cached snapshots are not used here.
    pub async fn list_links(&self) -> Result<Vec<Link>, AppError> {
        self.repository.list_all().await
    }

    /// Counts all links.
    pub async fn count_links(&self) -> Result<i64, AppError> {
        self.repository.count().await
    }

    /// Constructs the full short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }

    /// Describes the cache backing redirects.
    pub fn cache_status(&self) -> String {
        self.cache.describe()
    }
}

fn not_found(code: &str) -> AppError {
    AppError::not_found(
        "Short link not found",
        json!({ "code": code, "action": "register" }),
    )
}
