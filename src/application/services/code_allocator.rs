//! Sequential short code allocation.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::{SEED_CODE, successor};

/// The only writer of new links.
///
/// Allocation runs under two locks: an in-process mutex that queues callers
/// of this allocator, and the store's allocation scope that excludes other
/// processes sharing the same store. Together they make allocations totally
/// ordered, so ids come out strictly in successor order without collisions.
pub struct CodeAllocator {
    repository: Arc<dyn LinkRepository>,
    lock: Mutex<()>,
}

impl CodeAllocator {
    /// Creates a new allocator over the given store.
    pub fn new(repository: Arc<dyn LinkRepository>) -> Self {
        Self {
            repository,
            lock: Mutex::new(()),
        }
    }

    /// Allocates the next short code for `url` and persists the new link.
    ///
    /// `url` must be non-empty; callers validate it before getting here.
    /// Waiters queue on the lock without a timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AllocationFailure`] if the locked read, the insert
    /// or the commit fails. The allocation scope is then rolled back, so no
    /// link becomes visible and no code is consumed.
    pub async fn allocate(&self, url: String) -> Result<Link, AppError> {
        let _guard = self.lock.lock().await;

        match self.allocate_locked(url).await {
            Ok(link) => {
                metrics::counter!("links_allocated_total").increment(1);
                info!(id = %link.id, "Allocated short code");
                Ok(link)
            }
            Err(e) => {
                metrics::counter!("link_allocation_failures_total").increment(1);
                error!(error = %e, details = %e.to_error_info().details, "Short code allocation failed");
                Err(e)
            }
        }
    }

    async fn allocate_locked(&self, url: String) -> Result<Link, AppError> {
        let mut scope = self
            .repository
            .begin_allocation()
            .await
            .map_err(|e| allocation_failure("begin", e))?;

        let latest = scope
            .locked_max_link()
            .await
            .map_err(|e| allocation_failure("locked_read", e))?;

        let id = match latest {
            None => SEED_CODE.to_string(),
            Some(latest) => successor(&latest.id).ok_or_else(|| {
                AppError::allocation_failed(
                    "Failed to allocate short code",
                    json!({ "stage": "successor", "latest_id": latest.id }),
                )
            })?,
        };

        let link = scope
            .insert_link(NewLink { id, url })
            .await
            .map_err(|e| allocation_failure("insert", e))?;

        scope
            .commit()
            .await
            .map_err(|e| allocation_failure("commit", e))?;

        Ok(link)
    }
}

fn allocation_failure(stage: &'static str, cause: AppError) -> AppError {
    AppError::allocation_failed(
        "Failed to allocate short code",
        json!({ "stage": stage, "reason": cause.to_string() }),
    )
}
