//! Repository trait for click events and referrer analytics.

use crate::domain::entities::{ClickEvent, NewClickEvent};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Number of recorded clicks sharing one referer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferrerCount {
    pub referer: String,
    pub count: i64,
}

/// A recorded click whose counter increment has not been applied yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingClick {
    pub click_id: i64,
    pub link_id: String,
}

/// Repository interface for click tracking.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - In-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Persists one click event.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on database errors, including an unknown link.
    async fn insert_click(&self, new_click: NewClickEvent) -> Result<ClickEvent, AppError>;

    /// Adds the click to its link's `click_count`.
    ///
    /// The increment is evaluated by the store as `click_count + 1` and is
    /// applied at most once per click, so the call is safe to retry.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the counter was incremented by this call
    /// - `Ok(false)` if the click was already counted or no longer exists
    async fn apply_click(&self, click_id: i64) -> Result<bool, AppError>;

    /// Aggregates all clicks by referer, most frequent first.
    ///
    /// Equal counts are ordered by referer, ascending byte order. At most
    /// `limit` entries are returned.
    async fn top_referrers(&self, limit: i64) -> Result<Vec<ReferrerCount>, AppError>;

    /// Lists uncounted clicks recorded before `recorded_before`, oldest first.
    async fn uncounted_clicks(
        &self,
        recorded_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<PendingClick>, AppError>;

    /// Counts recorded clicks for one link.
    async fn count_for_link(&self, link_id: &str) -> Result<i64, AppError>;
}
