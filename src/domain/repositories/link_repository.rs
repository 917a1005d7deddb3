//! Repository traits for link storage and code allocation.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// An exclusive allocation scope opened by [`LinkRepository::begin_allocation`].
///
/// While a scope is open no other scope, in this process or any other process
/// sharing the store, can read the newest link or insert a new one. The scope
/// ends on [`AllocationTx::commit`]; dropping it uncommitted discards the
/// staged insert and releases the lock.
#[async_trait]
pub trait AllocationTx: Send {
    /// Reads the most recently allocated link under the exclusive lock.
    ///
    /// Returns `Ok(None)` when no link exists yet.
    async fn locked_max_link(&mut self) -> Result<Option<Link>, AppError>;

    /// Inserts the new link inside the scope.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the insert fails (including a duplicate id).
    async fn insert_link(&mut self, new_link: NewLink) -> Result<Link, AppError>;

    /// Makes the insert durable and releases the lock.
    async fn commit(&mut self) -> Result<(), AppError>;
}

/// Repository interface for links.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - In-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Opens an exclusive allocation scope.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] if the scope cannot be opened.
    async fn begin_allocation(&self) -> Result<Box<dyn AllocationTx>, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Store`] on database errors.
    async fn find_by_id(&self, id: &str) -> Result<Option<Link>, AppError>;

    /// Lists every link in allocation order.
    async fn list_all(&self) -> Result<Vec<Link>, AppError>;

    /// Counts all links.
    async fn count(&self) -> Result<i64, AppError>;
}
