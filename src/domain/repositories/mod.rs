//! Repository trait definitions for the domain layer.
//!
//! Together these traits are the contract the core needs from its store.
//! Implementations live in `crate::infrastructure::persistence`; mock
//! implementations are generated via `mockall` for unit tests.
//!
//! - [`LinkRepository`] / [`AllocationTx`] - Link lookup and serialized code allocation
//! - [`ClickRepository`] - Click events, counter increments and referrer aggregates

pub mod click_repository;
pub mod link_repository;

pub use click_repository::{ClickRepository, PendingClick, ReferrerCount};
pub use link_repository::{AllocationTx, LinkRepository};

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
