//! Store implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - PostgreSQL link storage and serialized code allocation
//! - [`PgClickRepository`] - PostgreSQL click events and referrer aggregates
//! - [`MemoryStore`] - In-process store implementing both traits

pub mod memory_store;
pub mod pg_click_repository;
pub mod pg_link_repository;

pub use memory_store::MemoryStore;
pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
