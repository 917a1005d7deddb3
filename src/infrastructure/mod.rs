//! Infrastructure layer for external integrations.
//!
//! Implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`cache`] - Redirect cache implementations
//! - [`persistence`] - PostgreSQL and in-memory stores

pub mod cache;
pub mod persistence;
