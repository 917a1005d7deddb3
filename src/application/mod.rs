//! Application layer services implementing business logic.
//!
//! Services consume repository traits and the cache, and give HTTP handlers
//! a narrow API.
//!
//! # Available Services
//!
//! - [`services::code_allocator::CodeAllocator`] - Serialized sequential code allocation
//! - [`services::link_service::LinkService`] - Link creation, read-through resolution and listing
//! - [`services::click_recorder::ClickRecorder`] - Click recording and referrer analytics

pub mod services;
