//! Domain layer containing business entities and logic.
//!
//! Defines entities, the store contract as repository traits, and the
//! background processing of click counters, independent of infrastructure.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`counter_increment`] - Deferred click counter message
//! - [`click_worker`] - Counter increment worker and reconciler
//!
//! # Click Processing Flow
//!
//! 1. HTTP handler resolves the short code
//! 2. [`crate::application::services::ClickRecorder`] persists the click event
//! 3. A [`counter_increment::CounterIncrement`] is queued without waiting
//! 4. [`click_worker::run_click_worker`] applies it with retries
//! 5. [`click_worker::run_reconciler`] re-queues anything left uncounted

pub mod click_worker;
pub mod counter_increment;
pub mod entities;
pub mod repositories;
