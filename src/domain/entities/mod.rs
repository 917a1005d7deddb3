//! Core domain entities.
//!
//! - [`Link`] - A short code mapped to a target URL plus its click counter
//! - [`ClickEvent`] - One recorded redirect
//!
//! Creation inputs live in separate structs (`NewLink`, `NewClickEvent`)
//! because identity and timestamps are assigned elsewhere.

pub mod click_event;
pub mod link;

pub use click_event::{ClickEvent, NewClickEvent};
pub use link::{Link, NewLink};
