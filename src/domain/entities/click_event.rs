//! Click event entity representing a single redirect traversal.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One persisted redirect.
///
/// `link_id` refers back to the owning [`super::Link`]; events are removed
/// only when their link is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClickEvent {
    pub id: i64,
    pub link_id: String,
    pub referer: String,
    pub timestamp: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates a new ClickEvent instance.
    pub fn new(id: i64, link_id: String, referer: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            link_id,
            referer,
            timestamp,
        }
    }
}

/// Input data for recording a click.
///
/// An absent `Referer` header is stored as an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClickEvent {
    pub link_id: String,
    pub referer: String,
}
