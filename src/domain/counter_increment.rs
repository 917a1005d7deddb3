//! Queue message for deferred click counter updates.

use crate::domain::repositories::PendingClick;

/// A request to add one recorded click to its link's counter.
///
/// Sent by [`crate::application::services::ClickRecorder`] after the click
/// event is persisted and consumed by
/// [`crate::domain::click_worker::run_click_worker`]. Keyed by the click id,
/// so delivering the same message twice increments only once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterIncrement {
    pub click_id: i64,
    pub link_id: String,
}

impl CounterIncrement {
    pub fn new(click_id: i64, link_id: impl Into<String>) -> Self {
        Self {
            click_id,
            link_id: link_id.into(),
        }
    }
}

impl From<PendingClick> for CounterIncrement {
    fn from(pending: PendingClick) -> Self {
        Self::new(pending.click_id, pending.link_id)
    }
}
