//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{ClickRecorder, LinkService};

/// Handles to the services behind the HTTP layer.
///
/// Cloned per request; everything inside is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub click_recorder: Arc<ClickRecorder>,
    /// Number of referrers included in the link listing.
    pub top_referrers_limit: i64,
}

impl AppState {
    pub fn new(
        link_service: Arc<LinkService>,
        click_recorder: Arc<ClickRecorder>,
        top_referrers_limit: i64,
    ) -> Self {
        Self {
            link_service,
            click_recorder,
            top_referrers_limit,
        }
    }
}
