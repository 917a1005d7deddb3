//! API route configuration.

use crate::api::handlers::{links_handler, referrers_handler, shorten_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Routes mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /links`      - Shorten a URL
/// - `GET  /links`      - List links with click counts and top referrers
/// - `GET  /referrers`  - Top referrers (`?limit=N`)
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(links_handler).post(shorten_handler))
        .route("/referrers", get(referrers_handler))
}
