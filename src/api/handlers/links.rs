//! Handlers for link listing and referrer analytics.

use axum::{
    Json,
    extract::{Query, State},
};

use crate::api::dto::links::{LinkItem, LinksResponse, ReferrersQuery, ReferrersResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Lists every link with its click count, plus the top referrers.
///
/// # Endpoint
///
/// `GET /api/links`
///
/// Links come back in allocation order. Click counts are read from the
/// store, so they may trail the click events by queued increments.
pub async fn links_handler(State(state): State<AppState>) -> Result<Json<LinksResponse>, AppError> {
    let links = state.link_service.list_links().await?;
    let top_referrers = state
        .click_recorder
        .top_referrers(state.top_referrers_limit)
        .await?;

    let links = links
        .into_iter()
        .map(|link| {
            let short_url = state.link_service.short_url(&link.id);
            LinkItem::from_link(link, short_url)
        })
        .collect();

    Ok(Json(LinksResponse {
        links,
        top_referrers,
    }))
}

/// Returns the most frequent referers.
///
/// # Endpoint
///
/// `GET /api/referrers?limit=N`
///
/// `limit` defaults to the configured listing size and is clamped to 1..=100.
/// Equal counts are ordered by referer, ascending.
pub async fn referrers_handler(
    State(state): State<AppState>,
    Query(query): Query<ReferrersQuery>,
) -> Result<Json<ReferrersResponse>, AppError> {
    let limit = query.effective_limit(state.top_referrers_limit);
    let referrers = state.click_recorder.top_referrers(limit).await?;

    Ok(Json(ReferrersResponse { referrers }))
}
