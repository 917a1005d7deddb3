//! Handler for link creation.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::links::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link under the next sequential code.
///
/// # Endpoint
///
/// `POST /api/links`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "id": "000a",
///   "url": "https://example.com/some/long/path",
///   "short_url": "http://localhost:3000/000a"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the body is malformed or the URL is blank.
/// Returns 500 Internal Server Error if allocation fails.
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Invalid request body",
            json!({ "reason": rejection.body_text() }),
        )
    })?;
    payload.validate()?;

    let link = state.link_service.create_short_link(payload.url).await?;
    let short_url = state.link_service.short_url(&link.id);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            id: link.id,
            url: link.url,
            short_url,
        }),
    ))
}
