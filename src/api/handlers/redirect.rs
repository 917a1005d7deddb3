//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use tracing::{debug, error};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its target URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Resolve the code through the redirect cache, falling back to the store
/// 2. Build the `Location` header from the stored URL
/// 3. Persist a click event carrying the `Referer` header (empty if absent)
/// 4. Queue the counter increment without waiting for it
/// 5. Return 303 See Other
///
/// Click recording failures are logged and never affect the redirect.
///
/// # Errors
///
/// Returns 404 Not Found with `details.action = "register"` if the code was
/// never allocated. Nothing is recorded or cached in that case.
///
/// Returns 500 Internal Server Error if the stored URL cannot be sent as a
/// header value. No click is recorded for a redirect that never goes out.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let link = state.link_service.resolve(&code).await?;

    let location = HeaderValue::try_from(link.url.as_str()).map_err(|e| {
        error!(code = %link.id, error = %e, "Stored URL is not a valid Location header");
        AppError::internal(
            "Stored URL cannot be used as a redirect target",
            json!({ "code": link.id }),
        )
    })?;

    let referer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    state.click_recorder.record_click(&link.id, referer).await;
    debug!(code = %link.id, "Redirecting");

    Ok((StatusCode::SEE_OTHER, [(header::LOCATION, location)]))
}
