//! DTOs for link creation and listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::entities::Link;
use crate::domain::repositories::ReferrerCount;

/// Upper bound for `?limit=` on the referrer endpoint.
pub const MAX_REFERRERS_LIMIT: i64 = 100;

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("required");
        error.message = Some("URL is required".into());
        return Err(error);
    }
    Ok(())
}

/// Request to shorten a URL.
///
/// The URL is stored verbatim; only emptiness is checked.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub url: String,
}

/// Newly created short link.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub id: String,
    pub url: String,
    pub short_url: String,
}

/// One row of the link listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkItem {
    pub id: String,
    pub url: String,
    pub short_url: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
}

impl LinkItem {
    pub fn from_link(link: Link, short_url: String) -> Self {
        Self {
            id: link.id,
            url: link.url,
            short_url,
            click_count: link.click_count,
            created_at: link.created_at,
        }
    }
}

/// Every link plus the most frequent referrers.
#[derive(Debug, Serialize)]
pub struct LinksResponse {
    pub links: Vec<LinkItem>,
    pub top_referrers: Vec<ReferrerCount>,
}

/// Query parameters for `GET /api/referrers`.
#[derive(Debug, Deserialize)]
pub struct ReferrersQuery {
    pub limit: Option<i64>,
}

impl ReferrersQuery {
    /// Requested limit clamped to `1..=MAX_REFERRERS_LIMIT`.
    pub fn effective_limit(&self, default: i64) -> i64 {
        self.limit.unwrap_or(default).clamp(1, MAX_REFERRERS_LIMIT)
    }
}

/// Referrer aggregate response.
#[derive(Debug, Serialize)]
pub struct ReferrersResponse {
    pub referrers: Vec<ReferrerCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_request_rejects_blank_url() {
        let request = ShortenRequest {
            url: "  ".to_string(),
        };
        assert!(request.validate().is_err());

        let request = ShortenRequest {
            url: "not even a url".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_missing_url_deserializes_to_empty() {
        let request: ShortenRequest = serde_json::from_str("{}").unwrap();
        assert!(request.url.is_empty());
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_referrers_limit_is_clamped() {
        let query = ReferrersQuery { limit: None };
        assert_eq!(query.effective_limit(3), 3);

        let query = ReferrersQuery { limit: Some(0) };
        assert_eq!(query.effective_limit(3), 1);

        let query = ReferrersQuery { limit: Some(5000) };
        assert_eq!(query.effective_limit(3), MAX_REFERRERS_LIMIT);
    }
}
