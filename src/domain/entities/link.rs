//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A shortened URL.
///
/// `id` is the short code itself. After creation only `click_count` and
/// `updated_at` ever change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub id: String,
    pub url: String,
    pub click_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: String,
        url: String,
        click_count: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            url,
            click_count,
            created_at,
            updated_at,
        }
    }
}

/// Input data for persisting a freshly allocated link.
///
/// The click counter always starts at zero and timestamps are set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub id: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_creation() {
        let now = Utc::now();
        let link = Link::new(
            "0000".to_string(),
            "https://example.com".to_string(),
            0,
            now,
            now,
        );

        assert_eq!(link.id, "0000");
        assert_eq!(link.url, "https://example.com");
        assert_eq!(link.click_count, 0);
        assert_eq!(link.created_at, now);
    }

    #[test]
    fn test_link_serializes_all_fields() {
        let now = Utc::now();
        let link = Link::new("000a".to_string(), "https://a.io".to_string(), 7, now, now);

        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["id"], "000a");
        assert_eq!(value["click_count"], 7);
        assert!(value.get("created_at").is_some());
    }
}
