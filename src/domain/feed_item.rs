use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted item in an owner's ranked feed.
///
/// Rows are written once and never updated; a refresh cycle replaces the
/// whole collection for the owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: i64,
    pub owner: String,
    pub title: String,
    pub favorite_count: u32,
    /// Raw provider timestamp, parsed only when rendered.
    pub source_created_at: String,
    pub url: String,
    pub summary: String,
    pub source_image_url: Option<String>,
    pub hostname: Option<String>,
    pub rank: f64,
    pub inserted_at: DateTime<Utc>,
}

impl FeedItem {
    pub fn display_hostname(&self) -> &str {
        self.hostname.as_deref().unwrap_or(&self.url)
    }
}

/// An item about to be inserted. The store assigns `id` and `inserted_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFeedItem {
    pub owner: String,
    pub title: String,
    pub favorite_count: u32,
    pub source_created_at: String,
    pub url: String,
    pub summary: String,
    pub source_image_url: Option<String>,
    pub hostname: Option<String>,
    pub rank: f64,
}

impl NewFeedItem {
    pub fn new(owner: &str, title: &str, url: &str, source_created_at: &str) -> Self {
        Self {
            owner: owner.to_string(),
            title: title.to_string(),
            favorite_count: 0,
            source_created_at: source_created_at.to_string(),
            url: url.to_string(),
            summary: String::new(),
            source_image_url: None,
            hostname: None,
            rank: 0.0,
        }
    }

    pub fn with_rank(mut self, rank: f64) -> Self {
        self.rank = rank;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_defaults() {
        let item = NewFeedItem::new("42", "Title", "https://example.com/a", "Mon Jan 01 12:00:00 +0000 2024");
        assert_eq!(item.owner, "42");
        assert_eq!(item.favorite_count, 0);
        assert_eq!(item.rank, 0.0);
        assert!(item.hostname.is_none());
        assert!(item.source_image_url.is_none());
    }

    #[test]
    fn test_display_hostname_falls_back_to_url() {
        let item = FeedItem {
            id: 1,
            owner: "42".into(),
            title: "Title".into(),
            favorite_count: 0,
            source_created_at: String::new(),
            url: "https://example.com/a".into(),
            summary: String::new(),
            source_image_url: None,
            hostname: None,
            rank: 0.0,
            inserted_at: Utc::now(),
        };
        assert_eq!(item.display_hostname(), "https://example.com/a");

        let item = FeedItem {
            hostname: Some("example.com".into()),
            ..item
        };
        assert_eq!(item.display_hostname(), "example.com");
    }
}
