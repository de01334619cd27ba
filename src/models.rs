//! Data models for harvested articles and pagination state.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Cursor`]: pagination position for the feed API
//! - [`Article`]: the canonical output record written to the JSONL artifact
//! - [`Post`]: a `{writer, content}` pair extracted by the browser path
//!
//! The [`Article`] field names match the JSONL wire format consumed downstream,
//! so they are serialized as-is without renaming.

use serde::Serialize;

/// Pagination position within the article feed.
///
/// The feed API is cursor-paginated: passing the previous page's last-seen
/// article identifier as `since_id` yields the subsequent page in descending
/// order. Both tokens start at zero, meaning "start of feed". `next_id` is
/// part of the platform's query contract but stays constant for this feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Identifier of the last article seen on the previous page.
    pub since_id: u64,
    /// Secondary cursor token required by the platform; unused by this feed.
    pub next_id: u64,
}

/// A canonical article record, independent of platform quirks.
///
/// Produced by the record extractor and appended to the run accumulator in
/// strict fetch order. The `id` is a local sequence number starting at 1,
/// contiguous and never reused, regardless of gaps or disorder in the
/// platform's own article identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    /// Local sequence id, assigned in fetch order starting at 1.
    pub id: u64,
    /// Article title; empty string when the platform omits it.
    pub title: String,
    /// Article body with embedded line breaks normalized to single spaces.
    pub content: String,
    /// Display name of the authoring mentor, or `"Unknown"`.
    pub mentor_name: String,
}

/// An article extracted from the rendered page by the browser path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// The writer's display name as rendered on the page.
    pub writer: String,
    /// The full post text after any "Read More" expansion.
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_starts_at_feed_origin() {
        let cursor = Cursor::default();
        assert_eq!(cursor.since_id, 0);
        assert_eq!(cursor.next_id, 0);
    }

    #[test]
    fn test_article_serializes_wire_field_names() {
        let article = Article {
            id: 1,
            title: "A".to_string(),
            content: "x y".to_string(),
            mentor_name: "Alice".to_string(),
        };

        let json = serde_json::to_string(&article).unwrap();
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"title\":\"A\""));
        assert!(json.contains("\"content\":\"x y\""));
        assert!(json.contains("\"mentor_name\":\"Alice\""));
    }
}
