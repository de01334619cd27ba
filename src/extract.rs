//! Canonical article extraction from raw feed records.
//!
//! A raw record is whatever the platform sent for one article: dict-like at
//! best, sometimes not even that. [`extract_article`] is the pure transform
//! that turns a raw record plus a resolved mentor identity into an
//! [`Article`] ready for the accumulator. Non-mapping entries yield `None`
//! and are skipped by the caller without aborting the page.

use crate::mentors::MentorDirectory;
use crate::models::Article;
use serde_json::Value;

/// Platform field holding the article's own identifier.
pub const ID_FIELD: &str = "id";
/// Platform field holding the authoring mentor's identifier.
pub const MENTOR_ID_FIELD: &str = "mentor_id";
/// Platform field holding the article title.
pub const TITLE_FIELD: &str = "title";
/// Platform field holding the article body.
pub const CONTENT_FIELD: &str = "content";

/// Replace embedded line breaks with single spaces.
///
/// `\r\n` is collapsed first so a Windows break becomes exactly one space
/// instead of two; remaining lone `\r` and `\n` characters each become one
/// space. No break characters survive, and all other characters keep their
/// order.
pub fn normalize_breaks(content: &str) -> String {
    content
        .replace("\r\n", " ")
        .replace('\r', " ")
        .replace('\n', " ")
}

/// Map a raw feed record to a canonical [`Article`].
///
/// Deterministic and side-effect free: the same record, sequence id, and
/// directory always produce the same article. Absent title or content
/// default to the empty string; the mentor name is resolved through the
/// directory, tolerating a missing `mentor_id`.
///
/// Returns `None` when the record is not mapping-shaped.
pub fn extract_article(
    raw: &Value,
    sequence_id: u64,
    mentors: &MentorDirectory,
) -> Option<Article> {
    let record = raw.as_object()?;

    let title = record
        .get(TITLE_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let content = normalize_breaks(
        record
            .get(CONTENT_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default(),
    );
    let mentor_name = mentors
        .resolve(record.get(MENTOR_ID_FIELD).and_then(Value::as_u64))
        .to_string();

    Some(Article {
        id: sequence_id,
        title,
        content,
        mentor_name,
    })
}

/// The platform identifier of a raw record, when it is mapping-shaped and
/// carries a numeric id. Used for cursor advancement.
pub fn record_id(raw: &Value) -> Option<u64> {
    raw.as_object()?.get(ID_FIELD).and_then(Value::as_u64)
}
