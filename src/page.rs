//! Page payload normalization for the feed API.
//!
//! The platform does not guarantee a single response shape. A page may arrive
//! as a mapping with a nested records field, as a bare array of records, or as
//! an empty/null payload on the final page. [`PagePayload`] turns that
//! duck-typed boundary into an explicit variant so the pagination loop can
//! branch on one tagged decision instead of nested ad hoc type checks.
//!
//! # End of Feed
//!
//! Feeds legitimately signal completion with an empty final page rather than
//! an error status, so "no data" is a normal terminal signal here, never a
//! failure. End of feed is reported when the payload is null/empty, when the
//! mapping's records field is empty or absent, or when the resolved record
//! sequence has zero length.

use serde_json::Value;

/// Name of the nested records field in mapping-shaped page responses.
pub const RECORDS_FIELD: &str = "data";

/// A feed page response reduced to one of the three accepted shapes.
#[derive(Debug)]
pub enum PagePayload {
    /// A mapping with a non-empty `data` array of records.
    Wrapped(Vec<Value>),
    /// A bare non-empty array of records.
    Bare(Vec<Value>),
    /// Null, an empty array, or a mapping whose records field is
    /// empty or absent. The normal end-of-feed signal.
    Empty,
}

impl PagePayload {
    /// Classify a decoded page response into one of the accepted shapes.
    pub fn classify(raw: Value) -> Self {
        match raw {
            Value::Array(records) if !records.is_empty() => Self::Bare(records),
            Value::Object(mut map) => match map.remove(RECORDS_FIELD) {
                Some(Value::Array(records)) if !records.is_empty() => Self::Wrapped(records),
                _ => Self::Empty,
            },
            _ => Self::Empty,
        }
    }

    /// Whether this payload signals the end of the feed.
    pub fn is_end_of_feed(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The ordered raw records carried by this page.
    pub fn into_records(self) -> Vec<Value> {
        match self {
            Self::Wrapped(records) | Self::Bare(records) => records,
            Self::Empty => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_wrapped_mapping() {
        let payload = PagePayload::classify(json!({"data": [{"id": 1}, {"id": 2}]}));
        assert!(matches!(payload, PagePayload::Wrapped(_)));
        assert!(!payload.is_end_of_feed());
        assert_eq!(payload.into_records().len(), 2);
    }

    #[test]
    fn test_classify_bare_array() {
        let payload = PagePayload::classify(json!([{"id": 1}]));
        assert!(matches!(payload, PagePayload::Bare(_)));
        assert_eq!(payload.into_records().len(), 1);
    }

    #[test]
    fn test_classify_null_is_end_of_feed() {
        assert!(PagePayload::classify(Value::Null).is_end_of_feed());
    }

    #[test]
    fn test_classify_empty_array_is_end_of_feed() {
        assert!(PagePayload::classify(json!([])).is_end_of_feed());
    }

    #[test]
    fn test_classify_empty_records_field_is_end_of_feed() {
        assert!(PagePayload::classify(json!({"data": []})).is_end_of_feed());
    }

    #[test]
    fn test_classify_absent_records_field_is_end_of_feed() {
        assert!(PagePayload::classify(json!({"message": "ok"})).is_end_of_feed());
    }

    #[test]
    fn test_classify_null_records_field_is_end_of_feed() {
        assert!(PagePayload::classify(json!({"data": null})).is_end_of_feed());
    }

    #[test]
    fn test_into_records_preserves_order() {
        let payload = PagePayload::classify(json!({"data": [{"id": 30}, {"id": 20}, {"id": 10}]}));
        let ids: Vec<u64> = payload
            .into_records()
            .iter()
            .map(|r| r["id"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![30, 20, 10]);
    }
}
