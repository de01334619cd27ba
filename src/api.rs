//! Feed API transport client.
//!
//! This module owns the one logical network operation the pagination loop
//! needs: "fetch the next page for this cursor". The trait-based design keeps
//! the loop testable:
//!
//! - [`FetchPage`]: the seam between the pagination controller and the network
//! - [`ApiClient`]: the reqwest-backed implementation carrying the bearer token
//!
//! # Failure Classification
//!
//! Every way a fetch can go wrong maps to one [`FetchError`] variant so the
//! controller can log the cause precisely. All of them are treated as
//! run-ending; there is deliberately no retry here (the accumulated records
//! are still flushed on abort).

use crate::models::Cursor;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Bounded wait applied to every page request.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// A classified page-fetch failure.
///
/// Timeout and connection failures are transient-transport errors; status and
/// decode failures are protocol-level. All of them end the run under the
/// no-retry policy.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No response within [`FETCH_TIMEOUT`].
    #[error("request timed out after {}s", FETCH_TIMEOUT.as_secs())]
    Timeout,
    /// Could not establish a connection to the platform.
    #[error("connection failed: {0}")]
    Connect(#[source] reqwest::Error),
    /// The platform answered with a non-2xx status.
    #[error("request failed with status {0}")]
    Status(reqwest::StatusCode),
    /// The response body was not decodable as JSON.
    #[error("failed to parse response payload: {0}")]
    Decode(#[from] serde_json::Error),
    /// Any other transport-level failure surfaced by the HTTP client.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

impl FetchError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e)
        } else {
            Self::Transport(e)
        }
    }

    /// Short machine-readable label for structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect(_) => "connection",
            Self::Status(_) => "status",
            Self::Decode(_) => "decode",
            Self::Transport(_) => "transport",
        }
    }
}

/// The one logical operation the pagination loop performs against the feed.
///
/// Implemented by [`ApiClient`] for the real platform and by scripted doubles
/// in the controller's tests.
pub trait FetchPage {
    /// Fetch the page addressed by `cursor`, returning the decoded payload.
    async fn fetch_page(&self, cursor: &Cursor) -> Result<Value, FetchError>;
}

/// Serialize a cursor into the platform's expected query parameters.
///
/// The feed contract requires the optional filter fields to be present but
/// blank when unused; blank means "no filter".
pub fn cursor_query(cursor: &Cursor) -> Vec<(&'static str, String)> {
    vec![
        ("sort", "desc".to_string()),
        ("since_id", cursor.since_id.to_string()),
        ("next_id", cursor.next_id.to_string()),
        ("mentor_ids", String::new()),
        ("categories", String::new()),
        ("year", String::new()),
        ("month", String::new()),
    ]
}

/// Authenticated HTTP session for the feed API.
///
/// The bearer token is established before the loop begins (acquiring it is an
/// external concern) and carried on every request. The client is an owned
/// value threaded into the controller rather than process-global state, so
/// tests can substitute doubles and runs stay independent.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    api_url: Url,
    bearer_token: String,
}

impl ApiClient {
    /// Build a client for `api_url` authenticated with `bearer_token`.
    pub fn new(api_url: Url, bearer_token: String) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            api_url,
            bearer_token,
        })
    }
}

impl FetchPage for ApiClient {
    #[instrument(level = "debug", skip_all, fields(since_id = cursor.since_id, next_id = cursor.next_id))]
    async fn fetch_page(&self, cursor: &Cursor) -> Result<Value, FetchError> {
        let response = self
            .http
            .get(self.api_url.clone())
            .bearer_auth(&self.bearer_token)
            .query(&cursor_query(cursor))
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        debug!(status = status.as_u16(), "Feed API responded");
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await.map_err(FetchError::from_reqwest)?;
        Ok(serde_json::from_str(&body)?)
    }
}
