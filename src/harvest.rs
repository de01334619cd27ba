//! The pagination loop: cursor advancement, record accumulation, and
//! stop-condition handling.
//!
//! This is the core of the API path. The loop repeatedly asks the transport
//! client for the next page, normalizes the payload, extracts canonical
//! records, and advances the cursor from the last raw record on the page.
//! The open-ended iteration is expressed as an explicit three-state machine
//! ([`RunState`]) so every transition has a single, testable trigger:
//!
//! ```text
//! RUNNING ──fetch failure──────────────▶ HARD_ABORT
//! RUNNING ──end of feed────────────────▶ SOFT_STOP
//! RUNNING ──cursor failed to advance──▶ SOFT_STOP
//! RUNNING ──records extracted─────────▶ RUNNING
//! ```
//!
//! Both terminal states are successful exits from the sink's perspective:
//! whatever was accumulated is returned to the caller for flushing, and only
//! the logged reason distinguishes "feed exhausted" from "aborted early".
//!
//! # Cursor Stalls
//!
//! If the last record of a page carries no usable identifier, the cursor
//! cannot advance and the next fetch would repeat the same page forever. The
//! same holds when the platform hands back a page ending on the id we already
//! cursored past. Rather than loop, a non-empty page that leaves the cursor
//! unchanged stops the run with [`StopReason::CursorStalled`] after a
//! warning, keeping everything accumulated so far.

use crate::api::{FetchError, FetchPage};
use crate::extract::{extract_article, record_id};
use crate::mentors::MentorDirectory;
use crate::models::{Article, Cursor};
use crate::page::PagePayload;
use std::fmt;
use tracing::{debug, error, info, instrument, warn};

/// Pagination loop state. `Running` is initial; the other two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// The loop is still fetching pages.
    Running,
    /// Expected completion: the feed reported no more data, or the cursor
    /// stalled and continuing would refetch the same page.
    SoftStop,
    /// Unrecoverable failure: a fetch was classified as failed and the
    /// no-retry policy ended the run.
    HardAbort,
}

/// Why the pagination loop stopped.
#[derive(Debug)]
pub enum StopReason {
    /// The feed returned an empty page: all articles have been harvested.
    FeedExhausted,
    /// A non-empty page left the cursor unchanged; continuing would loop.
    CursorStalled,
    /// A page fetch failed and the run was aborted.
    Fetch(FetchError),
}

impl StopReason {
    /// The terminal state this reason corresponds to.
    pub fn state(&self) -> RunState {
        match self {
            Self::FeedExhausted | Self::CursorStalled => RunState::SoftStop,
            Self::Fetch(_) => RunState::HardAbort,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FeedExhausted => write!(f, "feed exhausted"),
            Self::CursorStalled => write!(f, "cursor stalled"),
            Self::Fetch(e) => write!(f, "fetch failed: {e}"),
        }
    }
}

/// The result of one pagination run: every canonical record accumulated
/// before the terminal state, in fetch order, plus the stop reason.
#[derive(Debug)]
pub struct Harvest {
    /// Accumulated canonical records, sequence ids `1..=N` in emission order.
    pub articles: Vec<Article>,
    /// Why the loop terminated.
    pub stop: StopReason,
}

impl Harvest {
    /// The terminal state the run ended in.
    pub fn state(&self) -> RunState {
        self.stop.state()
    }
}

/// Drive the pagination loop to a terminal state.
///
/// Owns the cursor and the accumulator for the duration of the run; exactly
/// one fetch is in flight at a time. The returned [`Harvest`] carries the
/// accumulated records regardless of how the run ended, so the caller can
/// flush them exactly once.
#[instrument(level = "info", skip_all)]
pub async fn run<F: FetchPage>(fetcher: &F, mentors: &MentorDirectory) -> Harvest {
    let mut cursor = Cursor::default();
    let mut articles: Vec<Article> = Vec::new();
    let mut pages = 0u64;
    let mut state = RunState::Running;
    let mut stop = StopReason::FeedExhausted;

    while state == RunState::Running {
        debug!(
            since_id = cursor.since_id,
            next_id = cursor.next_id,
            "Requesting next page"
        );

        let raw = match fetcher.fetch_page(&cursor).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(kind = e.kind(), error = %e, pages, total = articles.len(), "Page fetch failed; aborting run");
                state = RunState::HardAbort;
                stop = StopReason::Fetch(e);
                continue;
            }
        };

        let payload = PagePayload::classify(raw);
        if payload.is_end_of_feed() {
            info!(pages, total = articles.len(), "No more articles in feed");
            state = RunState::SoftStop;
            stop = StopReason::FeedExhausted;
            continue;
        }

        let records = payload.into_records();
        pages += 1;
        let batch_start = articles.len();
        for record in &records {
            let sequence_id = articles.len() as u64 + 1;
            match extract_article(record, sequence_id, mentors) {
                Some(article) => articles.push(article),
                None => warn!(page = pages, "Skipping non-record entry in page"),
            }
        }
        debug!(
            page = pages,
            batch = articles.len() - batch_start,
            total = articles.len(),
            "Extracted page records"
        );

        // Advance the cursor from the last raw record's own identifier.
        // next_id stays constant for this platform.
        match records.last().and_then(record_id) {
            Some(last_id) if last_id != cursor.since_id => {
                cursor.since_id = last_id;
            }
            Some(_) => {
                warn!(
                    since_id = cursor.since_id,
                    "Page ended on the current cursor position; stopping to avoid refetching"
                );
                state = RunState::SoftStop;
                stop = StopReason::CursorStalled;
            }
            None => {
                warn!(
                    since_id = cursor.since_id,
                    "Last record in page has no usable id; stopping to avoid refetching"
                );
                state = RunState::SoftStop;
                stop = StopReason::CursorStalled;
            }
        }
    }

    Harvest { articles, stop }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted transport double: pops one pre-programmed response per fetch
    /// and records the cursor each call was made with.
    struct ScriptedFetcher {
        responses: Mutex<VecDeque<Result<Value, FetchError>>>,
        cursors: Mutex<Vec<Cursor>>,
    }

    impl ScriptedFetcher {
        fn new(responses: Vec<Result<Value, FetchError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                cursors: Mutex::new(Vec::new()),
            }
        }

        fn seen_cursors(&self) -> Vec<Cursor> {
            self.cursors.lock().unwrap().clone()
        }
    }

    impl FetchPage for ScriptedFetcher {
        async fn fetch_page(&self, cursor: &Cursor) -> Result<Value, FetchError> {
            self.cursors.lock().unwrap().push(*cursor);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(json!([])))
        }
    }

    fn mentors() -> MentorDirectory {
        MentorDirectory::from_entries([(1, "Alice".to_string())])
    }

    fn page_of(ids: std::ops::Range<u64>) -> Value {
        let records: Vec<Value> = ids
            .map(|id| json!({"id": id, "title": format!("t{id}"), "content": "c", "mentor_id": 1}))
            .collect();
        json!({ "data": records })
    }

    #[tokio::test]
    async fn test_reference_two_page_scenario() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(json!({"data": [{"id": 10, "title": "A", "content": "x\ny", "mentor_id": 1}]})),
            Ok(json!([])),
        ]);

        let harvest = run(&fetcher, &mentors()).await;

        assert_eq!(harvest.state(), RunState::SoftStop);
        assert!(matches!(harvest.stop, StopReason::FeedExhausted));
        assert_eq!(
            harvest.articles,
            vec![Article {
                id: 1,
                title: "A".to_string(),
                content: "x y".to_string(),
                mentor_name: "Alice".to_string(),
            }]
        );

        // Second fetch resumed from the last record's platform id.
        let cursors = fetcher.seen_cursors();
        assert_eq!(cursors.len(), 2);
        assert_eq!(cursors[0], Cursor::default());
        assert_eq!(cursors[1].since_id, 10);
        assert_eq!(cursors[1].next_id, 0);
    }

    #[tokio::test]
    async fn test_empty_first_page_soft_stops() {
        let fetcher = ScriptedFetcher::new(vec![Ok(json!({"data": []}))]);
        let harvest = run(&fetcher, &mentors()).await;

        assert_eq!(harvest.state(), RunState::SoftStop);
        assert!(harvest.articles.is_empty());
    }

    #[tokio::test]
    async fn test_abort_still_returns_accumulated_records() {
        // Two good pages of 5 records, then a timeout on the third call.
        let fetcher = ScriptedFetcher::new(vec![
            Ok(page_of(101..106)),
            Ok(page_of(201..206)),
            Err(FetchError::Timeout),
        ]);

        let harvest = run(&fetcher, &mentors()).await;

        assert_eq!(harvest.state(), RunState::HardAbort);
        assert!(matches!(harvest.stop, StopReason::Fetch(FetchError::Timeout)));
        assert_eq!(harvest.articles.len(), 10);
    }

    #[tokio::test]
    async fn test_sequence_ids_are_contiguous_despite_platform_ids() {
        // Platform ids are disordered and gapped; sequence ids must be 1..=N.
        let fetcher = ScriptedFetcher::new(vec![
            Ok(json!({"data": [{"id": 900}, {"id": 3}, {"id": 477}]})),
            Ok(json!({"data": [{"id": 12}]})),
            Ok(json!([])),
        ]);

        let harvest = run(&fetcher, &mentors()).await;

        let ids: Vec<u64> = harvest.articles.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_non_record_entries_are_skipped_without_consuming_ids() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(json!([{"id": 5, "title": "a"}, "junk", {"id": 4, "title": "b"}])),
            Ok(json!([])),
        ]);

        let harvest = run(&fetcher, &mentors()).await;

        assert_eq!(harvest.articles.len(), 2);
        assert_eq!(harvest.articles[0].id, 1);
        assert_eq!(harvest.articles[1].id, 2);
        assert_eq!(harvest.articles[1].title, "b");
    }

    #[tokio::test]
    async fn test_cursor_stall_on_missing_last_id() {
        // The page's last record has no id: the cursor cannot advance, so the
        // run must stop instead of refetching the same page forever.
        let fetcher = ScriptedFetcher::new(vec![Ok(json!([{"id": 8, "title": "a"}, {"title": "no id"}]))]);

        let harvest = run(&fetcher, &mentors()).await;

        assert_eq!(harvest.state(), RunState::SoftStop);
        assert!(matches!(harvest.stop, StopReason::CursorStalled));
        assert_eq!(harvest.articles.len(), 2);
        assert_eq!(fetcher.seen_cursors().len(), 1);
    }

    #[tokio::test]
    async fn test_cursor_stall_on_repeated_page() {
        // First page cursors to 8; the platform then hands back a page ending
        // on 8 again.
        let fetcher = ScriptedFetcher::new(vec![
            Ok(json!([{"id": 8, "title": "a"}])),
            Ok(json!([{"id": 8, "title": "a"}])),
        ]);

        let harvest = run(&fetcher, &mentors()).await;

        assert!(matches!(harvest.stop, StopReason::CursorStalled));
        assert_eq!(fetcher.seen_cursors().len(), 2);
    }

    #[tokio::test]
    async fn test_status_failure_hard_aborts() {
        let fetcher = ScriptedFetcher::new(vec![
            Ok(page_of(1..3)),
            Err(FetchError::Status(reqwest::StatusCode::FORBIDDEN)),
        ]);

        let harvest = run(&fetcher, &mentors()).await;

        assert_eq!(harvest.state(), RunState::HardAbort);
        assert_eq!(harvest.articles.len(), 2);
    }

    #[tokio::test]
    async fn test_decode_failure_hard_aborts() {
        let decode = serde_json::from_str::<Value>("{").unwrap_err();
        let fetcher = ScriptedFetcher::new(vec![Err(FetchError::Decode(decode))]);

        let harvest = run(&fetcher, &mentors()).await;

        assert_eq!(harvest.state(), RunState::HardAbort);
        assert!(harvest.articles.is_empty());
    }
}
