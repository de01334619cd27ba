//! Mentor directory mapping platform mentor ids to display names.
//!
//! Articles on the feed carry an opaque numeric `mentor_id`; the directory
//! resolves those ids to human-readable names using a reference dataset
//! loaded once at startup. The dataset is a JSON file of the shape:
//!
//! ```json
//! { "mentors": [ { "id": 1, "nama": "Alice" }, ... ] }
//! ```
//!
//! A missing or unreadable dataset degrades gracefully: the directory loads
//! empty, a warning is logged, and every lookup resolves to [`UNKNOWN_MENTOR`].
//! Missing identity data should never abort an ingestion run.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Sentinel name returned for empty or unmapped mentor identifiers.
pub const UNKNOWN_MENTOR: &str = "Unknown";

#[derive(Debug, Deserialize)]
struct MentorFile {
    #[serde(default)]
    mentors: Vec<MentorEntry>,
}

#[derive(Debug, Deserialize)]
struct MentorEntry {
    id: u64,
    nama: String,
}

/// Immutable mentor id → display name lookup table.
///
/// Loaded before the pagination loop starts and never mutated afterward.
/// [`MentorDirectory::resolve`] is a total function: every input maps to a
/// name, with [`UNKNOWN_MENTOR`] as the fallback.
#[derive(Debug, Default)]
pub struct MentorDirectory {
    names: HashMap<u64, String>,
}

impl MentorDirectory {
    /// Load the directory from a JSON reference file.
    ///
    /// An absent or malformed file produces an empty directory and a warning
    /// rather than an error; the run continues with `"Unknown"` authors.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Mentor reference data not found; all authors will resolve to Unknown");
                return Self::default();
            }
        };

        match serde_json::from_str::<MentorFile>(&raw) {
            Ok(file) => {
                let directory = Self::from_entries(
                    file.mentors.into_iter().map(|entry| (entry.id, entry.nama)),
                );
                info!(count = directory.len(), path = %path.display(), "Loaded mentor directory");
                directory
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Mentor reference data is not valid JSON; all authors will resolve to Unknown");
                Self::default()
            }
        }
    }

    /// Build a directory from `(id, name)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (u64, String)>) -> Self {
        Self {
            names: entries.into_iter().collect(),
        }
    }

    /// Resolve a mentor id to a display name.
    ///
    /// `None` (the raw record had no usable `mentor_id`) and unmapped ids
    /// both resolve to [`UNKNOWN_MENTOR`]; mapped ids return the stored name
    /// exactly as loaded.
    pub fn resolve(&self, mentor_id: Option<u64>) -> &str {
        mentor_id
            .and_then(|id| self.names.get(&id))
            .map_or(UNKNOWN_MENTOR, String::as_str)
    }

    /// Number of mentors in the directory.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the directory holds no mentors at all.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
