//! Line-delimited JSON sink for the API path.
//!
//! Each run produces one JSONL artifact: one self-contained serialized
//! [`Article`] per line, in accumulation order, overwriting any prior output
//! at the destination. The caller invokes [`write_articles`] exactly once per
//! run, after the pagination loop reaches a terminal state; soft stops and
//! hard aborts both flush whatever was accumulated.

use crate::models::Article;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Persist accumulated articles as line-delimited JSON.
///
/// Creates the parent directory if needed and overwrites any existing file
/// at `path`. Returns the number of records written.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = articles.len()))]
pub async fn write_articles(articles: &[Article], path: &Path) -> Result<usize, Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let mut out = String::new();
    for article in articles {
        out.push_str(&serde_json::to_string(article)?);
        out.push('\n');
    }

    fs::write(path, out).await?;
    info!("Wrote article records");
    Ok(articles.len())
}
