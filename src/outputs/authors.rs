//! Per-author table output for the browser path.
//!
//! The browser path collects `{writer, content}` pairs from the rendered
//! page. This module writes them out twice: one consolidated `master_data.csv`
//! holding every post, and one derived `articles_<CleanName>.csv` per distinct
//! writer, where `<CleanName>` is the alphanumeric-only form of the writer's
//! display name.

use crate::models::Post;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Filename of the consolidated table.
pub const MASTER_TABLE: &str = "master_data.csv";

const HEADER: &str = "Writer,Content\n";

/// Strip a writer's display name down to its alphanumeric characters, for
/// use in a filename.
pub fn sanitize_writer_name(name: &str) -> String {
    name.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Quote a CSV field when it contains a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn render_table(posts: &[&Post]) -> String {
    let mut out = String::from(HEADER);
    for post in posts {
        out.push_str(&csv_field(&post.writer));
        out.push(',');
        out.push_str(&csv_field(&post.content));
        out.push('\n');
    }
    out
}

/// Write the consolidated table plus one table per distinct writer.
///
/// Returns the number of files written. Existing tables at the destination
/// are overwritten.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display(), posts = posts.len()))]
pub async fn write_author_tables(
    posts: &[Post],
    output_dir: &Path,
) -> Result<usize, Box<dyn Error>> {
    fs::create_dir_all(output_dir).await?;

    let all: Vec<&Post> = posts.iter().collect();
    fs::write(output_dir.join(MASTER_TABLE), render_table(&all)).await?;
    let mut files = 1;

    let mut by_writer: BTreeMap<&str, Vec<&Post>> = BTreeMap::new();
    for post in posts {
        by_writer.entry(post.writer.as_str()).or_default().push(post);
    }

    for (writer, group) in &by_writer {
        let filename = format!("articles_{}.csv", sanitize_writer_name(writer));
        fs::write(output_dir.join(&filename), render_table(group)).await?;
        info!(%writer, %filename, posts = group.len(), "Wrote author table");
        files += 1;
    }

    info!(files, writers = by_writer.len(), "Wrote author tables");
    Ok(files)
}
