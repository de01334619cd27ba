//! # mentor_harvest
//!
//! Harvests structured article content from a mentor platform through two
//! alternate paths: a direct cursor-paginated API client, and a
//! browser-automation fallback that drives a logged-in Chrome session for
//! pages that hide or protect the API.
//!
//! ## Usage
//!
//! ```sh
//! # API path: paginated ingestion into a JSONL artifact
//! mentor_harvest api --api-url https://example.com/api/articles
//!
//! # Browser path: per-author CSV tables from the rendered page
//! mentor_harvest browser --target-url https://example.com/
//! ```
//!
//! ## Architecture
//!
//! The API path is a sequential pipeline driven by the pagination loop:
//! 1. **Fetch**: one authenticated page request per iteration, bounded timeout
//! 2. **Normalize**: reduce the payload to an explicit page shape
//! 3. **Extract**: map raw records to canonical articles with stable ids
//! 4. **Flush**: persist the accumulator exactly once at loop exit,
//!    on expected completion and on abort alike

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod browser;
mod cli;
mod extract;
mod harvest;
mod mentors;
mod models;
mod outputs;
mod page;

use api::ApiClient;
use cli::{Cli, Command};
use harvest::RunState;
use mentors::MentorDirectory;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("mentor_harvest starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    match args.command {
        Command::Api {
            api_url,
            bearer_token,
            mentors_file,
            output,
        } => {
            let mentors = MentorDirectory::load(&mentors_file);
            let client = ApiClient::new(api_url, bearer_token)?;

            info!("Starting article download");
            let result = harvest::run(&client, &mentors).await;

            // Both terminal states flush whatever was accumulated.
            let count = outputs::jsonl::write_articles(&result.articles, &output).await?;
            match result.state() {
                RunState::SoftStop => info!(
                    reason = %result.stop,
                    records = count,
                    output = %output.display(),
                    "Harvest complete"
                ),
                _ => warn!(
                    reason = %result.stop,
                    records = count,
                    output = %output.display(),
                    "Harvest aborted early; partial results persisted"
                ),
            }
        }

        Command::Browser {
            target_url,
            auth_file,
            output_dir,
        } => {
            let posts = browser::harvest_posts(&target_url, &auth_file).await?;
            let files = outputs::authors::write_author_tables(&posts, &output_dir).await?;
            info!(
                posts = posts.len(),
                files,
                output_dir = %output_dir.display(),
                "Browser harvest complete"
            );
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
    Ok(())
}
