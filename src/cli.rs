//! Command-line interface definitions for mentor_harvest.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The two harvesting paths are exposed as subcommands; secrets can be
//! provided via environment variables instead of flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use url::Url;

/// Command-line arguments for the mentor_harvest application.
///
/// # Examples
///
/// ```sh
/// # Harvest through the paginated feed API
/// mentor_harvest api --api-url https://example.com/api/articles
///
/// # Fall back to a logged-in browser session
/// mentor_harvest browser --target-url https://example.com/
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// The two alternate harvesting paths.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Harvest articles through the cursor-paginated feed API
    Api {
        /// Feed API endpoint
        #[arg(long)]
        api_url: Url,

        /// Bearer token for the authenticated session
        #[arg(long, env = "BEARER_TOKEN", hide_env_values = true)]
        bearer_token: String,

        /// Mentor reference dataset (id to display name)
        #[arg(long, default_value = "json/mentors.json")]
        mentors_file: PathBuf,

        /// Output path for the JSONL article records
        #[arg(short, long, default_value = "json/articles.jsonl")]
        output: PathBuf,
    },

    /// Harvest articles by driving a logged-in browser session
    Browser {
        /// Page to harvest posts from
        #[arg(long)]
        target_url: Url,

        /// Session state file produced by the interactive login step
        #[arg(long, default_value = "auth.json")]
        auth_file: PathBuf,

        /// Directory for the consolidated and per-author tables
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
}
