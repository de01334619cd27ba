//! Output generation modules for the harvested article artifacts.
//!
//! # Submodules
//!
//! - [`jsonl`]: writes the API path's canonical records as line-delimited JSON
//! - [`authors`]: writes the browser path's consolidated and per-author tables
//!
//! # Output Structure
//!
//! ```text
//! # API path
//! json/articles.jsonl        # one canonical record per line, fetch order
//!
//! # Browser path
//! master_data.csv            # all posts, Writer,Content
//! articles_<CleanName>.csv   # one table per distinct writer
//! ```

pub mod authors;
pub mod jsonl;
