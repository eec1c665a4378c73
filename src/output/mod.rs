//! Output module for crawl statistics and reports
//!
//! This module handles:
//! - Aggregating statistics from the result stream
//! - Printing statistics to the terminal
//! - Generating markdown summaries of a crawl

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary, CrawlSummary};
pub use stats::{print_statistics, CrawlStats};
