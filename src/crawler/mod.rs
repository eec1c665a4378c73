//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Page fetching behind the [`Fetcher`] capability
//! - Link extraction behind the [`LinkExtractor`] capability
//! - The shared frontier and dedup set
//! - Worker pool coordination and the result stream

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod types;

pub use coordinator::{crawl, crawl_with_cancel, Crawl};
pub use fetcher::{build_http_client, fetch_with_cancel, FetchedPage, Fetcher, HttpFetcher};
pub use frontier::{Claim, CrawlTarget, Frontier, InFlightGuard};
pub use parser::{HtmlLinkExtractor, LinkExtractor, RegexLinkExtractor};
pub use types::{CrawlerConfig, PageResult, DEFAULT_CONCURRENCY};
