//! Statistics aggregated from crawl results

use crate::crawler::PageResult;
use crate::url::extract_domain;
use std::collections::BTreeMap;

/// Crawl statistics summary
///
/// Built incrementally from the result stream with [`CrawlStats::record`].
#[derive(Debug, Clone, Default)]
pub struct CrawlStats {
    /// Number of fetch attempts
    pub pages_total: u64,

    /// Pages fetched successfully
    pub pages_ok: u64,

    /// Pages whose fetch failed
    pub pages_failed: u64,

    /// Total body bytes received
    pub bytes_fetched: u64,

    /// Resolved links found across all pages, duplicates included
    pub links_discovered: u64,

    /// Links that were new to the frontier
    pub links_new: u64,

    /// Links that could not be resolved or fetched
    pub links_skipped: u64,

    /// Fetch attempts per depth
    pub pages_by_depth: BTreeMap<u32, u64>,

    /// Fetch attempts per host
    pub pages_by_host: BTreeMap<String, u64>,

    /// Failures per error kind
    pub errors_by_kind: BTreeMap<&'static str, u64>,

    /// Failed URLs with their error, in arrival order
    pub failures: Vec<(String, String)>,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one result to the totals
    pub fn record(&mut self, result: &PageResult) {
        self.pages_total += 1;
        *self.pages_by_depth.entry(result.depth).or_insert(0) += 1;
        if let Some(host) = extract_domain(&result.url) {
            *self.pages_by_host.entry(host).or_insert(0) += 1;
        }

        match &result.error {
            None => {
                self.pages_ok += 1;
                self.bytes_fetched += result.body.len() as u64;
                self.links_discovered += result.link_count as u64;
                self.links_new += result.new_links as u64;
                self.links_skipped += result.skipped_links as u64;
            }
            Some(error) => {
                self.pages_failed += 1;
                *self.errors_by_kind.entry(error.kind()).or_insert(0) += 1;
                self.failures
                    .push((result.url.to_string(), error.to_string()));
            }
        }
    }

    /// Percentage of fetch attempts that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.pages_total == 0 {
            0.0
        } else {
            (self.pages_ok as f64 / self.pages_total as f64) * 100.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStats) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages fetched: {}", stats.pages_total);
    println!("  Unique hosts: {}", stats.pages_by_host.len());
    println!("  Bytes received: {}", stats.bytes_fetched);
    println!(
        "  Links found: {} ({} new, {} skipped)",
        stats.links_discovered, stats.links_new, stats.links_skipped
    );
    println!();

    if !stats.pages_by_depth.is_empty() {
        println!("Pages by Depth:");
        for (depth, count) in &stats.pages_by_depth {
            println!("  {}: {}", depth, count);
        }
        println!();
    }

    if !stats.errors_by_kind.is_empty() {
        println!("Error Summary:");
        let mut error_counts: Vec<_> = stats.errors_by_kind.iter().collect();
        error_counts.sort_by(|a, b| b.1.cmp(a.1));

        for (kind, count) in error_counts {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched successfully)",
        stats.success_rate(),
        stats.pages_ok,
        stats.pages_total
    );
}
