//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of a crawl,
//! including statistics, per-depth and per-host breakdowns and failures.

use crate::output::stats::CrawlStats;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Number of hosts and failures listed before truncating
const LIST_LIMIT: usize = 50;

/// Everything needed to write a summary of one crawl
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    pub seed: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub canceled: bool,
    pub config_hash: Option<String>,
    pub stats: CrawlStats,
}

impl CrawlSummary {
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}

/// Writes a markdown summary to `output_path`
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let stats = &summary.stats;
    let mut md = String::new();

    md.push_str("# Crawly Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", summary.seed));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {} seconds\n",
        summary.duration_seconds()
    ));
    md.push_str(&format!(
        "- **Status**: {}\n",
        if summary.canceled { "canceled" } else { "completed" }
    ));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Fetched**: {}\n", stats.pages_total));
    md.push_str(&format!("- **Succeeded**: {}\n", stats.pages_ok));
    md.push_str(&format!("- **Failed**: {}\n", stats.pages_failed));
    md.push_str(&format!("- **Unique Hosts**: {}\n", stats.pages_by_host.len()));
    md.push_str(&format!("- **Links Found**: {}\n", stats.links_discovered));
    md.push_str(&format!("- **New Links**: {}\n", stats.links_new));
    md.push_str(&format!("- **Skipped Links**: {}\n", stats.links_skipped));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    // Depth breakdown
    if !stats.pages_by_depth.is_empty() {
        md.push_str("## Depth Breakdown\n\n");
        md.push_str("| Depth | Pages |\n");
        md.push_str("|-------|-------|\n");
        for (depth, count) in &stats.pages_by_depth {
            md.push_str(&format!("| {} | {} |\n", depth, count));
        }
        md.push('\n');
    }

    // Hosts, busiest first
    if !stats.pages_by_host.is_empty() {
        md.push_str("## Hosts\n\n");
        md.push_str("| Host | Pages |\n");
        md.push_str("|------|-------|\n");

        let mut hosts: Vec<_> = stats.pages_by_host.iter().collect();
        hosts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (host, count) in hosts.iter().take(LIST_LIMIT) {
            md.push_str(&format!("| {} | {} |\n", host, count));
        }
        if hosts.len() > LIST_LIMIT {
            md.push_str(&format!("\n... and {} more\n", hosts.len() - LIST_LIMIT));
        }
        md.push('\n');
    }

    // Error summary
    if !stats.errors_by_kind.is_empty() {
        md.push_str("## Error Summary\n\n");
        md.push_str("| Error Type | Count |\n");
        md.push_str("|------------|-------|\n");
        for (kind, count) in &stats.errors_by_kind {
            md.push_str(&format!("| {} | {} |\n", kind, count));
        }
        md.push('\n');
    }

    if !stats.failures.is_empty() {
        md.push_str("## Failed Pages\n\n");
        for (url, error) in stats.failures.iter().take(LIST_LIMIT) {
            md.push_str(&format!("- {}: {}\n", url, error));
        }
        if stats.failures.len() > LIST_LIMIT {
            md.push_str(&format!(
                "\n... and {} more\n",
                stats.failures.len() - LIST_LIMIT
            ));
        }
        md.push('\n');
    }

    md
}
