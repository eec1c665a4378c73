//! Crawly main entry point
//!
//! This is the command-line interface for the Crawly web crawler.

use chrono::Utc;
use clap::Parser;
use crawly::config::{load_config_with_hash, Config, ExtractorKind};
use crawly::crawler::{crawl_with_cancel, CrawlerConfig};
use crawly::output::{generate_markdown_summary, print_statistics, CrawlStats, CrawlSummary};
use crawly::url::HostScope;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Crawly: a concurrent web crawler
///
/// Crawly starts from a seed URL, follows every link it finds exactly once
/// and prints one line per fetched page.
#[derive(Parser, Debug)]
#[command(name = "crawly")]
#[command(version)]
#[command(about = "A concurrent web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// URL to start crawling from (overrides the config file)
    #[arg(short, long)]
    seed: Option<String>,

    /// Number of concurrent fetches
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Which hosts to follow: any, same-host or same-domain
    #[arg(long, value_parser = parse_scope)]
    scope: Option<HostScope>,

    /// Do not follow links found on pages at this depth
    #[arg(long)]
    max_depth: Option<u32>,

    /// Stop admitting new URLs after this many
    #[arg(long)]
    max_pages: Option<usize>,

    /// Link extractor: regex or html
    #[arg(long, value_parser = parse_extractor)]
    extractor: Option<ExtractorKind>,

    /// Write a markdown summary to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn parse_scope(value: &str) -> Result<HostScope, String> {
    HostScope::from_name(value)
        .ok_or_else(|| format!("unknown scope '{}' (expected any, same-host or same-domain)", value))
}

fn parse_extractor(value: &str) -> Result<ExtractorKind, String> {
    ExtractorKind::from_name(value)
        .ok_or_else(|| format!("unknown extractor '{}' (expected regex or html)", value))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    (cfg, Some(hash))
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => (Config::default(), None),
    };

    apply_overrides(&mut config, &cli);
    crawly::config::validate(&config)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, config_hash).await
}

/// Command-line flags win over the config file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(seed) = &cli.seed {
        config.crawler.seed = Some(seed.clone());
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.concurrency = concurrency;
    }
    if let Some(scope) = cli.scope {
        config.crawler.scope = scope;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = Some(max_depth);
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = Some(max_pages);
    }
    if let Some(extractor) = cli.extractor {
        config.crawler.extractor = extractor;
    }
    if let Some(summary) = &cli.summary {
        config.output.summary_path = Some(summary.display().to_string());
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawly=info,warn"),
            1 => EnvFilter::new("crawly=debug,info"),
            2 => EnvFilter::new("crawly=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Crawly Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Seed: {}",
        config.crawler.seed.as_deref().unwrap_or("(none)")
    );
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Scope: {:?}", config.crawler.scope);
    match config.crawler.max_depth {
        Some(depth) => println!("  Max depth: {}", depth),
        None => println!("  Max depth: unlimited"),
    }
    match config.crawler.max_pages {
        Some(pages) => println!("  Max pages: {}", pages),
        None => println!("  Max pages: unlimited"),
    }
    println!("  Timeout: {}s", config.crawler.timeout_secs);
    println!("  Extractor: {:?}", config.crawler.extractor);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    if let Some(path) = &config.output.summary_path {
        println!("\nSummary: {}", path);
    }

    if config.crawler.seed.is_some() {
        println!("\n✓ Configuration is valid");
    } else {
        println!("\n✗ No seed URL configured (use --seed or [crawler] seed)");
    }
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let crawler = CrawlerConfig::from_config(&config)?;
    let seed = crawler.seed.to_string();

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, stopping crawl");
                cancel.cancel();
            }
        });
    }

    let started_at = Utc::now();
    let mut stats = CrawlStats::new();
    let mut results = crawl_with_cancel(crawler, cancel.clone())?;

    while let Some(page) = results.next().await {
        println!("{}", page);
        stats.record(&page);
    }

    let canceled = cancel.is_cancelled();
    if canceled {
        tracing::warn!("Crawl canceled after {} pages", stats.pages_total);
    }

    println!();
    print_statistics(&stats);

    if let Some(path) = &config.output.summary_path {
        let summary = CrawlSummary {
            seed,
            started_at,
            finished_at: Utc::now(),
            canceled,
            config_hash,
            stats,
        };
        generate_markdown_summary(&summary, Path::new(path))?;
        tracing::info!("Summary written to: {}", path);
    }

    Ok(())
}
