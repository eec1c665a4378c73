use crate::config::Config;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::parser::{LinkExtractor, RegexLinkExtractor};
use crate::url::{normalize_url, HostScope, Resolver, UrlResolver};
use crate::{ConfigError, ConfigResult, CrawlyError, FetchError};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Number of workers used when none is configured
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Everything a crawl needs, fixed for its whole lifetime
///
/// The capabilities are shared by all workers, so they are held behind
/// `Arc`s and must be `Send + Sync`.
#[derive(Clone)]
pub struct CrawlerConfig {
    /// Where the crawl starts
    pub seed: Url,

    /// Retrieves page bodies
    pub fetcher: Arc<dyn Fetcher>,

    /// Finds raw links in a page body
    pub extractor: Arc<dyn LinkExtractor>,

    /// Turns raw links into absolute URLs
    pub resolver: Arc<dyn Resolver>,

    /// Number of concurrent workers (and so of simultaneous fetches)
    pub concurrency: usize,

    /// Which discovered hosts may be followed
    pub scope: HostScope,

    /// Links found on pages at this depth are not followed
    pub max_depth: Option<u32>,

    /// Upper bound on distinct URLs admitted, the seed included
    pub max_pages: Option<usize>,
}

impl CrawlerConfig {
    /// Creates a configuration with default extractor, resolver and limits
    ///
    /// Fails if `seed` is not an absolute http(s) URL.
    pub fn new(seed: &str, fetcher: Arc<dyn Fetcher>) -> ConfigResult<Self> {
        Ok(Self {
            seed: parse_seed(seed)?,
            fetcher,
            extractor: Arc::new(RegexLinkExtractor),
            resolver: Arc::new(UrlResolver),
            concurrency: DEFAULT_CONCURRENCY,
            scope: HostScope::Any,
            max_depth: None,
            max_pages: None,
        })
    }

    /// Builds a configuration from a loaded config file, using a real HTTP
    /// fetcher
    pub fn from_config(config: &Config) -> Result<Self, CrawlyError> {
        let seed = config
            .crawler
            .seed
            .as_deref()
            .ok_or_else(|| ConfigError::Validation("no seed URL configured".to_string()))?;

        let fetcher = HttpFetcher::from_config(
            &config.user_agent,
            Duration::from_secs(config.crawler.timeout_secs),
        )?;

        let crawler = Self::new(seed, Arc::new(fetcher))?
            .with_extractor(config.crawler.extractor.build())
            .with_concurrency(config.crawler.concurrency)
            .with_scope(config.crawler.scope)
            .with_max_depth(config.crawler.max_depth)
            .with_max_pages(config.crawler.max_pages);

        crawler.validate()?;
        Ok(crawler)
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn LinkExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_scope(mut self, scope: HostScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<u32>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Checks the limits; the seed was already checked on construction
    pub fn validate(&self) -> ConfigResult<()> {
        if self.concurrency == 0 {
            return Err(ConfigError::Validation(
                "concurrency must be at least 1".to_string(),
            ));
        }

        if self.max_pages == Some(0) {
            return Err(ConfigError::Validation(
                "max_pages must be at least 1".to_string(),
            ));
        }

        // The seed field is public, so it may have been replaced
        normalize_url(self.seed.clone())
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", self.seed, e)))?;

        Ok(())
    }
}

impl fmt::Debug for CrawlerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlerConfig")
            .field("seed", &self.seed.as_str())
            .field("concurrency", &self.concurrency)
            .field("scope", &self.scope)
            .field("max_depth", &self.max_depth)
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}

/// Parses and normalizes a seed URL
fn parse_seed(seed: &str) -> ConfigResult<Url> {
    let url = Url::parse(seed.trim())
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    normalize_url(url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))
}

/// Outcome of one fetch attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    /// The URL that was fetched
    pub url: Url,

    /// Link distance from the seed
    pub depth: u32,

    /// Page body; empty when the fetch failed
    pub body: String,

    /// Links that resolved to crawlable absolute URLs, duplicates included
    pub link_count: usize,

    /// Links that failed to resolve or use a scheme that cannot be fetched
    pub skipped_links: usize,

    /// Links this page added to the frontier for the first time
    pub new_links: usize,

    /// Why the fetch failed, if it did
    pub error: Option<FetchError>,
}

impl PageResult {
    /// A result for a page whose fetch failed
    pub fn failed(url: Url, depth: u32, error: FetchError) -> Self {
        Self {
            url,
            depth,
            body: String::new(),
            link_count: 0,
            skipped_links: 0,
            new_links: 0,
            error: Some(error),
        }
    }

    /// Returns true if the page was fetched successfully
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for PageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            None => write!(
                f,
                "{} depth={} bytes={} links={} new={} skipped={}",
                self.url,
                self.depth,
                self.body.len(),
                self.link_count,
                self.new_links,
                self.skipped_links
            ),
            Some(error) => write!(f, "{} depth={} error: {}", self.url, self.depth, error),
        }
    }
}
