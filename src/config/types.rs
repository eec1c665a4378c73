use crate::crawler::{HtmlLinkExtractor, LinkExtractor, RegexLinkExtractor, DEFAULT_CONCURRENCY};
use crate::url::HostScope;
use serde::Deserialize;
use std::sync::Arc;

/// Main configuration structure for Crawly
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlSettings,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlSettings {
    /// URL the crawl starts from
    pub seed: Option<String>,

    /// Maximum number of concurrent page fetches
    pub concurrency: usize,

    /// Which discovered hosts may be followed
    pub scope: HostScope,

    /// Links on pages at this depth are not followed
    pub max_depth: Option<u32>,

    /// Maximum number of distinct URLs to fetch
    pub max_pages: Option<usize>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Link extractor implementation
    pub extractor: ExtractorKind,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            seed: None,
            concurrency: DEFAULT_CONCURRENCY,
            scope: HostScope::Any,
            max_depth: None,
            max_pages: None,
            timeout_secs: 30,
            extractor: ExtractorKind::Regex,
        }
    }
}

/// Selects a [`LinkExtractor`] implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorKind {
    /// Source-order tag scanner
    #[default]
    Regex,
    /// Full HTML5 parse via scraper
    Html,
}

impl ExtractorKind {
    pub fn build(&self) -> Arc<dyn LinkExtractor> {
        match self {
            ExtractorKind::Regex => Arc::new(RegexLinkExtractor),
            ExtractorKind::Html => Arc::new(HtmlLinkExtractor),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "regex" => Some(ExtractorKind::Regex),
            "html" => Some(ExtractorKind::Html),
            _ => None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, contact),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "crawly".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Where to write the markdown summary, if anywhere
    pub summary_path: Option<String>,
}
