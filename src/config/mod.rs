//! Configuration module for Crawly
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every section and key is optional; command-line flags override
//! whatever the file sets.
//!
//! # Example
//!
//! ```no_run
//! use crawly::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawly.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlSettings, ExtractorKind, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
