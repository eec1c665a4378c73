//! URL handling module for Crawly
//!
//! This module provides reference resolution, dedup-key normalization,
//! host extraction and the host-scoping policy applied to discovered links.

mod domain;
mod normalize;
mod resolve;
mod scope;

// Re-export main functions
pub use domain::{extract_domain, strip_www};
pub use normalize::{is_crawlable, normalize_url};
pub use resolve::{Resolver, UrlResolver};
pub use scope::HostScope;
