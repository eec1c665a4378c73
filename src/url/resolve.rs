//! Reference resolution
//!
//! Turns a raw `href` value into an absolute URL against the page it was
//! found on, following the standard reference-resolution rules (relative
//! paths, `//host` protocol-relative references, `?query` and `#fragment`
//! only references).

use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves raw link text against a base URL
///
/// Implementations must be pure: no I/O and no shared mutable state.
pub trait Resolver: Send + Sync {
    /// Resolve `raw` against `base`, failing when `raw` is not a URL or
    /// URL-reference
    fn resolve(&self, base: &Url, raw: &str) -> UrlResult<Url>;
}

/// Default resolver built on [`Url::join`]
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlResolver;

impl Resolver for UrlResolver {
    fn resolve(&self, base: &Url, raw: &str) -> UrlResult<Url> {
        let raw = raw.trim();
        base.join(raw)
            .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))
    }
}
