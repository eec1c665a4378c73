//! Host-scoping policy for discovered links

use crate::url::domain::{extract_domain, strip_www};
use serde::Deserialize;
use url::Url;

/// Which discovered hosts the crawler is allowed to follow, relative to the
/// seed URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostScope {
    /// Follow links to any host
    #[default]
    Any,
    /// Only follow links whose host equals the seed's host
    SameHost,
    /// Follow the seed's host and all of its subdomains; a leading `www.`
    /// on either side is ignored
    SameDomain,
}

impl HostScope {
    /// Returns true if `candidate` may be crawled under this policy
    ///
    /// # Examples
    ///
    /// ```
    /// use crawly::url::HostScope;
    /// use url::Url;
    ///
    /// let seed = Url::parse("https://www.example.com/").unwrap();
    /// let blog = Url::parse("https://blog.example.com/post").unwrap();
    ///
    /// assert!(HostScope::SameDomain.allows(&seed, &blog));
    /// assert!(!HostScope::SameHost.allows(&seed, &blog));
    /// ```
    pub fn allows(&self, seed: &Url, candidate: &Url) -> bool {
        match self {
            HostScope::Any => true,
            HostScope::SameHost => {
                let seed_host = extract_domain(seed);
                seed_host.is_some() && seed_host == extract_domain(candidate)
            }
            HostScope::SameDomain => match (extract_domain(seed), extract_domain(candidate)) {
                (Some(seed_host), Some(host)) => {
                    within_domain(strip_www(&seed_host), strip_www(&host))
                }
                _ => false,
            },
        }
    }

    /// Parses the kebab-case name used in configuration files and flags
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "any" => Some(HostScope::Any),
            "same-host" => Some(HostScope::SameHost),
            "same-domain" => Some(HostScope::SameDomain),
            _ => None,
        }
    }
}

/// `candidate` is `base` itself or any subdomain of it
fn within_domain(base: &str, candidate: &str) -> bool {
    candidate == base
        || candidate
            .strip_suffix(base)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
