use crate::{UrlError, UrlResult};
use url::Url;

/// Tracking query parameters dropped from dedup keys
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Returns true for URLs the crawler is able to fetch (http and https)
pub fn is_crawlable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
}

/// Normalizes an absolute URL into the form used as its dedup key
///
/// # Normalization Steps
///
/// 1. Reject anything that is not http(s) with a host
/// 2. Remove the fragment (everything after #)
/// 3. Remove tracking query parameters (`utm_*`, `fbclid`, `gclid`, `mc_eid`)
/// 4. Remove an empty query string (trailing ?)
///
/// Host lowercasing and dot-segment removal are already done by the `url`
/// parser. The result is still the URL that gets fetched, so nothing that
/// could change which resource a server returns is rewritten.
///
/// # Examples
///
/// ```
/// use crawly::url::normalize_url;
/// use url::Url;
///
/// let url = Url::parse("https://Example.COM/page?utm_source=x#top").unwrap();
/// assert_eq!(normalize_url(url).unwrap().as_str(), "https://example.com/page");
/// ```
pub fn normalize_url(mut url: Url) -> UrlResult<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }
    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else if url.query_pairs().count() != kept.len() {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    Ok(url)
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
