//! HTTP fetcher implementation
//!
//! This module handles page retrieval for the crawler, including:
//! - The [`Fetcher`] capability the coordinator is written against
//! - Building HTTP clients with proper user agent strings
//! - A reqwest-backed [`HttpFetcher`]
//! - Cancellation of in-flight fetches
//! - Error classification
//!
//! A fetch performs exactly one retrieval. There are no retries here.

use crate::config::UserAgentConfig;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Maximum number of redirects followed for a single fetch
const MAX_REDIRECTS: usize = 10;

/// A successfully retrieved page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// URL the body was actually served from, after redirects
    pub final_url: Url,

    /// Page body, decoded as text
    pub body: String,
}

impl FetchedPage {
    /// A page served from the URL it was requested with
    pub fn new(url: Url, body: impl Into<String>) -> Self {
        Self {
            final_url: url,
            body: body.into(),
        }
    }
}

/// Retrieves the body of a page
///
/// Implementations are shared by every worker of a crawl. Dropping the
/// returned future must abort the retrieval.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url` once
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Fetches `url`, returning [`FetchError::Canceled`] promptly if `cancel`
/// fires before or during the retrieval
pub async fn fetch_with_cancel(
    fetcher: &dyn Fetcher,
    url: &Url,
    cancel: &CancellationToken,
) -> Result<FetchedPage, FetchError> {
    if cancel.is_cancelled() {
        return Err(FetchError::Canceled {
            url: url.to_string(),
        });
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FetchError::Canceled { url: url.to_string() }),
        result = fetcher.fetch(url) => result,
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Total time allowed for one request, body included
///
/// # Example
///
/// ```no_run
/// use crawly::config::UserAgentConfig;
/// use crawly::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig::default();
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a reqwest [`Client`]
///
/// # Failure Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | Timeout | `FetchError::Timeout` |
/// | DNS / connect / TLS / redirect failure | `FetchError::Transport` |
/// | Non-2xx status | `FetchError::Status` (body is not read) |
/// | Body read or decode failure | `FetchError::Body` |
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the user agent configuration
    pub fn from_config(config: &UserAgentConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config, timeout)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        Ok(FetchedPage { final_url, body })
    }
}

/// Maps a reqwest send error onto the fetch error taxonomy
fn classify_request_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Transport {
            url: url.to_string(),
            message: format!("Connection failed: {}", error),
        }
    } else if error.is_redirect() {
        FetchError::Transport {
            url: url.to_string(),
            message: format!("Redirect error: {}", error),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: Some("https://example.com/about".to_string()),
        }
    }

    /// Never completes on its own
    struct HangingFetcher {
        started: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Fetcher for HangingFetcher {
        async fn fetch(&self, _url: &Url) -> Result<FetchedPage, FetchError> {
            self.started.store(true, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    struct EchoFetcher;

    #[async_trait]
    impl Fetcher for EchoFetcher {
        async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
            Ok(FetchedPage::new(url.clone(), url.as_str()))
        }
    }

    #[test]
    fn test_build_http_client() {
        let config = create_test_config();
        let client = build_http_client(&config, Duration::from_secs(5));
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_with_cancel_passes_through() {
        let url = Url::parse("https://example.com/").unwrap();
        let token = CancellationToken::new();

        let page = fetch_with_cancel(&EchoFetcher, &url, &token).await.unwrap();
        assert_eq!(page.body, "https://example.com/");
        assert_eq!(page.final_url, url);
    }

    #[tokio::test]
    async fn test_fetch_canceled_before_start() {
        let url = Url::parse("https://example.com/").unwrap();
        let started = Arc::new(AtomicBool::new(false));
        let fetcher = HangingFetcher {
            started: started.clone(),
        };
        let token = CancellationToken::new();
        token.cancel();

        let result = fetch_with_cancel(&fetcher, &url, &token).await;
        assert!(matches!(result, Err(FetchError::Canceled { .. })));
        assert!(!started.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_fetch_canceled_during_retrieval() {
        let url = Url::parse("https://example.com/slow").unwrap();
        let fetcher = HangingFetcher {
            started: Arc::new(AtomicBool::new(false)),
        };
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            fetch_with_cancel(&fetcher, &url, &token),
        )
        .await
        .expect("cancellation did not interrupt the fetch");

        assert_eq!(
            result,
            Err(FetchError::Canceled {
                url: "https://example.com/slow".to_string()
            })
        );
    }

    // Status and transport classification against a live server is covered
    // by the wiremock integration tests
}
