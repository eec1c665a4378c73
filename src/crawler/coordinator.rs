//! Crawler coordinator - main crawl orchestration logic
//!
//! This module runs a crawl as a fixed pool of workers around one shared
//! [`Frontier`]:
//! - Seeding the frontier and spawning the workers
//! - Coordinating fetching, link extraction, resolution and dedup
//! - Streaming one [`PageResult`] per fetch attempt to the caller
//! - Handling cancellation
//!
//! Each worker loops: claim a target, fetch it, extract and resolve its links,
//! offer them to the frontier, emit the result, then mark the claim done. The
//! result stream closes once the coordinator has seen every worker return,
//! which happens only when the frontier is exhausted or the crawl is canceled.

use crate::crawler::fetcher::fetch_with_cancel;
use crate::crawler::frontier::{CrawlTarget, Frontier, InFlightGuard};
use crate::crawler::types::{CrawlerConfig, PageResult};
use crate::url::{is_crawlable, normalize_url};
use crate::{ConfigResult, FetchError};
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::{CancellationToken, DropGuard};
use url::Url;

/// Starts a crawl and returns the stream of its results
///
/// Must be called from within a tokio runtime. Fails only if the
/// configuration is invalid, in which case nothing is fetched.
///
/// # Example
///
/// ```no_run
/// use crawly::crawler::{crawl, CrawlerConfig, HttpFetcher};
/// use crawly::config::UserAgentConfig;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::from_config(&UserAgentConfig::default(), Duration::from_secs(30))?;
/// let config = CrawlerConfig::new("https://example.com/", Arc::new(fetcher))?;
///
/// let mut results = crawl(config)?;
/// while let Some(page) = results.next().await {
///     println!("{}", page);
/// }
/// # Ok(())
/// # }
/// ```
pub fn crawl(config: CrawlerConfig) -> ConfigResult<Crawl> {
    crawl_with_cancel(config, CancellationToken::new())
}

/// Starts a crawl that also stops when `cancel` fires
///
/// On cancellation in-flight fetches are aborted, no further targets are
/// claimed and the result stream closes promptly.
pub fn crawl_with_cancel(config: CrawlerConfig, cancel: CancellationToken) -> ConfigResult<Crawl> {
    config.validate()?;

    let cancel = cancel.child_token();
    let frontier = Arc::new(Frontier::with_limit(config.seed.clone(), config.max_pages));
    let (tx, rx) = mpsc::channel(config.concurrency * 2);

    let coordinator = Coordinator {
        config: Arc::new(config),
        frontier,
        cancel: cancel.clone(),
    };
    tokio::spawn(coordinator.run(tx));

    Ok(Crawl {
        results: rx,
        cancel: cancel.clone(),
        _guard: cancel.drop_guard(),
    })
}

/// Handle to a running crawl
///
/// Yields one [`PageResult`] per fetch attempt and ends when the crawl is
/// complete. Dropping the handle cancels the crawl.
pub struct Crawl {
    results: mpsc::Receiver<PageResult>,
    cancel: CancellationToken,
    _guard: DropGuard,
}

impl Crawl {
    /// Waits for the next result; `None` once the crawl has finished
    pub async fn next(&mut self) -> Option<PageResult> {
        self.results.recv().await
    }

    /// Cancels the crawl; results already produced can still be received
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this crawl when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Stream for Crawl {
    type Item = PageResult;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().results.poll_recv(cx)
    }
}

/// Owns the worker pool for one crawl
struct Coordinator {
    config: Arc<CrawlerConfig>,
    frontier: Arc<Frontier>,
    cancel: CancellationToken,
}

impl Coordinator {
    async fn run(self, results: mpsc::Sender<PageResult>) {
        tracing::info!(
            "Starting crawl of {} with {} workers",
            self.config.seed,
            self.config.concurrency
        );
        let start_time = Instant::now();

        let mut workers = JoinSet::new();
        for id in 0..self.config.concurrency {
            let worker = Worker {
                id,
                config: self.config.clone(),
                frontier: self.frontier.clone(),
                cancel: self.cancel.clone(),
                results: results.clone(),
            };
            workers.spawn(worker.run());
        }

        let mut pages_crawled = 0;
        let mut canceled = false;
        loop {
            tokio::select! {
                _ = self.cancel.cancelled(), if !canceled => {
                    tracing::info!("Crawl canceled, stopping workers");
                    canceled = true;
                    self.frontier.close();
                }
                joined = workers.join_next() => match joined {
                    Some(Ok(processed)) => pages_crawled += processed,
                    Some(Err(e)) => tracing::error!("Worker task failed: {}", e),
                    None => break,
                },
            }
        }

        tracing::info!(
            "Crawl completed: {} pages crawled, {} URLs discovered in {:?}",
            pages_crawled,
            self.frontier.visited(),
            start_time.elapsed()
        );

        // The stream closes here, after every worker has returned
        drop(results);
    }
}

/// Per-page counts of the links found on it
#[derive(Debug, Default)]
struct LinkTally {
    discovered: usize,
    skipped: usize,
    admitted: usize,
}

struct Worker {
    id: usize,
    config: Arc<CrawlerConfig>,
    frontier: Arc<Frontier>,
    cancel: CancellationToken,
    results: mpsc::Sender<PageResult>,
}

impl Worker {
    /// Processes targets until the frontier is exhausted; returns how many
    /// pages this worker handled
    async fn run(self) -> usize {
        let mut processed = 0;

        loop {
            let target = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                claimed = self.frontier.claim_next() => match claimed {
                    Some(target) => target,
                    None => break,
                },
            };
            let _in_flight = InFlightGuard::new(&self.frontier);

            let Some(result) = self.process(&target).await else {
                break;
            };
            processed += 1;

            let sent = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                sent = self.results.send(result) => sent,
            };
            if sent.is_err() {
                // Nobody is listening any more
                tracing::debug!("Result receiver dropped, canceling crawl");
                self.cancel.cancel();
                break;
            }
        }

        tracing::debug!("Worker {} finished after {} pages", self.id, processed);
        processed
    }

    /// Fetches one target and offers its links
    ///
    /// Returns `None` if the fetch was aborted by cancellation.
    async fn process(&self, target: &CrawlTarget) -> Option<PageResult> {
        tracing::debug!(
            "Worker {} fetching {} (depth {})",
            self.id,
            target.url,
            target.depth
        );

        let fetch_result =
            fetch_with_cancel(self.config.fetcher.as_ref(), &target.url, &self.cancel).await;

        let page = match fetch_result {
            Ok(page) => page,
            Err(FetchError::Canceled { .. }) => return None,
            Err(error) => {
                tracing::warn!("Failed to fetch {}: {}", target.url, error);
                return Some(PageResult::failed(target.url.clone(), target.depth, error));
            }
        };

        if page.final_url != target.url {
            if let Ok(final_url) = normalize_url(page.final_url.clone()) {
                if final_url != target.url && self.frontier.mark_visited(&final_url) {
                    tracing::debug!("{} redirected to {}", target.url, final_url);
                }
            }
        }

        let raw_links = self.config.extractor.extract_links(&page.body);
        let tally = self.offer_links(target, &page.final_url, &raw_links);

        tracing::debug!(
            "Processed {}: {} links, {} new, {} skipped",
            target.url,
            tally.discovered,
            tally.admitted,
            tally.skipped
        );

        Some(PageResult {
            url: target.url.clone(),
            depth: target.depth,
            body: page.body,
            link_count: tally.discovered,
            skipped_links: tally.skipped,
            new_links: tally.admitted,
            error: None,
        })
    }

    /// Resolves each raw link against `base` and offers the crawlable,
    /// in-scope ones to the frontier
    fn offer_links(&self, target: &CrawlTarget, base: &Url, raw_links: &[String]) -> LinkTally {
        let mut tally = LinkTally::default();
        let follow = self
            .config
            .max_depth
            .map_or(true, |max_depth| target.depth < max_depth);

        for raw in raw_links {
            let resolved = match self.config.resolver.resolve(base, raw) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Skipping link {:?} on {}: {}", raw, target.url, e);
                    tally.skipped += 1;
                    continue;
                }
            };

            if !is_crawlable(&resolved) {
                tracing::trace!("Skipping non-crawlable link {}", resolved);
                tally.skipped += 1;
                continue;
            }

            let normalized = match normalize_url(resolved) {
                Ok(url) => url,
                Err(e) => {
                    tracing::debug!("Skipping link {:?} on {}: {}", raw, target.url, e);
                    tally.skipped += 1;
                    continue;
                }
            };
            tally.discovered += 1;

            if !follow || !self.config.scope.allows(&self.config.seed, &normalized) {
                continue;
            }

            if self.frontier.offer(normalized, target.depth + 1) {
                tally.admitted += 1;
            }
        }

        tally
    }
}
