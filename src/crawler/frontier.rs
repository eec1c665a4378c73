//! Frontier and dedup set
//!
//! The frontier is the only mutable state shared between workers. All of it
//! (pending queue, visited set, in-flight count) lives behind a single mutex
//! so that each operation is one indivisible step:
//!
//! - [`Frontier::offer`] checks and inserts into the visited set and enqueues
//!   under the same lock, so concurrent offers of one URL admit it once.
//! - [`Frontier::try_claim`] pops a target and increments the in-flight count
//!   under the same lock, so a claimed page is never invisible to
//!   [`Frontier::is_exhausted`] while its links are still being offered.
//!
//! - [`Frontier::mark_visited`] records a redirect target in the same
//!   visited set, so a page reached through a redirect is not fetched again
//!   when it is linked directly.
//!
//! The lock is never held across an `.await`. Blocked claimers park on a
//! [`Notify`] that is signalled on every offer, on exhaustion and on close.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;
use url::Url;

/// A URL scheduled for fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// Absolute, normalized URL
    pub url: Url,

    /// Link distance from the seed (the seed is depth 0)
    pub depth: u32,

    /// Position in frontier insertion order (the seed is 0)
    pub sequence: u64,
}

/// Outcome of a non-blocking claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// A target was removed from the queue and counted as in flight
    Ready(CrawlTarget),
    /// The queue is empty but in-flight pages may still offer new links
    Pending,
    /// Nothing is queued or in flight, or the frontier was closed
    Exhausted,
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<CrawlTarget>,
    visited: HashSet<String>,
    admitted: usize,
    in_flight: usize,
    next_sequence: u64,
    closed: bool,
}

impl FrontierState {
    fn is_exhausted(&self) -> bool {
        self.queue.is_empty() && self.in_flight == 0
    }
}

/// Work queue plus visited set for one crawl
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    changed: Notify,
    max_pages: Option<usize>,
}

impl Frontier {
    /// Creates a frontier with `seed` enqueued at depth 0
    pub fn new(seed: Url) -> Self {
        Self::with_limit(seed, None)
    }

    /// Creates a frontier that admits at most `max_pages` URLs in total,
    /// the seed included
    pub fn with_limit(seed: Url, max_pages: Option<usize>) -> Self {
        let frontier = Self {
            state: Mutex::new(FrontierState::default()),
            changed: Notify::new(),
            max_pages,
        };
        frontier.offer(seed, 0);
        frontier
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        // No operation can panic halfway through a state update, so a
        // poisoned lock still guards consistent state
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Admits `url` if it has never been seen
    ///
    /// Returns true if the URL was new and has been queued. Returns false,
    /// changing nothing, if it was already visited, the page budget is
    /// spent, or the frontier is closed.
    pub fn offer(&self, url: Url, depth: u32) -> bool {
        let mut state = self.lock();

        if state.closed {
            return false;
        }
        if state.visited.contains(url.as_str()) {
            return false;
        }
        if self.max_pages.is_some_and(|max| state.admitted >= max) {
            tracing::trace!("Page budget spent, not admitting {}", url);
            return false;
        }

        state.visited.insert(url.as_str().to_string());
        state.admitted += 1;
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.queue.push_back(CrawlTarget {
            url,
            depth,
            sequence,
        });
        drop(state);

        self.changed.notify_waiters();
        true
    }

    /// Records `url` as seen without queueing it
    ///
    /// Used for the URL a claimed target was actually served from after
    /// redirects. Does not count against the page budget. Returns true if
    /// the URL had not been seen before.
    pub fn mark_visited(&self, url: &Url) -> bool {
        let mut state = self.lock();
        if state.closed {
            return false;
        }
        state.visited.insert(url.as_str().to_string())
    }

    /// Removes the next target without waiting
    ///
    /// A [`Claim::Ready`] must be paired with exactly one [`Frontier::mark_done`].
    pub fn try_claim(&self) -> Claim {
        let mut state = self.lock();

        if state.closed {
            return Claim::Exhausted;
        }

        match state.queue.pop_front() {
            Some(target) => {
                state.in_flight += 1;
                Claim::Ready(target)
            }
            None if state.in_flight == 0 => Claim::Exhausted,
            None => Claim::Pending,
        }
    }

    /// Removes the next target, waiting while the queue is empty but other
    /// claims are still in flight
    ///
    /// Returns `None` once the frontier is exhausted or closed.
    pub async fn claim_next(&self) -> Option<CrawlTarget> {
        loop {
            // Register interest before looking, so a notification sent
            // between the check and the await is not lost
            let changed = self.changed.notified();
            tokio::pin!(changed);
            changed.as_mut().enable();

            match self.try_claim() {
                Claim::Ready(target) => return Some(target),
                Claim::Exhausted => return None,
                Claim::Pending => changed.await,
            }
        }
    }

    /// Records that processing of one claimed target has finished
    pub fn mark_done(&self) {
        let mut state = self.lock();

        if state.in_flight == 0 {
            tracing::warn!("mark_done called with no claim in flight");
            return;
        }
        state.in_flight -= 1;
        let exhausted = state.is_exhausted();
        drop(state);

        if exhausted {
            self.changed.notify_waiters();
        }
    }

    /// True iff nothing is queued and nothing is in flight
    ///
    /// Closing the frontier does not by itself exhaust it; claims still in
    /// flight keep running until they are marked done, and
    /// [`Frontier::try_claim`] refuses new work on a closed frontier.
    pub fn is_exhausted(&self) -> bool {
        self.lock().is_exhausted()
    }

    /// Stops the frontier: no further claim or offer succeeds and all
    /// blocked claimers return `None`
    pub fn close(&self) {
        self.lock().closed = true;
        self.changed.notify_waiters();
    }

    /// Number of targets waiting to be claimed
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// Number of claims not yet marked done
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Number of distinct URLs ever queued
    pub fn admitted(&self) -> usize {
        self.lock().admitted
    }

    /// Number of distinct URLs seen, redirect targets included
    pub fn visited(&self) -> usize {
        self.lock().visited.len()
    }
}

/// Calls [`Frontier::mark_done`] when dropped
///
/// Holding one per claimed target guarantees the in-flight count is released
/// exactly once, even if processing the page panics.
pub struct InFlightGuard<'a> {
    frontier: &'a Frontier,
}

impl<'a> InFlightGuard<'a> {
    /// Guards a claim just returned by `frontier`
    pub fn new(frontier: &'a Frontier) -> Self {
        Self { frontier }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.frontier.mark_done();
    }
}
