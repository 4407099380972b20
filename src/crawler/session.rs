//! Per-session crawl state
//!
//! Everything a running crawl shares between the dispatcher and its worker
//! tasks lives in one [`CrawlSession`], passed around as `Arc<CrawlSession>`.
//! Independent coordinators therefore never share state.

use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::url::PriorityScorer;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::Notify;

/// URLs claimed for processing during one session
///
/// This is the only deduplication authority: a URL is offered to the frontier
/// only by the caller whose [`insert`](Self::insert) returned `true`.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.urls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Atomically inserts `url` if absent; returns `true` if this call inserted it
    pub fn insert(&self, url: &str) -> bool {
        let mut urls = self.lock();
        if urls.contains(url) {
            return false;
        }
        urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// State of one crawl, from `start` until quiescence
pub struct CrawlSession {
    pub max_depth: u32,
    pub started_at: DateTime<Utc>,
    started: Instant,
    frontier: Frontier,
    visited: VisitedSet,
    /// Tasks admitted by the dispatcher that have not finished yet
    outstanding: AtomicUsize,
    stop_requested: AtomicBool,
    quiescence: Notify,
    pages_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    links_recorded: AtomicU64,
}

impl CrawlSession {
    pub fn new(max_depth: u32, scorer: Arc<PriorityScorer>) -> Self {
        Self {
            max_depth,
            started_at: Utc::now(),
            started: Instant::now(),
            frontier: Frontier::new(scorer),
            visited: VisitedSet::new(),
            outstanding: AtomicUsize::new(0),
            stop_requested: AtomicBool::new(false),
            quiescence: Notify::new(),
            pages_fetched: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            links_recorded: AtomicU64::new(0),
        }
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Claims `url` in the visited set and, if the claim succeeded, queues it
    ///
    /// Returns `true` if the entry was offered.
    pub fn claim_and_offer(&self, url: &str, depth: u32) -> bool {
        if !self.visited.insert(url) {
            return false;
        }
        self.frontier.offer(FrontierEntry::new(url, depth));
        self.quiescence.notify_one();
        true
    }

    /// Takes the next entry for dispatch
    ///
    /// The dispatcher is the only caller and re-checks [`is_quiescent`](Self::is_quiescent)
    /// itself after an empty result, so no wakeup is stored here.
    pub fn take_next(&self) -> Option<FrontierEntry> {
        self.frontier.take_next()
    }

    /// Registers an admitted task; the returned guard marks it finished on drop
    pub fn begin_task(self: &Arc<Self>) -> TaskGuard {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        TaskGuard {
            session: Arc::clone(self),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// True when no task is in flight and nothing is queued
    ///
    /// Only the dispatcher starts tasks, and a task offers its children before
    /// its guard decrements the counter. Reading the counter first therefore
    /// makes the pair of reads equivalent to one atomic read: once zero tasks
    /// are outstanding, nobody else can add to the frontier.
    pub fn is_quiescent(&self) -> bool {
        self.outstanding.load(Ordering::SeqCst) == 0 && self.frontier.is_empty()
    }

    /// Waits until the next task completion or offer
    pub async fn wait_for_progress(&self) {
        self.quiescence.notified().await;
    }

    /// Soft stop: discovered links are no longer recorded or queued
    ///
    /// Entries already in the frontier are still fetched. Returns how many
    /// of them are left to drain.
    pub fn request_stop(&self) -> usize {
        let already_stopping = self.stop_requested.swap(true, Ordering::SeqCst);
        let queued = self.frontier.len();
        if !already_stopping {
            tracing::info!(
                "Stopping crawl: {} tasks in flight, {} queued entries left to drain",
                self.outstanding(),
                queued
            );
        }
        queued
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    pub fn record_fetch(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_link(&self) {
        self.links_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched.load(Ordering::Relaxed)
    }

    pub fn fetch_failures(&self) -> u64 {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    pub fn links_recorded(&self) -> u64 {
        self.links_recorded.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.started.elapsed()
    }
}

/// Outstanding-task accounting for one admitted frontier entry
///
/// Dropping the guard (including during a panic unwind) decrements the
/// counter and wakes the quiescence monitor.
pub struct TaskGuard {
    session: Arc<CrawlSession>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.session.outstanding.fetch_sub(1, Ordering::SeqCst);
        self.session.quiescence.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn session() -> Arc<CrawlSession> {
        Arc::new(CrawlSession::new(3, Arc::new(PriorityScorer::default())))
    }

    #[test]
    fn test_visited_insert_is_insert_if_absent() {
        let visited = VisitedSet::new();
        assert!(visited.insert("https://a.example/"));
        assert!(!visited.insert("https://a.example/"));
        assert!(visited.contains("https://a.example/"));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        let visited = Arc::new(VisitedSet::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let visited = visited.clone();
                std::thread::spawn(move || visited.insert("https://contested.example/"))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn test_claim_and_offer_enqueues_once() {
        let session = session();
        assert!(session.claim_and_offer("https://a.example/", 1));
        assert!(!session.claim_and_offer("https://a.example/", 2));
        assert_eq!(session.frontier().len(), 1);
    }

    #[test]
    fn test_quiescence_tracks_tasks_and_frontier() {
        let session = session();
        assert!(session.is_quiescent());

        session.claim_and_offer("https://a.example/", 1);
        assert!(!session.is_quiescent());

        let entry = session.take_next().unwrap();
        let guard = session.begin_task();
        assert_eq!(entry.url, "https://a.example/");
        assert!(session.frontier().is_empty());
        assert!(!session.is_quiescent());

        drop(guard);
        assert_eq!(session.outstanding(), 0);
        assert!(session.is_quiescent());
    }

    #[tokio::test]
    async fn test_task_completion_wakes_waiter() {
        let session = session();
        let guard = session.begin_task();

        let waiter = {
            let session = session.clone();
            tokio::spawn(async move {
                while !session.is_quiescent() {
                    session.wait_for_progress().await;
                }
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(guard);

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should observe quiescence")
            .unwrap();
    }

    #[test]
    fn test_guard_released_on_panic() {
        let session = session();
        let cloned = session.clone();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = cloned.begin_task();
            panic!("task blew up");
        }));

        assert!(result.is_err());
        assert_eq!(session.outstanding(), 0);
    }

    #[test]
    fn test_stop_flag() {
        let session = session();
        assert!(!session.is_stop_requested());
        assert_eq!(session.request_stop(), 0);
        assert!(session.is_stop_requested());
    }

    #[test]
    fn test_stop_reports_queued_entries() {
        let session = session();
        assert!(session.claim_and_offer("https://a.example/", 1));
        assert!(session.claim_and_offer("https://b.example/", 2));
        session.take_next();

        assert_eq!(session.request_stop(), 1);
        // Queued entries are kept for draining
        assert_eq!(session.frontier().len(), 1);
        assert_eq!(session.request_stop(), 1);
    }
}
