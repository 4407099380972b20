//! Crawl coordinator - session lifecycle and bounded dispatch
//!
//! A [`Coordinator`] owns at most one running [`CrawlSession`]. Starting a
//! session seeds the frontier and spawns a dispatch loop on the Tokio runtime;
//! the loop hands frontier entries to worker tasks through a counting
//! semaphore and ends the session once nothing is queued and no task is in
//! flight.

use crate::config::{Config, PriorityConfig};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::frontier::FrontierEntry;
use crate::crawler::session::CrawlSession;
use crate::output::ResultExporter;
use crate::ranking::{RankUpdater, DEFAULT_DAMPING_FACTOR};
use crate::storage::{GraphStore, RankedNode, StorageResult};
use crate::url::{is_crawlable, PriorityScorer};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;

/// Rank given to seed nodes when a session starts
pub const SEED_RANK: f64 = 1.0;

/// Depth assigned to seed entries
pub const SEED_DEPTH: u32 = 1;

/// Tunables for a coordinator, fixed for its lifetime
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Maximum number of concurrently running fetch tasks
    pub workers: usize,
    pub fetch_timeout: Duration,
    /// Soft-stop the session after this much wall-clock time
    pub session_timeout: Option<Duration>,
    pub damping_factor: f64,
    pub priority: PriorityConfig,
}

impl CrawlSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.crawler.workers.unwrap_or_else(default_workers),
            fetch_timeout: Duration::from_secs(config.crawler.fetch_timeout_secs),
            session_timeout: config.crawler.session_timeout_secs.map(Duration::from_secs),
            damping_factor: config.ranking.damping_factor,
            priority: config.priority.clone(),
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            fetch_timeout: Duration::from_secs(10),
            session_timeout: None,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            priority: PriorityConfig::default(),
        }
    }
}

/// Available hardware parallelism, or 1 if it cannot be determined
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Result of a [`Coordinator::start`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A session was already running and was left untouched
    AlreadyRunning,
}

/// Point-in-time view of the coordinator
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlStatus {
    pub running: bool,
    pub max_depth: Option<u32>,
    pub started_at: Option<DateTime<Utc>>,
    pub frontier_len: usize,
    pub visited: usize,
    pub outstanding: usize,
    pub pages_fetched: u64,
    pub fetch_failures: u64,
    pub links_recorded: u64,
}

enum SessionState {
    /// Holds the final snapshot of the previous session, if any
    Idle(Option<CrawlStatus>),
    Running(Arc<CrawlSession>),
}

fn snapshot(session: &CrawlSession, running: bool) -> CrawlStatus {
    CrawlStatus {
        running,
        max_depth: Some(session.max_depth),
        started_at: Some(session.started_at),
        frontier_len: session.frontier().len(),
        visited: session.visited().len(),
        outstanding: session.outstanding(),
        pages_fetched: session.pages_fetched(),
        fetch_failures: session.fetch_failures(),
        links_recorded: session.links_recorded(),
    }
}

struct Shared {
    settings: CrawlSettings,
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn GraphStore>,
    ranker: RankUpdater,
    scorer: Arc<PriorityScorer>,
    exporter: ResultExporter,
    state: watch::Sender<SessionState>,
}

/// Main crawler coordinator structure
///
/// Cloning is cheap; clones control the same session.
#[derive(Clone)]
pub struct Coordinator {
    shared: Arc<Shared>,
}

impl Coordinator {
    pub fn new(
        settings: CrawlSettings,
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn GraphStore>,
    ) -> Self {
        let ranker = RankUpdater::new(store.clone(), settings.damping_factor);
        let scorer = Arc::new(PriorityScorer::new(&settings.priority));
        let exporter = ResultExporter::new(store.clone());
        let (state, _) = watch::channel(SessionState::Idle(None));

        Self {
            shared: Arc::new(Shared {
                settings,
                fetcher,
                store,
                ranker,
                scorer,
                exporter,
                state,
            }),
        }
    }

    /// Starts a crawl session from `urls` unless one is already running
    ///
    /// Returns as soon as the seeds are queued; the crawl itself runs on the
    /// current Tokio runtime. Seeds are trimmed, and empty or repeated seeds
    /// are skipped. The graph store is cleared first, so it only ever
    /// describes the latest session.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start<I, S>(&self, urls: I, max_depth: u32) -> StartOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let session = Arc::new(CrawlSession::new(max_depth, self.shared.scorer.clone()));

        let claimed = self.shared.state.send_if_modified(|state| {
            if matches!(state, SessionState::Running(_)) {
                return false;
            }
            *state = SessionState::Running(session.clone());
            true
        });
        if !claimed {
            tracing::info!("Crawl session already running, start request ignored");
            return StartOutcome::AlreadyRunning;
        }

        if let Err(e) = self.shared.store.clear_all() {
            tracing::warn!("Failed to clear graph store: {}", e);
        }

        let mut seeds = 0;
        for url in urls {
            let url = url.as_ref().trim();
            if url.is_empty() || !session.claim_and_offer(url, SEED_DEPTH) {
                continue;
            }
            if let Err(e) = self.shared.store.upsert_node(url, SEED_RANK) {
                tracing::warn!("Failed to store seed {}: {}", url, e);
            }
            seeds += 1;
        }

        tracing::info!(
            "Starting crawl session: {} seeds, max depth {}, {} workers",
            seeds,
            max_depth,
            self.shared.settings.workers
        );

        let shared = self.shared.clone();
        tokio::spawn(run_session(shared, session));

        StartOutcome::Started
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.shared.state.borrow(), SessionState::Running(_))
    }

    /// Requests a soft stop of the running session
    ///
    /// In-flight fetches finish, but the links they return are no longer
    /// recorded or queued. Returns `false` if no session is running.
    pub fn stop(&self) -> bool {
        match &*self.shared.state.borrow() {
            SessionState::Running(session) => {
                let queued = session.request_stop();
                tracing::debug!("Stop requested with {} entries still queued", queued);
                true
            }
            SessionState::Idle(_) => false,
        }
    }

    /// Resolves once no session is running
    pub async fn wait_until_idle(&self) {
        let mut rx = self.shared.state.subscribe();
        // The sender lives as long as `self`, so this only returns on Idle
        let _ = rx
            .wait_for(|state| matches!(state, SessionState::Idle(_)))
            .await;
    }

    /// Snapshot of the running session, or of the last finished one when idle
    pub fn status(&self) -> CrawlStatus {
        match &*self.shared.state.borrow() {
            SessionState::Idle(last) => last.clone().unwrap_or_default(),
            SessionState::Running(session) => snapshot(session, true),
        }
    }

    /// All known URLs ordered by ascending rank
    pub fn ranked_urls(&self) -> StorageResult<Vec<String>> {
        self.shared.exporter.ranked_urls()
    }

    /// All known nodes with their ranks, ordered by ascending rank
    pub fn ranked_pages(&self) -> StorageResult<Vec<RankedNode>> {
        self.shared.exporter.ranked_pages()
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.shared.settings
    }
}

/// Dispatch loop for one session
///
/// Runs until the frontier is empty and every admitted task has finished,
/// then returns the coordinator to idle.
async fn run_session(shared: Arc<Shared>, session: Arc<CrawlSession>) {
    let gate = Arc::new(Semaphore::new(shared.settings.workers.max(1)));
    let timer = shared
        .settings
        .session_timeout
        .map(|limit| spawn_session_timer(session.clone(), limit));

    loop {
        let Some(entry) = session.take_next() else {
            if session.is_quiescent() {
                break;
            }
            session.wait_for_progress().await;
            continue;
        };

        let guard = session.begin_task();
        let permit = match gate.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                tracing::error!("Worker gate closed: {}", e);
                break;
            }
        };

        let shared = shared.clone();
        let task_session = session.clone();
        tokio::spawn(async move {
            let _permit = permit;
            let _guard = guard;
            process_entry(&shared, &task_session, entry).await;
        });
    }

    if let Some(timer) = timer {
        timer.abort();
    }

    tracing::info!(
        "Crawl session finished: {} pages fetched, {} failed, {} links recorded, {} URLs visited in {:.1}s",
        session.pages_fetched(),
        session.fetch_failures(),
        session.links_recorded(),
        session.visited().len(),
        session.elapsed().as_secs_f64()
    );

    shared.state.send_if_modified(|state| {
        let current =
            matches!(state, SessionState::Running(running) if Arc::ptr_eq(running, &session));
        if current {
            *state = SessionState::Idle(Some(snapshot(&session, false)));
        }
        current
    });
}

fn spawn_session_timer(session: Arc<CrawlSession>, limit: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(limit).await;
        tracing::info!("Session timeout of {:?} reached", limit);
        session.request_stop();
    })
}

/// Fetches one frontier entry and records what it links to
async fn process_entry(shared: &Shared, session: &CrawlSession, entry: FrontierEntry) {
    if entry.depth >= session.max_depth {
        tracing::trace!("Depth limit reached at {} (depth {})", entry.url, entry.depth);
        return;
    }

    // Claimed when offered; this only matters for entries queued some other way
    session.visited().insert(&entry.url);

    let links = match shared
        .fetcher
        .fetch(&entry.url, shared.settings.fetch_timeout)
        .await
    {
        Ok(links) => {
            session.record_fetch();
            links
        }
        Err(e) => {
            session.record_fetch_failure();
            tracing::warn!("Fetch failed: {}", e);
            return;
        }
    };

    tracing::debug!(
        "Processing {} links from {} (depth {})",
        links.len(),
        entry.url,
        entry.depth
    );

    for link in links {
        if session.is_stop_requested() {
            tracing::debug!("Stop requested, discarding remaining links of {}", entry.url);
            break;
        }

        if !is_crawlable(&link, session.visited()) {
            tracing::trace!("Rejected link {}", link);
            continue;
        }

        match shared.store.upsert_edge(&entry.url, &link) {
            Ok(()) => session.record_link(),
            Err(e) => tracing::warn!("Failed to store edge {} -> {}: {}", entry.url, link, e),
        }

        shared.ranker.update_rank(&link);
        session.claim_and_offer(&link, entry.depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, OutputConfig, RankingConfig, UserAgentConfig};
    use crate::crawler::FetchError;
    use crate::storage::SqliteGraphStore;
    use async_trait::async_trait;

    struct NoLinks;

    #[async_trait]
    impl PageFetcher for NoLinks {
        async fn fetch(&self, _url: &str, _timeout: Duration) -> Result<Vec<String>, FetchError> {
            Ok(Vec::new())
        }
    }

    fn create_test_config() -> Config {
        Config {
            crawler: CrawlerConfig {
                seeds: vec!["https://example.com/".to_string()],
                max_depth: 2,
                workers: Some(3),
                fetch_timeout_secs: 7,
                session_timeout_secs: Some(60),
            },
            user_agent: UserAgentConfig {
                crawler_name: "TestCrawler".to_string(),
                crawler_version: "1.0".to_string(),
                contact_url: "https://example.com/about".to_string(),
                contact_email: "admin@example.com".to_string(),
            },
            priority: PriorityConfig::default(),
            ranking: RankingConfig {
                damping_factor: 0.5,
            },
            output: OutputConfig {
                database_path: "./test.db".to_string(),
                summary_path: "./summary.md".to_string(),
            },
        }
    }

    fn coordinator() -> Coordinator {
        let store = Arc::new(SqliteGraphStore::open_in_memory().unwrap());
        Coordinator::new(CrawlSettings::default(), Arc::new(NoLinks), store)
    }

    #[test]
    fn test_settings_from_config() {
        let settings = CrawlSettings::from_config(&create_test_config());
        assert_eq!(settings.workers, 3);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(7));
        assert_eq!(settings.session_timeout, Some(Duration::from_secs(60)));
        assert_eq!(settings.damping_factor, 0.5);
    }

    #[test]
    fn test_default_workers_is_positive() {
        assert!(default_workers() >= 1);
        assert_eq!(CrawlSettings::default().workers, default_workers());
    }

    #[test]
    fn test_idle_coordinator() {
        let coordinator = coordinator();
        assert!(!coordinator.is_running());
        assert!(!coordinator.stop());

        let status = coordinator.status();
        assert!(!status.running);
        assert_eq!(status.max_depth, None);
        assert_eq!(status.started_at, None);
    }

    #[tokio::test]
    async fn test_session_returns_to_idle() {
        let coordinator = coordinator();
        assert_eq!(
            coordinator.start(["https://example.com/"], 3),
            StartOutcome::Started
        );

        tokio::time::timeout(Duration::from_secs(5), coordinator.wait_until_idle())
            .await
            .expect("session should finish");
        assert!(!coordinator.is_running());

        let status = coordinator.status();
        assert!(!status.running);
        assert_eq!(status.max_depth, Some(3));
        assert_eq!(status.pages_fetched, 1);
        assert_eq!(status.outstanding, 0);
        assert_eq!(
            coordinator.ranked_urls().unwrap(),
            vec!["https://example.com/".to_string()]
        );
    }

    #[tokio::test]
    async fn test_blank_and_repeated_seeds_are_skipped() {
        let coordinator = coordinator();
        coordinator.start(
            ["  https://example.com/  ", "", "   ", "https://example.com/"],
            1,
        );
        coordinator.wait_until_idle().await;

        let pages = coordinator.ranked_pages().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].url, "https://example.com/");
        assert_eq!(pages[0].rank, SEED_RANK);
    }

    #[tokio::test]
    async fn test_start_without_seeds_finishes() {
        let coordinator = coordinator();
        coordinator.start(Vec::<String>::new(), 3);
        tokio::time::timeout(Duration::from_secs(5), coordinator.wait_until_idle())
            .await
            .expect("empty session should finish");
        assert!(coordinator.ranked_urls().unwrap().is_empty());
    }
}
