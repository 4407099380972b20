//! Crawler module: frontier, session state, dispatch and fetching
//!
//! This module contains the core crawling logic, including:
//! - The priority-ordered frontier and the per-session visited set
//! - The coordinator that admits at most `workers` concurrent fetch tasks
//!   and detects quiescence
//! - The page fetcher contract and its HTTP implementation
//! - HTML link extraction

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod session;

pub use coordinator::{
    default_workers, Coordinator, CrawlSettings, CrawlStatus, StartOutcome, SEED_DEPTH, SEED_RANK,
};
pub use fetcher::{
    build_http_client, user_agent_string, FetchError, HttpFetcher, PageFetcher, MAX_REDIRECTS,
};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::extract_links;
pub use session::{CrawlSession, TaskGuard, VisitedSet};
