//! Ripple-Rank: a depth-bounded link crawler with incremental page ranking
//!
//! This crate crawls outward from a set of seed URLs, records the discovered
//! link graph in a graph store and keeps an approximate importance score per
//! page up to date as edges are inserted.
//!
//! The ranking is a single-pass, insertion-order-dependent approximation of
//! PageRank. It is never iterated to a fixed point.

pub mod config;
pub mod crawler;
pub mod output;
pub mod ranking;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Ripple-Rank operations
#[derive(Debug, Error)]
pub enum RippleError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for Ripple-Rank operations
pub type Result<T> = std::result::Result<T, RippleError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlSettings, CrawlStatus, StartOutcome};
pub use output::ResultExporter;
pub use ranking::RankUpdater;
pub use storage::{GraphStore, SqliteGraphStore};
pub use url::{is_crawlable, PriorityScorer};
