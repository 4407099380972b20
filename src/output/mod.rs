//! Output module for ranked results and reports
//!
//! This module handles:
//! - Exporting the ranked URL list from the graph store
//! - Graph statistics for the `--stats` view
//! - The markdown ranking report

pub mod markdown;
pub mod stats;

pub use markdown::{format_markdown_report, generate_markdown_report, RankingReport};
pub use stats::{load_statistics, print_statistics, GraphStatistics};

use crate::storage::{GraphStore, RankedNode, StorageError, StorageResult};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while producing output
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type OutputResult<T> = Result<T, OutputError>;

/// Read-side view of the graph store's ranking
#[derive(Clone)]
pub struct ResultExporter {
    store: Arc<dyn GraphStore>,
}

impl ResultExporter {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    /// All known URLs, lowest rank first
    ///
    /// Ties are broken by URL so the order is stable.
    pub fn ranked_urls(&self) -> StorageResult<Vec<String>> {
        Ok(self
            .ranked_pages()?
            .into_iter()
            .map(|node| node.url)
            .collect())
    }

    /// All known nodes with their ranks, in the same order as [`ranked_urls`](Self::ranked_urls)
    pub fn ranked_pages(&self) -> StorageResult<Vec<RankedNode>> {
        self.store.all_nodes_ordered_by_rank(true).map_err(|e| {
            tracing::warn!("Failed to read ranked nodes: {}", e);
            e
        })
    }
}
