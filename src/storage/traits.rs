//! Graph store trait and error types
//!
//! This module defines the query contract the crawl core relies on. The core
//! never locks around these calls; implementations serialize concurrent
//! writes themselves.

use thiserror::Error;

/// Errors that can occur during graph store operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Graph store lock poisoned")]
    LockPoisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A page node as seen through the store's aggregate queries
#[derive(Debug, Clone, PartialEq)]
pub struct RankedNode {
    pub url: String,
    pub rank: f64,
}

/// Trait for link graph backends
///
/// Nodes are keyed by URL and carry a rank that defaults to `0.0`. Edges are
/// directed and deduplicated: inserting an existing edge is a no-op.
pub trait GraphStore: Send + Sync {
    /// Creates the node if needed and sets its rank to `initial_rank`
    fn upsert_node(&self, url: &str, initial_rank: f64) -> StorageResult<()>;

    /// Records `source -> target`, creating missing endpoint nodes at the default rank
    fn upsert_edge(&self, source_url: &str, target_url: &str) -> StorageResult<()>;

    /// Returns every node with an edge into `url`, together with its current rank
    fn in_neighbors(&self, url: &str) -> StorageResult<Vec<RankedNode>>;

    /// Overwrites the rank of an existing node
    fn set_rank(&self, url: &str, rank: f64) -> StorageResult<()>;

    /// Returns all nodes ordered by rank; ties are broken by URL
    fn all_nodes_ordered_by_rank(&self, ascending: bool) -> StorageResult<Vec<RankedNode>>;

    /// Removes all nodes and edges
    fn clear_all(&self) -> StorageResult<()>;

    /// Gets the rank of a single node, if present
    fn node_rank(&self, url: &str) -> StorageResult<Option<f64>>;

    /// Gets total node count
    fn node_count(&self) -> StorageResult<u64>;

    /// Gets total edge count
    fn edge_count(&self) -> StorageResult<u64>;
}
