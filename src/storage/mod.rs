//! Storage module for the link graph
//!
//! This module holds the graph store contract used by the crawl core and its
//! SQLite implementation:
//! - Node upsert with an explicit rank (seeds start at 1.0)
//! - Deduplicated directed edge insertion
//! - In-neighbor and rank-ordered aggregate queries

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteGraphStore;
pub use traits::{GraphStore, RankedNode, StorageError, StorageResult};

use std::path::Path;

/// Opens a file-backed graph store
pub fn open_storage(path: &Path) -> StorageResult<SqliteGraphStore> {
    SqliteGraphStore::new(path)
}
