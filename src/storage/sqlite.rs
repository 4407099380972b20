//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the GraphStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{GraphStore, RankedNode, StorageError, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite graph backend
///
/// The connection sits behind a mutex, so every operation is serialized and
/// the store can be shared across worker tasks as `Arc<dyn GraphStore>`.
pub struct SqliteGraphStore {
    conn: Mutex<Connection>,
}

impl SqliteGraphStore {
    /// Opens (or creates) a graph database at the given path
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory graph database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

fn ranked_node(row: &rusqlite::Row<'_>) -> rusqlite::Result<RankedNode> {
    Ok(RankedNode {
        url: row.get(0)?,
        rank: row.get(1)?,
    })
}

impl GraphStore for SqliteGraphStore {
    fn upsert_node(&self, url: &str, initial_rank: f64) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO nodes (url, rank) VALUES (?1, ?2)
             ON CONFLICT(url) DO UPDATE SET rank = excluded.rank",
            params![url, initial_rank],
        )?;
        Ok(())
    }

    fn upsert_edge(&self, source_url: &str, target_url: &str) -> StorageResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT OR IGNORE INTO nodes (url) VALUES (?1)",
            params![source_url],
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO nodes (url) VALUES (?1)",
            params![target_url],
        )?;
        tx.execute(
            "INSERT OR IGNORE INTO edges (source_url, target_url) VALUES (?1, ?2)",
            params![source_url, target_url],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn in_neighbors(&self, url: &str) -> StorageResult<Vec<RankedNode>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT n.url, n.rank FROM edges e
             JOIN nodes n ON n.url = e.source_url
             WHERE e.target_url = ?1
             ORDER BY e.id",
        )?;

        let nodes = stmt
            .query_map(params![url], ranked_node)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(nodes)
    }

    fn set_rank(&self, url: &str, rank: f64) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE nodes SET rank = ?1 WHERE url = ?2",
            params![rank, url],
        )?;
        Ok(())
    }

    fn all_nodes_ordered_by_rank(&self, ascending: bool) -> StorageResult<Vec<RankedNode>> {
        let query = if ascending {
            "SELECT url, rank FROM nodes ORDER BY rank ASC, url ASC"
        } else {
            "SELECT url, rank FROM nodes ORDER BY rank DESC, url ASC"
        };

        let conn = self.lock()?;
        let mut stmt = conn.prepare(query)?;
        let nodes = stmt
            .query_map([], ranked_node)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(nodes)
    }

    fn clear_all(&self) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            DELETE FROM edges;
            DELETE FROM nodes;
        ",
        )?;
        Ok(())
    }

    fn node_rank(&self, url: &str) -> StorageResult<Option<f64>> {
        let conn = self.lock()?;
        let rank = conn
            .query_row(
                "SELECT rank FROM nodes WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(rank)
    }

    fn node_count(&self) -> StorageResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn edge_count(&self) -> StorageResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
