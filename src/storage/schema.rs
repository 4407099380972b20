//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the link graph database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per page seen as a seed or as an edge endpoint
CREATE TABLE IF NOT EXISTS nodes (
    url TEXT PRIMARY KEY,
    rank REAL NOT NULL DEFAULT 0.0
);

CREATE INDEX IF NOT EXISTS idx_nodes_rank ON nodes(rank);

-- Directed hyperlinks between pages
CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_url TEXT NOT NULL REFERENCES nodes(url) ON DELETE CASCADE,
    target_url TEXT NOT NULL REFERENCES nodes(url) ON DELETE CASCADE,
    UNIQUE(source_url, target_url)
);

CREATE INDEX IF NOT EXISTS idx_edges_target ON edges(target_url);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
