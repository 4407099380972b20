//! Incremental rank maintenance
//!
//! Ranks are refreshed one node at a time as inbound edges are discovered:
//!
//! ```text
//! rank(url) = (1 - d) + d * sum(rank(n) for n in in_neighbors(url))
//! ```
//!
//! This is a single-pass approximation of PageRank. The result depends on the
//! order in which edges are inserted, it is never iterated to a fixed point,
//! and it does not divide by out-degree. Ranks of pages that link to a node
//! are read as they are at the moment of the update.

mod updater;

pub use updater::{RankUpdater, DEFAULT_DAMPING_FACTOR};
