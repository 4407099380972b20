//! Statistics over the stored link graph
//!
//! This module provides functionality for extracting and displaying
//! summary numbers from the graph store.

use crate::storage::{GraphStore, StorageResult};

/// Graph statistics summary
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphStatistics {
    pub node_count: u64,
    pub edge_count: u64,
    /// `None` when the graph is empty
    pub lowest_rank: Option<f64>,
    pub highest_rank: Option<f64>,
}

impl GraphStatistics {
    /// Average number of recorded outbound edges per node
    pub fn mean_out_degree(&self) -> f64 {
        if self.node_count == 0 {
            0.0
        } else {
            self.edge_count as f64 / self.node_count as f64
        }
    }
}

/// Loads statistics from the graph store
pub fn load_statistics(store: &dyn GraphStore) -> StorageResult<GraphStatistics> {
    let node_count = store.node_count()?;
    let edge_count = store.edge_count()?;

    let nodes = store.all_nodes_ordered_by_rank(true)?;
    let lowest_rank = nodes.first().map(|n| n.rank);
    let highest_rank = nodes.last().map(|n| n.rank);

    Ok(GraphStatistics {
        node_count,
        edge_count,
        lowest_rank,
        highest_rank,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &GraphStatistics) {
    println!("=== Graph Statistics ===\n");

    println!("Overview:");
    println!("  Pages (nodes): {}", stats.node_count);
    println!("  Links (edges): {}", stats.edge_count);
    println!("  Mean out-degree: {:.2}", stats.mean_out_degree());
    println!();

    match (stats.lowest_rank, stats.highest_rank) {
        (Some(low), Some(high)) => {
            println!("Rank Range:");
            println!("  Lowest:  {:.6}", low);
            println!("  Highest: {:.6}", high);
        }
        _ => println!("The graph is empty."),
    }
}
