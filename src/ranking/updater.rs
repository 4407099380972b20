use crate::storage::GraphStore;
use std::sync::Arc;

pub const DEFAULT_DAMPING_FACTOR: f64 = 0.85;

/// Recomputes a page's rank from its current in-neighbors
///
/// Concurrent updates for the same URL are not coordinated; the last write to
/// the store wins.
#[derive(Clone)]
pub struct RankUpdater {
    store: Arc<dyn GraphStore>,
    damping: f64,
}

impl RankUpdater {
    pub fn new(store: Arc<dyn GraphStore>, damping: f64) -> Self {
        Self { store, damping }
    }

    /// Recomputes and stores the rank of `url`
    ///
    /// Store failures are logged and turn the call into a no-op; the node
    /// keeps its previous rank until a later update succeeds.
    ///
    /// # Returns
    ///
    /// * `Some(rank)` - The rank that was written
    /// * `None` - Reading in-neighbors or writing the rank failed
    pub fn update_rank(&self, url: &str) -> Option<f64> {
        let neighbors = match self.store.in_neighbors(url) {
            Ok(neighbors) => neighbors,
            Err(e) => {
                tracing::warn!("Failed to read in-neighbors of {}: {}", url, e);
                return None;
            }
        };

        let inbound: f64 = neighbors.iter().map(|n| n.rank).sum();
        let rank = self.compute(inbound);

        if let Err(e) = self.store.set_rank(url, rank) {
            tracing::warn!("Failed to store rank for {}: {}", url, e);
            return None;
        }

        tracing::trace!(
            "Rank for {} is {:.6} ({} in-neighbors)",
            url,
            rank,
            neighbors.len()
        );
        Some(rank)
    }

    /// Applies the damping formula to a sum of in-neighbor ranks
    pub fn compute(&self, inbound_sum: f64) -> f64 {
        (1.0 - self.damping) + self.damping * inbound_sum
    }
}
