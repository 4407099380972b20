//! Crawl frontier
//!
//! A thread-safe priority queue of `(url, depth)` entries. Entries are ordered
//! by descending priority score; equal scores come out in insertion order.
//!
//! The frontier does not deduplicate. Callers claim a URL in the session's
//! visited set before offering it, so each URL is offered at most once.

use crate::url::PriorityScorer;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex, MutexGuard};

/// A discovered URL waiting to be processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: String,
    /// Seeds are at depth 1
    pub depth: u32,
}

impl FrontierEntry {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

#[derive(Debug)]
struct QueuedEntry {
    entry: FrontierEntry,
    score: i64,
    seq: u64,
}

// BinaryHeap is a max-heap: higher score first, then lower sequence number
impl Ord for QueuedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .cmp(&other.score)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.seq == other.seq
    }
}

impl Eq for QueuedEntry {}

#[derive(Debug, Default)]
struct FrontierInner {
    heap: BinaryHeap<QueuedEntry>,
    next_seq: u64,
}

/// Priority queue shared by the dispatcher and all worker tasks
pub struct Frontier {
    scorer: Arc<PriorityScorer>,
    inner: Mutex<FrontierInner>,
}

impl Frontier {
    pub fn new(scorer: Arc<PriorityScorer>) -> Self {
        Self {
            scorer,
            inner: Mutex::new(FrontierInner::default()),
        }
    }

    // The lock is never held across a call that can panic, so a poisoned
    // guard still holds a consistent heap.
    fn lock(&self) -> MutexGuard<'_, FrontierInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds an entry, scoring it outside the lock
    pub fn offer(&self, entry: FrontierEntry) {
        let score = self.scorer.score(&entry.url);
        let mut inner = self.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.heap.push(QueuedEntry { entry, score, seq });
    }

    /// Removes the highest-priority entry, or returns `None` immediately if empty
    pub fn take_next(&self) -> Option<FrontierEntry> {
        self.lock().heap.pop().map(|queued| queued.entry)
    }

    pub fn len(&self) -> usize {
        self.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().heap.is_empty()
    }
}
