//! URL handling module for Ripple-Rank
//!
//! This module decides which discovered links are eligible for the crawl and
//! how urgently they should be fetched:
//! - `is_crawlable` / `passes_link_rules`: the link filter applied to every
//!   outbound link before it touches the graph or the frontier
//! - `PriorityScorer`: the additive heuristic that orders the frontier

mod priority;

pub use priority::{host_matches, path_segment_count, PriorityScorer};

use crate::crawler::VisitedSet;
use url::Url;

/// Checks whether a discovered link may enter the crawl
///
/// A link is rejected when it:
/// - is empty
/// - contains a `javascript:` pseudo-scheme anywhere, or starts with `tel:`
/// - does not parse, or its scheme is neither `http` nor `https`
/// - points at a `.onion` host
/// - is already present in the session's visited set
///
/// The check reads `visited` but never mutates it. Claiming a URL for the
/// frontier is done separately through [`VisitedSet::insert`], which is the
/// only atomic dedup point.
///
/// # Examples
///
/// ```
/// use ripple_rank::crawler::VisitedSet;
/// use ripple_rank::url::is_crawlable;
///
/// let visited = VisitedSet::new();
/// assert!(is_crawlable("https://example.org/a", &visited));
/// assert!(!is_crawlable("javascript:void(0)", &visited));
/// assert!(!is_crawlable("http://x.onion/a", &visited));
///
/// visited.insert("https://example.org/a");
/// assert!(!is_crawlable("https://example.org/a", &visited));
/// ```
pub fn is_crawlable(url: &str, visited: &VisitedSet) -> bool {
    passes_link_rules(url) && !visited.contains(url)
}

/// The stateless part of [`is_crawlable`]
pub fn passes_link_rules(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    let lowered = url.to_ascii_lowercase();
    if lowered.contains("javascript:") || lowered.starts_with("tel:") {
        return false;
    }

    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }

    match parsed.host_str() {
        Some(host) => !is_onion_host(host),
        None => false,
    }
}

fn is_onion_host(host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    host == "onion" || host.ends_with(".onion")
}
