//! Frontier priority heuristic
//!
//! Scores are additive:
//!
//! | Rule | Contribution |
//! |------|--------------|
//! | host matches a preferred domain pattern | `+domain_weight` |
//! | path contains a preferred path segment | `+path_weight` |
//! | shallowness bonus | `+(shallowness_base - path_segment_count)` |
//!
//! Higher scores are dequeued first. The score depends only on the URL string.

use crate::config::PriorityConfig;
use url::Url;

/// Scores URLs for frontier ordering from a configurable rule set
#[derive(Debug, Clone)]
pub struct PriorityScorer {
    preferred_domains: Vec<String>,
    preferred_path_segments: Vec<String>,
    domain_weight: i64,
    path_weight: i64,
    shallowness_base: i64,
}

impl PriorityScorer {
    /// Builds a scorer from the `[priority]` configuration section
    pub fn new(config: &PriorityConfig) -> Self {
        Self {
            preferred_domains: config
                .preferred_domains
                .iter()
                .map(|d| d.to_ascii_lowercase())
                .collect(),
            preferred_path_segments: config.preferred_path_segments.clone(),
            domain_weight: config.domain_weight,
            path_weight: config.path_weight,
            shallowness_base: config.shallowness_base,
        }
    }

    /// Computes the priority score of a URL
    ///
    /// Unparseable URLs only receive the shallowness bonus, counted over the
    /// raw string.
    pub fn score(&self, url: &str) -> i64 {
        let parsed = Url::parse(url).ok();
        let mut score = 0;

        let host = parsed
            .as_ref()
            .and_then(|u| u.host_str())
            .map(|h| h.to_ascii_lowercase());
        if let Some(host) = host {
            if self
                .preferred_domains
                .iter()
                .any(|pattern| host_matches(pattern, &host))
            {
                score += self.domain_weight;
            }
        }

        let path = parsed.as_ref().map(|u| u.path()).unwrap_or(url);
        if self
            .preferred_path_segments
            .iter()
            .any(|segment| path.contains(segment.as_str()))
        {
            score += self.path_weight;
        }

        let segments = match &parsed {
            Some(u) => path_segment_count(u),
            None => url.split('/').filter(|s| !s.is_empty()).count(),
        };
        score + self.shallowness_base - segments as i64
    }
}

impl Default for PriorityScorer {
    fn default() -> Self {
        Self::new(&PriorityConfig::default())
    }
}

/// Checks a lowercase host against a domain pattern
///
/// `"example.com"` matches only that host. `"*.example.com"` matches the bare
/// domain and any subdomain of it, but never `myexample.com`.
pub fn host_matches(pattern: &str, host: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            host == base
                || host
                    .strip_suffix(base)
                    .map_or(false, |prefix| prefix.ends_with('.'))
        }
        None => host == pattern,
    }
}

/// Number of non-empty `/`-delimited components in the URL path
pub fn path_segment_count(url: &Url) -> usize {
    url.path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).count())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> PriorityScorer {
        PriorityScorer::new(&PriorityConfig {
            preferred_domains: vec!["*.museum.org".to_string(), "parks.gov".to_string()],
            preferred_path_segments: vec!["/collections/".to_string()],
            domain_weight: 10,
            path_weight: 5,
            shallowness_base: 10,
        })
    }

    #[test]
    fn test_shallowness_only() {
        let s = scorer();
        assert_eq!(s.score("https://example.org/"), 10);
        assert_eq!(s.score("https://example.org/a"), 9);
        assert_eq!(s.score("https://example.org/a/b/c"), 7);
    }

    #[test]
    fn test_domain_bonus() {
        let s = scorer();
        assert_eq!(s.score("https://museum.org/"), 20);
        assert_eq!(s.score("https://www.museum.org/a"), 19);
        assert_eq!(s.score("https://parks.gov/"), 20);
        // Exact patterns do not cover subdomains
        assert_eq!(s.score("https://www.parks.gov/"), 10);
    }

    #[test]
    fn test_path_bonus() {
        let s = scorer();
        assert_eq!(s.score("https://example.org/collections/x"), 10 + 5 - 2);
    }

    #[test]
    fn test_all_rules_combine() {
        let s = scorer();
        assert_eq!(
            s.score("https://www.museum.org/collections/paintings"),
            10 + 5 + 10 - 2
        );
    }

    #[test]
    fn test_deep_paths_go_negative() {
        let s = scorer();
        let deep = format!("https://example.org/{}", vec!["x"; 14].join("/"));
        assert_eq!(s.score(&deep), -4);
    }

    #[test]
    fn test_unparseable_url_still_scores() {
        let s = scorer();
        assert_eq!(s.score("a/b"), 8);
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let s = scorer();
        let url = "https://www.museum.org/collections/a/b";
        assert_eq!(s.score(url), s.score(url));
    }

    #[test]
    fn test_host_matches() {
        assert!(host_matches("example.com", "example.com"));
        assert!(!host_matches("example.com", "blog.example.com"));

        assert!(host_matches("*.example.com", "example.com"));
        assert!(host_matches("*.example.com", "api.v2.example.com"));
        assert!(!host_matches("*.example.com", "myexample.com"));
        assert!(!host_matches("*.example.com", "example.com.org"));
    }

    #[test]
    fn test_path_segment_count() {
        let url = Url::parse("https://example.org/a//b/").unwrap();
        assert_eq!(path_segment_count(&url), 2);

        let root = Url::parse("https://example.org").unwrap();
        assert_eq!(path_segment_count(&root), 0);
    }
}
