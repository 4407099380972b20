use serde::Deserialize;

/// Main configuration structure for Ripple-Rank
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub priority: PriorityConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seed URLs the crawl starts from (entered at depth 1)
    #[serde(default)]
    pub seeds: Vec<String>,

    /// Entries at or beyond this depth are never fetched
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of concurrently running fetch tasks (defaults to available parallelism)
    #[serde(default)]
    pub workers: Option<usize>,

    /// Per-page fetch timeout in seconds
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Wall-clock limit after which the session is soft-stopped
    #[serde(rename = "session-timeout-secs", default)]
    pub session_timeout_secs: Option<u64>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Rule set for the frontier priority heuristic
#[derive(Debug, Clone, Deserialize)]
pub struct PriorityConfig {
    /// Host patterns (e.g., "example.com" or "*.example.com") that earn the domain bonus
    #[serde(rename = "preferred-domains", default = "default_preferred_domains")]
    pub preferred_domains: Vec<String>,

    /// Path fragments that earn the path bonus when contained in the URL path
    #[serde(
        rename = "preferred-path-segments",
        default = "default_preferred_path_segments"
    )]
    pub preferred_path_segments: Vec<String>,

    #[serde(rename = "domain-weight", default = "default_domain_weight")]
    pub domain_weight: i64,

    #[serde(rename = "path-weight", default = "default_path_weight")]
    pub path_weight: i64,

    /// Constant K in the `K - path_segment_count` shallowness bonus
    #[serde(rename = "shallowness-base", default = "default_shallowness_base")]
    pub shallowness_base: i64,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            preferred_domains: default_preferred_domains(),
            preferred_path_segments: default_preferred_path_segments(),
            domain_weight: default_domain_weight(),
            path_weight: default_path_weight(),
            shallowness_base: default_shallowness_base(),
        }
    }
}

/// Rank update configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    #[serde(rename = "damping-factor", default = "default_damping_factor")]
    pub damping_factor: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            damping_factor: default_damping_factor(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite graph database
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown ranking report
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

fn default_max_depth() -> u32 {
    3
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_preferred_domains() -> Vec<String> {
    vec![
        "*.metmuseum.org".to_string(),
        "*.nps.gov".to_string(),
        "*.mfa.org".to_string(),
    ]
}

fn default_preferred_path_segments() -> Vec<String> {
    vec!["/exhibitions/".to_string(), "/collections/".to_string()]
}

fn default_domain_weight() -> i64 {
    10
}

fn default_path_weight() -> i64 {
    5
}

fn default_shallowness_base() -> i64 {
    10
}

fn default_damping_factor() -> f64 {
    0.85
}
