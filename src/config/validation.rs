use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, PriorityConfig, RankingConfig, UserAgentConfig,
};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Upper bound on the admission gate size
const MAX_WORKERS: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_priority_config(&config.priority)?;
    validate_ranking_config(&config.ranking)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if let Some(workers) = config.workers {
        if workers < 1 || workers > MAX_WORKERS {
            return Err(ConfigError::Validation(format!(
                "workers must be between 1 and {}, got {}",
                MAX_WORKERS, workers
            )));
        }
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "fetch_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.session_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "session_timeout_secs must be >= 1 when set".to_string(),
        ));
    }

    for seed in &config.seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use the http or https scheme",
                seed
            )));
        }
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_priority_config(config: &PriorityConfig) -> ConfigResult<()> {
    for pattern in &config.preferred_domains {
        validate_domain_pattern(pattern)?;
    }

    if config.preferred_path_segments.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::Validation(
            "preferred_path_segments cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

fn validate_ranking_config(config: &RankingConfig) -> ConfigResult<()> {
    let d = config.damping_factor;
    if !(d > 0.0 && d < 1.0) {
        return Err(ConfigError::Validation(format!(
            "damping_factor must be strictly between 0 and 1, got {}",
            d
        )));
    }
    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> ConfigResult<()> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    match pattern.strip_prefix("*.") {
        Some(domain) => validate_domain_string(domain),
        None => validate_domain_string(pattern),
    }
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> ConfigResult<()> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> ConfigResult<()> {
    let invalid = || ConfigError::Validation(format!("Invalid email format: '{}'", email));

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(invalid());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> Config {
        Config {
            crawler: CrawlerConfig {
                seeds: vec!["https://example.org/".to_string()],
                max_depth: 3,
                workers: Some(4),
                fetch_timeout_secs: 10,
                session_timeout_secs: None,
            },
            user_agent: UserAgentConfig {
                crawler_name: "TestCrawler".to_string(),
                crawler_version: "1.0".to_string(),
                contact_url: "https://example.com/about".to_string(),
                contact_email: "admin@example.com".to_string(),
            },
            priority: PriorityConfig::default(),
            ranking: RankingConfig::default(),
            output: OutputConfig {
                database_path: "./test.db".to_string(),
                summary_path: "./ranking.md".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&create_test_config()).is_ok());
    }

    #[test]
    fn test_rejects_non_http_seed() {
        let mut config = create_test_config();
        config.crawler.seeds = vec!["ftp://example.org/file".to_string()];
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_unparseable_seed() {
        let mut config = create_test_config();
        config.crawler.seeds = vec!["not a url".to_string()];
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_rejects_out_of_range_workers() {
        let mut config = create_test_config();
        config.crawler.workers = Some(0);
        assert!(validate(&config).is_err());

        config.crawler.workers = Some(MAX_WORKERS + 1);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_bad_damping_factor() {
        let mut config = create_test_config();
        config.ranking.damping_factor = 1.0;
        assert!(validate(&config).is_err());

        config.ranking.damping_factor = 0.0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_bad_preferred_domain() {
        let mut config = create_test_config();
        config.priority.preferred_domains = vec!["example".to_string()];
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_validate_domain_pattern() {
        assert!(validate_domain_pattern("example.com").is_ok());
        assert!(validate_domain_pattern("*.example.com").is_ok());
        assert!(validate_domain_pattern("sub.example.com").is_ok());

        assert!(validate_domain_pattern("").is_err());
        assert!(validate_domain_pattern("*.").is_err());
        assert!(validate_domain_pattern("example").is_err());
        assert!(validate_domain_pattern(".example.com").is_err());
        assert!(validate_domain_pattern("example.com.").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
        assert!(validate_email("a@b@example.com").is_err());
    }
}
