//! Page fetching
//!
//! The crawl core only sees the [`PageFetcher`] trait: given a URL it returns
//! the page's outbound links, or a [`FetchError`]. [`HttpFetcher`] is the
//! production implementation on top of reqwest and the HTML link extractor.

use crate::config::UserAgentConfig;
use crate::crawler::parser::extract_links;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed for a single page
pub const MAX_REDIRECTS: usize = 10;

/// A single page could not be fetched or read
///
/// Always per-URL and never fatal to a session.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} is not HTML (Content-Type: {content_type})")]
    ContentMismatch { url: String, content_type: String },
}

impl FetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            FetchError::Http { url, .. }
            | FetchError::Timeout { url }
            | FetchError::Status { url, .. }
            | FetchError::ContentMismatch { url, .. } => url,
        }
    }
}

/// Source of outbound links for the crawl
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns its absolute outbound links in document order
    ///
    /// Implementations must give up after `timeout`.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<String>, FetchError>;
}

/// Formats the crawler's user agent: `Name/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use ripple_rank::config::UserAgentConfig;
/// use ripple_rank::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "RippleRank".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] over HTTP(S)
///
/// Issues one GET per page and follows redirects. Links in the body are
/// resolved against the final URL after redirects.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    fn classify(url: &str, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Http {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<Vec<String>, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.to_ascii_lowercase().contains("text/html") {
            return Err(FetchError::ContentMismatch {
                url: url.to_string(),
                content_type,
            });
        }

        let final_url: Url = response.url().clone();
        let body = response.text().await.map_err(|e| Self::classify(url, e))?;

        let links = extract_links(&body, &final_url);
        tracing::debug!("Fetched {} ({} links)", url, links.len());
        Ok(links)
    }
}
