//! Page fetch strategies
//!
//! This module defines the [`PageFetcher`] capability shared by both fetch
//! strategies, and the static strategy itself:
//! - Building the HTTP client with the configured user agent
//! - A single GET per page, no retries
//! - Classifying timeouts separately from other failures

use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page markup
    Page(String),

    /// The request did not complete in time; no content was retrieved
    TimedOut,

    /// Transport, status, or browser failure
    Failed(String),
}

impl FetchOutcome {
    /// Converts the outcome into the page markup or a crawl error for `url`
    pub fn into_result(self, url: &str) -> crate::Result<String> {
        match self {
            Self::Page(html) => Ok(html),
            Self::TimedOut => Err(crate::ScrapeError::FetchTimeout {
                url: url.to_string(),
            }),
            Self::Failed(message) => Err(crate::ScrapeError::Fetch {
                url: url.to_string(),
                message,
            }),
        }
    }
}

/// Capability to turn a URL into page markup
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`, attempting exactly once
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Builds an HTTP client with proper configuration
///
/// Per-request timeouts are applied by the callers, so the client itself only
/// bounds connection setup.
///
/// # Example
///
/// ```no_run
/// use scrape_lens::config::HttpConfig;
/// use scrape_lens::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.fetch_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with a single HTTP GET
#[derive(Debug, Clone)]
pub struct StaticFetch {
    client: Client,
    timeout: Duration,
}

impl StaticFetch {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl PageFetcher for StaticFetch {
    /// Fetches a URL with a single GET
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | 2xx with readable body | `Page` |
    /// | Timeout (headers or body) | `TimedOut` |
    /// | Non-2xx status | `Failed` |
    /// | Any other transport error | `Failed` |
    async fn fetch(&self, url: &str) -> FetchOutcome {
        tracing::debug!("Static fetch: {}", url);

        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => return classify_error(e),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchOutcome::Failed(format!(
                "HTTP {} for url: {}",
                status,
                response.url()
            ));
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Page(body),
            Err(e) => classify_error(e),
        }
    }
}

/// Maps a transport error onto a fetch outcome
fn classify_error(error: reqwest::Error) -> FetchOutcome {
    if error.is_timeout() {
        FetchOutcome::TimedOut
    } else if error.is_connect() {
        FetchOutcome::Failed(format!("Connection failed: {}", error))
    } else {
        FetchOutcome::Failed(error.to_string())
    }
}
