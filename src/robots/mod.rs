//! Robots.txt handling module
//!
//! The robots.txt check is informational: its raw text and verdict are
//! reported to the caller, but a crawl is never blocked by it. Any failure to
//! retrieve the file resolves to [`RobotsVerdict::Unknown`], which the caller
//! sees as allowed.

mod parser;

pub use parser::ParsedRobots;

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// User agent token evaluated against robots.txt
pub const ROBOTS_USER_AGENT: &str = "*";

/// Verdict of a robots.txt evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotsVerdict {
    /// robots.txt was retrieved and permits the URL
    Allowed,
    /// robots.txt was retrieved and forbids the URL
    Disallowed,
    /// robots.txt could not be retrieved
    Unknown,
}

impl RobotsVerdict {
    /// Collapses the verdict to the caller-facing boolean (fail-open)
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Disallowed)
    }
}

/// What the robots.txt probe found for a target URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotsReport {
    /// Raw robots.txt body, if it was retrieved
    pub text: Option<String>,

    /// Tri-state verdict for the target URL
    pub verdict: RobotsVerdict,

    /// `Crawl-delay` declared for the wildcard group, in seconds
    pub crawl_delay: Option<f64>,
}

impl RobotsReport {
    /// Evaluates an optional robots.txt body against a target URL
    pub fn evaluate(text: Option<String>, url: &Url) -> Self {
        match text {
            Some(text) => {
                let parsed = ParsedRobots::from_content(&text);
                let verdict = if parsed.is_allowed(url.as_str(), ROBOTS_USER_AGENT) {
                    RobotsVerdict::Allowed
                } else {
                    RobotsVerdict::Disallowed
                };
                let crawl_delay = parsed.crawl_delay(ROBOTS_USER_AGENT);
                Self {
                    text: Some(text),
                    verdict,
                    crawl_delay,
                }
            }
            None => Self {
                text: None,
                verdict: RobotsVerdict::Unknown,
                crawl_delay: None,
            },
        }
    }

    /// Caller-facing allowed flag; unknown counts as allowed
    pub fn allowed(&self) -> bool {
        self.verdict.is_allowed()
    }
}

/// Derives `scheme://host[:port]/robots.txt` for a target URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scrape_lens::robots::robots_url;
///
/// let url = Url::parse("https://example.com/blog/post?id=1").unwrap();
/// assert_eq!(robots_url(&url).unwrap().as_str(), "https://example.com/robots.txt");
/// ```
pub fn robots_url(url: &Url) -> Option<Url> {
    url.host_str()?;
    url.join("/robots.txt").ok()
}

/// Fetches and evaluates robots.txt, never failing
#[derive(Debug, Clone)]
pub struct RobotsGate {
    client: Client,
    timeout: Duration,
}

impl RobotsGate {
    /// Creates a gate that shares the crawl's HTTP client
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Fetches the raw robots.txt body for the target URL's site
    ///
    /// # Returns
    ///
    /// * `Some(String)` - The body, when the server answered with a 2xx status
    /// * `None` - On any other status or transport error
    pub async fn fetch_robots_text(&self, url: &Url) -> Option<String> {
        let robots = robots_url(url)?;
        tracing::debug!("Fetching robots.txt from {}", robots);

        let response = match self
            .client
            .get(robots.as_str())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("robots.txt unavailable at {}: {}", robots, e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(
                "robots.txt at {} answered HTTP {}",
                robots,
                response.status()
            );
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::debug!("Failed to read robots.txt body from {}: {}", robots, e);
                None
            }
        }
    }

    /// Fetches robots.txt and evaluates the target URL against it
    pub async fn check(&self, url: &Url) -> RobotsReport {
        let text = self.fetch_robots_text(url).await;
        let report = RobotsReport::evaluate(text, url);

        tracing::info!("robots.txt verdict for {}: {:?}", url, report.verdict);
        report
    }

    /// Returns true unless robots.txt was retrieved and disallows the URL
    pub async fn is_allowed(&self, url: &Url) -> bool {
        self.check(url).await.allowed()
    }
}
