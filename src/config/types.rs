use serde::Deserialize;
use std::time::Duration;

/// Desktop Chrome user agent presented by the rendered fetch strategy
pub const DEFAULT_BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

/// User agent sent by the static fetch strategy and the robots.txt probe
pub const DEFAULT_HTTP_USER_AGENT: &str =
    concat!("scrape-lens/", env!("CARGO_PKG_VERSION"));

/// Main configuration structure for Scrape-Lens
///
/// Every section and key is optional; an empty file yields [`Config::default`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Static HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// User agent for static page fetches and robots.txt
    #[serde(rename = "user-agent", default = "default_http_user_agent")]
    pub user_agent: String,

    /// Timeout for the robots.txt probe (seconds)
    #[serde(rename = "robots-timeout-secs", default = "default_robots_timeout")]
    pub robots_timeout_secs: u64,

    /// Timeout for a static page fetch (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

/// Headless browser configuration for rendered fetches
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserConfig {
    /// Path to a Chrome/Chromium executable; auto-detected when unset
    #[serde(default)]
    pub executable: Option<String>,

    /// User agent presented by the browser
    #[serde(rename = "user-agent", default = "default_browser_user_agent")]
    pub user_agent: String,

    /// Navigation timeout (seconds)
    #[serde(rename = "page-load-timeout-secs", default = "default_page_load_timeout")]
    pub page_load_timeout_secs: u64,

    /// Maximum wait for the body element to appear (seconds)
    #[serde(rename = "dom-wait-secs", default = "default_dom_wait")]
    pub dom_wait_secs: u64,

    /// Fixed delay after DOM-ready for deferred rendering (seconds)
    #[serde(rename = "settle-delay-secs", default = "default_settle_delay")]
    pub settle_delay_secs: u64,

    #[serde(rename = "window-width", default = "default_window_width")]
    pub window_width: u32,

    #[serde(rename = "window-height", default = "default_window_height")]
    pub window_height: u32,
}

/// Crawl orchestration configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of followed-link fetches allowed in flight at once
    #[serde(rename = "max-concurrent-fetches", default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Linked page limit used when a request does not set one
    #[serde(rename = "default-linked-pages", default = "default_linked_pages")]
    pub default_linked_pages: usize,
}

/// Default per-field extraction limits
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_headings")]
    pub headings: usize,
    #[serde(default = "default_links")]
    pub links: usize,
    #[serde(default = "default_paragraphs")]
    pub paragraphs: usize,
    #[serde(default = "default_images")]
    pub images: usize,
    #[serde(default = "default_videos")]
    pub videos: usize,
}

impl HttpConfig {
    pub fn robots_timeout(&self) -> Duration {
        Duration::from_secs(self.robots_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl BrowserConfig {
    pub fn page_load_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn dom_wait(&self) -> Duration {
        Duration::from_secs(self.dom_wait_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_http_user_agent(),
            robots_timeout_secs: default_robots_timeout(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            executable: None,
            user_agent: default_browser_user_agent(),
            page_load_timeout_secs: default_page_load_timeout(),
            dom_wait_secs: default_dom_wait(),
            settle_delay_secs: default_settle_delay(),
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent_fetches(),
            default_linked_pages: default_linked_pages(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            headings: default_headings(),
            links: default_links(),
            paragraphs: default_paragraphs(),
            images: default_images(),
            videos: default_videos(),
        }
    }
}

fn default_http_user_agent() -> String {
    DEFAULT_HTTP_USER_AGENT.to_string()
}

fn default_browser_user_agent() -> String {
    DEFAULT_BROWSER_USER_AGENT.to_string()
}

fn default_robots_timeout() -> u64 {
    5
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_page_load_timeout() -> u64 {
    15
}

fn default_dom_wait() -> u64 {
    5
}

fn default_settle_delay() -> u64 {
    2
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_max_concurrent_fetches() -> usize {
    1
}

fn default_linked_pages() -> usize {
    5
}

fn default_headings() -> usize {
    5
}

fn default_links() -> usize {
    10
}

fn default_paragraphs() -> usize {
    3
}

fn default_images() -> usize {
    5
}

fn default_videos() -> usize {
    5
}
