//! Rendered-DOM fetch strategy
//!
//! Every fetch launches its own headless Chrome with a throwaway profile,
//! navigates, waits for the body element, lets deferred scripts settle, and
//! captures the rendered markup. The browser is torn down on every exit path:
//! explicitly after capture, and through [`BrowserSession`]'s `Drop` if the
//! fetch future is cancelled.

use crate::config::BrowserConfig;
use crate::crawler::fetcher::{FetchOutcome, PageFetcher};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig, HeadlessMode};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio::task::JoinHandle;

/// Interval between body-element probes while waiting for the DOM
const DOM_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Fetches pages through a headless browser
#[derive(Debug, Clone)]
pub struct RenderedFetch {
    settings: BrowserConfig,
}

impl RenderedFetch {
    pub fn new(settings: BrowserConfig) -> Self {
        Self { settings }
    }

    /// Overrides how long to wait for the body element, in seconds
    pub fn with_dom_wait(mut self, dom_wait_secs: u64) -> Self {
        self.settings.dom_wait_secs = dom_wait_secs;
        self
    }

    /// Navigates, waits for the DOM, settles, and captures markup
    async fn capture(&self, session: &BrowserSession, url: &str) -> Result<String, String> {
        let page = session
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| format!("Failed to open page: {}", e))?;

        match tokio::time::timeout(self.settings.page_load_timeout(), page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(format!("Navigation failed: {}", e)),
            Err(_) => {
                return Err(format!(
                    "Page load timed out after {}s",
                    self.settings.page_load_timeout_secs
                ))
            }
        }

        wait_for_body(&page, self.settings.dom_wait()).await?;

        // Deferred script-driven rendering
        tokio::time::sleep(self.settings.settle_delay()).await;

        page.content()
            .await
            .map_err(|e| format!("Failed to capture rendered markup: {}", e))
    }
}

#[async_trait]
impl PageFetcher for RenderedFetch {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        tracing::debug!("Rendered fetch: {}", url);
        let started = Instant::now();

        let session = match BrowserSession::launch(&self.settings).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Failed to launch browser for {}: {}", url, e);
                return FetchOutcome::Failed(e);
            }
        };

        let captured = self.capture(&session, url).await;
        session.close().await;

        match captured {
            Ok(html) => {
                tracing::debug!(
                    "Rendered {} in {:.2} seconds",
                    url,
                    started.elapsed().as_secs_f64()
                );
                FetchOutcome::Page(html)
            }
            Err(message) => {
                tracing::warn!("Rendered fetch of {} failed: {}", url, message);
                FetchOutcome::Failed(message)
            }
        }
    }
}

/// Polls for the body element until it appears or `max_wait` elapses
async fn wait_for_body(page: &Page, max_wait: Duration) -> Result<(), String> {
    let started = Instant::now();

    loop {
        if page.find_element("body").await.is_ok() {
            tracing::trace!("Body element present after {:?}", started.elapsed());
            return Ok(());
        }

        if started.elapsed() >= max_wait {
            return Err(format!(
                "Timed out after {}s waiting for the page body",
                max_wait.as_secs()
            ));
        }

        tokio::time::sleep(DOM_POLL_INTERVAL).await;
    }
}

/// Builds the Chrome launch configuration with automation fingerprints suppressed
fn launch_config(settings: &BrowserConfig, profile: &TempDir) -> Result<ChromeConfig, String> {
    let mut builder = ChromeConfig::builder()
        .headless_mode(HeadlessMode::default())
        .request_timeout(settings.page_load_timeout())
        .window_size(settings.window_width, settings.window_height)
        .user_data_dir(profile.path())
        .arg(format!("--user-agent={}", settings.user_agent))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--disable-extensions")
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox")
        .arg("--mute-audio");

    if let Some(executable) = &settings.executable {
        builder = builder.chrome_executable(executable);
    }

    builder
        .build()
        .map_err(|e| format!("Failed to build browser config: {}", e))
}

/// One launched browser and everything it owns
///
/// Field order matters for `Drop`: the browser (whose own drop kills a still
/// running process) goes before the profile directory is removed.
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    _profile: TempDir,
}

impl BrowserSession {
    async fn launch(settings: &BrowserConfig) -> Result<Self, String> {
        let profile = tempfile::Builder::new()
            .prefix("scrape-lens-chrome-")
            .tempdir()
            .map_err(|e| format!("Failed to create browser profile directory: {}", e))?;

        let config = launch_config(settings, &profile)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| format!("Failed to launch browser: {}", e))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler event error: {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            _profile: profile,
        })
    }

    /// Closes the browser and waits for the process to exit
    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Failed to wait for browser exit: {}", e);
        }
        // Drop aborts the handler and removes the profile
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
