//! Crawler module for page fetching and extraction
//!
//! This module contains the core crawling logic, including:
//! - The crawl request model and its validation
//! - Static (HTTP) and rendered (headless browser) fetch strategies
//! - Field extraction from page markup
//! - Seed and linked-page coordination

mod browser;
mod coordinator;
mod extractor;
mod fetcher;
mod request;

pub use browser::RenderedFetch;
pub use coordinator::{select_candidates, CrawlResult, Crawler, PageRecord, VisitedSet};
pub use extractor::{
    anchor_hrefs, extract, extract_page, parse_document, visible_text, Extraction, LinkRef,
    PageFields, NO_TITLE, PARAGRAPH_CHARS,
};
pub use fetcher::{build_http_client, FetchOutcome, PageFetcher, StaticFetch};
pub use request::{CrawlRequest, FetchStrategy, FieldKind, FieldLimits, FieldSelection};

use crate::config::Config;

/// Runs a complete crawl operation
///
/// This is a convenience entry point that builds a [`Crawler`] for a single
/// request. It will:
/// 1. Validate the request
/// 2. Check robots.txt for the seed URL
/// 3. Fetch and extract the seed page
/// 4. Follow same-domain links when requested
/// 5. Run the search query against every page
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `request` - What to crawl and extract
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl completed successfully
/// * `Err(ScrapeError)` - Crawl failed
pub async fn crawl(config: Config, request: &CrawlRequest) -> crate::Result<CrawlResult> {
    Crawler::new(config)?.crawl(request).await
}
