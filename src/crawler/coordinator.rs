//! Crawler coordinator - crawl orchestration logic
//!
//! This module runs one crawl invocation:
//! - Validating the request before any network activity
//! - Probing robots.txt (informational only)
//! - Fetching and extracting the seed page, where any failure is fatal
//! - Following same-domain links, where failures only drop that page
//! - Assembling the final result

use crate::config::Config;
use crate::crawler::browser::RenderedFetch;
use crate::crawler::extractor::{extract_page, Extraction, PageFields};
use crate::crawler::fetcher::{build_http_client, PageFetcher, StaticFetch};
use crate::crawler::request::{CrawlRequest, FetchStrategy};
use crate::robots::{RobotsGate, RobotsReport, RobotsVerdict};
use crate::search::{search, SearchResult};
use crate::url::{is_fetchable, same_domain, to_absolute};
use crate::{Result, ScrapeError};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use url::Url;

/// Extracted data for one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRecord {
    /// The URL the page was fetched from
    pub url: String,

    /// Selected fields, each capped by its limit
    #[serde(flatten)]
    pub fields: PageFields,

    /// Full visible text, kept for search
    #[serde(skip)]
    pub text: String,

    /// Search outcome when the request carried a query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchResult>,
}

/// Result of one crawl invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlResult {
    /// Raw robots.txt body, if it could be retrieved
    pub robots_txt: Option<String>,

    /// Tri-state robots.txt verdict for the seed URL
    pub robots_verdict: RobotsVerdict,

    /// Caller-facing verdict; an unknown verdict counts as allowed
    pub robots_allowed: bool,

    /// `Crawl-delay` advertised for all agents, in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub robots_crawl_delay: Option<f64>,

    /// Human-readable fetch strategy label
    pub fetch_method: String,

    /// The seed page
    pub seed: PageRecord,

    /// Followed same-domain pages, omitted when none were produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_pages: Option<Vec<PageRecord>>,

    /// Distinct pages successfully visited (seed included)
    pub pages_scraped: usize,

    pub started_at: DateTime<Utc>,

    pub elapsed_ms: u64,
}

/// URLs visited during a single crawl invocation
#[derive(Debug, Clone, Default)]
pub struct VisitedSet(HashSet<String>);

impl VisitedSet {
    /// Creates a set seeded with the initial URL
    pub fn seeded(seed: &Url) -> Self {
        let mut set = Self::default();
        set.insert(seed);
        set
    }

    /// Marks a URL visited; returns false if it already was
    pub fn insert(&mut self, url: &Url) -> bool {
        self.0.insert(url.as_str().to_string())
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.0.contains(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Picks follow candidates from a page's hrefs, in document order
///
/// A candidate is accepted when it resolves against `base`, is fetchable,
/// shares `base`'s network location, and is neither visited nor already
/// accepted. Enumeration stops once `limit` candidates are accepted.
pub fn select_candidates(
    base: &Url,
    hrefs: &[String],
    visited: &VisitedSet,
    accepted: &mut HashSet<String>,
    limit: usize,
) -> Vec<Url> {
    let mut candidates = Vec::new();

    for href in hrefs {
        if candidates.len() >= limit {
            break;
        }

        let Some(resolved) = to_absolute(base, Some(href)) else {
            continue;
        };

        if !is_fetchable(&resolved) || !same_domain(base, Some(&resolved)) {
            tracing::trace!("Skipping off-site link: {}", resolved);
            continue;
        }

        if visited.contains(&resolved) || accepted.contains(resolved.as_str()) {
            tracing::trace!("Skipping already visited link: {}", resolved);
            continue;
        }

        tracing::debug!("Accepted follow candidate: {}", resolved);
        accepted.insert(resolved.as_str().to_string());
        candidates.push(resolved);
    }

    candidates
}

/// Orchestrates robots.txt, fetching, extraction, link following and search
pub struct Crawler {
    config: Config,
    robots: RobotsGate,
    static_fetch: StaticFetch,
    rendered_fetch: RenderedFetch,
}

impl Crawler {
    /// Creates a crawler from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run crawls
    /// * `Err(ScrapeError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self> {
        let client = build_http_client(&config.http)?;

        let robots = RobotsGate::new(client.clone(), config.http.robots_timeout());
        let static_fetch = StaticFetch::new(client, config.http.fetch_timeout());
        let rendered_fetch = RenderedFetch::new(config.browser.clone());

        Ok(Self {
            config,
            robots,
            static_fetch,
            rendered_fetch,
        })
    }

    /// Overrides the rendered strategy's body-element wait, in seconds
    pub fn with_dom_wait(mut self, dom_wait_secs: u64) -> Self {
        self.rendered_fetch = self.rendered_fetch.with_dom_wait(dom_wait_secs);
        self
    }

    fn fetcher_for(&self, strategy: FetchStrategy) -> &dyn PageFetcher {
        match strategy {
            FetchStrategy::Static => &self.static_fetch,
            FetchStrategy::Rendered => &self.rendered_fetch,
        }
    }

    /// Runs one crawl invocation
    ///
    /// 1. Validate the request (no I/O on failure)
    /// 2. Probe robots.txt for text and verdict (never blocks)
    /// 3. Fetch and extract the seed page; failures end the crawl
    /// 4. Follow same-domain links level by level; failures drop that page
    /// 5. Search every produced page when a query was given
    ///
    /// # Example
    ///
    /// ```no_run
    /// use scrape_lens::config::Config;
    /// use scrape_lens::crawler::{CrawlRequest, Crawler, FieldKind};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let crawler = Crawler::new(Config::default())?;
    /// let request = CrawlRequest::new("https://example.com/")
    ///     .with_field(FieldKind::Title)
    ///     .follow_links(3)
    ///     .with_query("example");
    /// let result = crawler.crawl(&request).await?;
    /// println!("{} pages scraped", result.pages_scraped);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn crawl(&self, request: &CrawlRequest) -> Result<CrawlResult> {
        let seed_url = request.validate()?;

        let started_at = Utc::now();
        let start_time = Instant::now();
        let fetcher = self.fetcher_for(request.strategy);

        tracing::info!(
            "Starting crawl of {} ({})",
            seed_url,
            request.strategy.label()
        );

        let robots = self.robots.check(&seed_url).await;
        if !robots.allowed() {
            tracing::warn!(
                "robots.txt disallows {}, continuing (robots.txt is advisory)",
                seed_url
            );
        }

        let anchor_cap = request.anchor_cap();
        let seed_html = fetcher.fetch(seed_url.as_str()).await.into_result(seed_url.as_str())?;
        let seed_page = extract_page(&seed_html, &request.fields, &request.limits, anchor_cap)
            .map_err(|e| ScrapeError::HtmlParse {
                url: seed_url.to_string(),
                message: e.to_string(),
            })?;

        let mut visited = VisitedSet::seeded(&seed_url);
        let (seed, seed_hrefs) = build_record(&seed_url, seed_page, request.query.as_deref());

        let linked = if request.follows_links() {
            self.follow_links(fetcher, request, &seed_url, seed_hrefs, &mut visited)
                .await
        } else {
            Vec::new()
        };

        let result = assemble(
            robots,
            request.strategy,
            seed,
            linked,
            &visited,
            started_at,
            start_time.elapsed(),
        );

        tracing::info!(
            "Crawl of {} completed: {} pages scraped in {:?}",
            seed_url,
            result.pages_scraped,
            start_time.elapsed()
        );

        Ok(result)
    }

    /// Follows same-domain links from the seed, level by level
    ///
    /// Accepted candidates count against `max_linked_pages` whether or not
    /// they are fetched successfully.
    async fn follow_links(
        &self,
        fetcher: &dyn PageFetcher,
        request: &CrawlRequest,
        seed_url: &Url,
        seed_hrefs: Vec<String>,
        visited: &mut VisitedSet,
    ) -> Vec<PageRecord> {
        let limit = request.max_linked_pages;
        let anchor_cap = request.anchor_cap();

        let mut accepted: HashSet<String> = HashSet::new();
        let mut records = Vec::new();
        let mut frontier: Vec<(Url, Vec<String>)> = vec![(seed_url.clone(), seed_hrefs)];

        for level in 1..=request.depth {
            let mut candidates = Vec::new();
            for (base, hrefs) in &frontier {
                let remaining = limit - accepted.len();
                if remaining == 0 {
                    break;
                }
                candidates.extend(select_candidates(base, hrefs, visited, &mut accepted, remaining));
            }

            if candidates.is_empty() {
                break;
            }

            tracing::info!(
                "Following {} links at depth {} ({} of {} accepted)",
                candidates.len(),
                level,
                accepted.len(),
                limit
            );

            let pages = self
                .fetch_candidates(fetcher, request, candidates, anchor_cap)
                .await;

            frontier = Vec::new();
            for (url, extraction) in pages {
                tracing::info!("Scraped linked page {}", url);
                visited.insert(&url);
                let (record, hrefs) = build_record(&url, extraction, request.query.as_deref());
                records.push(record);
                frontier.push((url, hrefs));
            }

            if accepted.len() >= limit {
                break;
            }
        }

        records
    }

    /// Fetches and extracts candidates, keeping document order and dropping failures
    async fn fetch_candidates(
        &self,
        fetcher: &dyn PageFetcher,
        request: &CrawlRequest,
        candidates: Vec<Url>,
        anchor_cap: usize,
    ) -> Vec<(Url, Extraction)> {
        let concurrency = self.config.crawler.max_concurrent_fetches.max(1);

        stream::iter(candidates)
            .map(|url| async move {
                let extraction = fetch_and_extract(fetcher, request, &url, anchor_cap).await;
                (url, extraction)
            })
            .buffered(concurrency)
            .filter_map(|(url, extraction)| async move {
                match extraction {
                    Ok(extraction) => Some((url, extraction)),
                    Err(e) => {
                        tracing::warn!("Skipping linked page {}: {}", url, e);
                        None
                    }
                }
            })
            .collect()
            .await
    }
}

/// Fetches and extracts one followed page
async fn fetch_and_extract(
    fetcher: &dyn PageFetcher,
    request: &CrawlRequest,
    url: &Url,
    anchor_cap: usize,
) -> Result<Extraction> {
    let html = fetcher.fetch(url.as_str()).await.into_result(url.as_str())?;

    extract_page(&html, &request.fields, &request.limits, anchor_cap).map_err(|e| {
        ScrapeError::HtmlParse {
            url: url.to_string(),
            message: e.to_string(),
        }
    })
}

/// Builds a page record, returning the hrefs for further following
fn build_record(url: &Url, extraction: Extraction, query: Option<&str>) -> (PageRecord, Vec<String>) {
    let search = query.and_then(|q| search(q, &extraction.text));

    let record = PageRecord {
        url: url.to_string(),
        fields: extraction.fields,
        text: extraction.text,
        search,
    };

    (record, extraction.hrefs)
}

fn assemble(
    robots: RobotsReport,
    strategy: FetchStrategy,
    seed: PageRecord,
    linked: Vec<PageRecord>,
    visited: &VisitedSet,
    started_at: DateTime<Utc>,
    elapsed: Duration,
) -> CrawlResult {
    let robots_allowed = robots.allowed();

    CrawlResult {
        robots_txt: robots.text,
        robots_verdict: robots.verdict,
        robots_allowed,
        robots_crawl_delay: robots.crawl_delay,
        fetch_method: strategy.label().to_string(),
        seed,
        linked_pages: if linked.is_empty() { None } else { Some(linked) },
        pages_scraped: visited.len(),
        started_at,
        elapsed_ms: elapsed.as_millis() as u64,
    }
}
