//! Crawl request model
//!
//! A [`CrawlRequest`] describes one crawl invocation: the seed URL, which
//! fields to extract and how many of each, whether to follow same-domain
//! links, which fetch strategy to use, and an optional search query.

use crate::config::LimitsConfig;
use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use url::Url;

/// The kinds of fragment the extractor can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Title,
    Headings,
    Links,
    Paragraphs,
    Images,
    Videos,
}

impl FieldKind {
    /// Every field kind, in report order
    pub const ALL: [FieldKind; 6] = [
        FieldKind::Title,
        FieldKind::Headings,
        FieldKind::Links,
        FieldKind::Paragraphs,
        FieldKind::Images,
        FieldKind::Videos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Headings => "headings",
            Self::Links => "links",
            Self::Paragraphs => "paragraphs",
            Self::Images => "images",
            Self::Videos => "videos",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of fields selected for extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection(BTreeSet<FieldKind>);

impl FieldSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects every field kind
    pub fn all() -> Self {
        Self(FieldKind::ALL.into_iter().collect())
    }

    pub fn insert(&mut self, kind: FieldKind) {
        self.0.insert(kind);
    }

    pub fn contains(&self, kind: FieldKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the selected kinds in report order
    pub fn iter(&self) -> impl Iterator<Item = FieldKind> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<FieldKind> for FieldSelection {
    fn from_iter<I: IntoIterator<Item = FieldKind>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Per-field result caps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldLimits {
    pub headings: usize,
    pub links: usize,
    pub paragraphs: usize,
    pub images: usize,
    pub videos: usize,
}

impl FieldLimits {
    /// Returns the cap for a field kind; a page has at most one title
    pub fn limit(&self, kind: FieldKind) -> usize {
        match kind {
            FieldKind::Title => 1,
            FieldKind::Headings => self.headings,
            FieldKind::Links => self.links,
            FieldKind::Paragraphs => self.paragraphs,
            FieldKind::Images => self.images,
            FieldKind::Videos => self.videos,
        }
    }

    /// Overrides the cap for a field kind; the title cap is fixed
    pub fn set(&mut self, kind: FieldKind, limit: usize) {
        match kind {
            FieldKind::Title => {}
            FieldKind::Headings => self.headings = limit,
            FieldKind::Links => self.links = limit,
            FieldKind::Paragraphs => self.paragraphs = limit,
            FieldKind::Images => self.images = limit,
            FieldKind::Videos => self.videos = limit,
        }
    }
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self::from(&LimitsConfig::default())
    }
}

impl From<&LimitsConfig> for FieldLimits {
    fn from(config: &LimitsConfig) -> Self {
        Self {
            headings: config.headings,
            links: config.links,
            paragraphs: config.paragraphs,
            images: config.images,
            videos: config.videos,
        }
    }
}

/// How a page's markup is obtained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// Direct HTTP GET
    #[default]
    Static,
    /// Headless browser navigation with a DOM wait and settle delay
    Rendered,
}

impl FetchStrategy {
    /// Human-readable label reported with every crawl result
    pub fn label(&self) -> &'static str {
        match self {
            Self::Static => "Static HTTP request",
            Self::Rendered => "Rendered browser (headless Chrome)",
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One crawl invocation's options
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub url: String,
    pub fields: FieldSelection,
    pub limits: FieldLimits,
    pub follow_links: bool,
    pub max_linked_pages: usize,
    pub depth: u32,
    pub strategy: FetchStrategy,
    pub query: Option<String>,
}

impl CrawlRequest {
    /// Creates a request for `url` with no fields selected and defaults elsewhere
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            fields: FieldSelection::new(),
            limits: FieldLimits::default(),
            follow_links: false,
            max_linked_pages: 5,
            depth: 1,
            strategy: FetchStrategy::Static,
            query: None,
        }
    }

    pub fn with_field(mut self, kind: FieldKind) -> Self {
        self.fields.insert(kind);
        self
    }

    pub fn with_fields(mut self, fields: FieldSelection) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_limits(mut self, limits: FieldLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Enables same-domain link following, bounded to `max_linked_pages`
    pub fn follow_links(mut self, max_linked_pages: usize) -> Self {
        self.follow_links = true;
        self.max_linked_pages = max_linked_pages;
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the search query; blank queries are treated as absent
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = if query.trim().is_empty() {
            None
        } else {
            Some(query)
        };
        self
    }

    /// Number of anchors enumerated per page when choosing follow candidates
    ///
    /// Twice the linked-page limit, leaving room for off-site and duplicate
    /// links.
    pub fn anchor_cap(&self) -> usize {
        self.max_linked_pages.saturating_mul(2)
    }

    /// Returns true if link following will actually take place
    pub fn follows_links(&self) -> bool {
        self.follow_links && self.depth > 0 && self.max_linked_pages > 0
    }

    /// Validates the request and parses its seed URL
    ///
    /// No network activity happens before this succeeds.
    pub fn validate(&self) -> Result<Url, ValidationError> {
        let raw = self.url.trim();
        if raw.is_empty() {
            return Err(ValidationError::MissingUrl);
        }

        if self.fields.is_empty() {
            return Err(ValidationError::NoFieldSelected);
        }

        for kind in self.fields.iter() {
            if self.limits.limit(kind) == 0 {
                return Err(ValidationError::ZeroLimit { field: kind });
            }
        }

        if self.follow_links && self.depth > 0 && self.max_linked_pages == 0 {
            return Err(ValidationError::ZeroLinkedPages);
        }

        let url = Url::parse(raw).map_err(|_| ValidationError::InvalidUrl(raw.to_string()))?;
        if !crate::url::is_fetchable(&url) {
            return Err(ValidationError::UnsupportedScheme(url.scheme().to_string()));
        }
        if url.host_str().is_none() {
            return Err(ValidationError::InvalidUrl(raw.to_string()));
        }

        Ok(url)
    }
}
