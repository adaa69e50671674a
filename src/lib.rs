//! Scrape-Lens: a single-page crawl-and-extract engine
//!
//! This crate fetches a web page (as plain HTTP or through a headless browser),
//! optionally follows same-domain links to a bounded count, extracts structured
//! fragments under caller-supplied limits, and searches the aggregated text for
//! a query string.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod search;
pub mod url;

use crate::crawler::FieldKind;
use thiserror::Error;

/// Main error type for Scrape-Lens operations
///
/// The `Display` text of each variant is the message surfaced to the caller
/// when a crawl cannot produce a result.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Request to {url} timed out, no content was retrieved")]
    FetchTimeout { url: String },

    #[error("An error occurred while fetching {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("HTML parse error for {url}: {message}")]
    HtmlParse { url: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Request validation errors
///
/// These are raised before any network activity takes place.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a URL")]
    MissingUrl,

    #[error("Please select at least one field to extract")]
    NoFieldSelected,

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("Unsupported URL scheme '{0}', only http and https can be crawled")]
    UnsupportedScheme(String),

    #[error("The {field} limit must be at least 1")]
    ZeroLimit { field: FieldKind },

    #[error("The linked page limit must be at least 1 when following links")]
    ZeroLinkedPages,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Markup extraction errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("document is empty")]
    EmptyDocument,

    #[error("invalid selector '{0}'")]
    Selector(String),
}

/// Result type alias for Scrape-Lens operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlRequest, CrawlResult, Crawler, FetchStrategy, PageRecord};
pub use search::{search, SearchResult};
