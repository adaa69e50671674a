//! Output module for rendering crawl results
//!
//! This module handles:
//! - Serializing results as pretty-printed JSON
//! - Formatting human-readable Markdown reports

mod markdown;

pub use markdown::format_report;

use crate::CrawlResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a crawl result is rendered for the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown report
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "markdown" | "md" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{}', expected text or json", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Renders a crawl result in the requested format
///
/// # Returns
///
/// * `Ok(String)` - The rendered result
/// * `Err(ScrapeError)` - JSON serialization failed
pub fn render(result: &CrawlResult, format: OutputFormat) -> crate::Result<String> {
    match format {
        OutputFormat::Text => Ok(format_report(result)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
    }
}
