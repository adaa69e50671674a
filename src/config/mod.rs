//! Configuration module for Scrape-Lens
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every key has a default, so a crawl can run without one.
//!
//! # Example
//!
//! ```no_run
//! use scrape_lens::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scrape-lens.toml")).unwrap();
//! println!("Browser DOM wait: {}s", config.browser.dom_wait_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, CrawlerConfig, HttpConfig, LimitsConfig, DEFAULT_BROWSER_USER_AGENT,
    DEFAULT_HTTP_USER_AGENT,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
