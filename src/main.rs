//! Scrape-Lens main entry point
//!
//! This is the command-line interface for the Scrape-Lens page extractor.

use clap::Parser;
use scrape_lens::config::{load_config_or_default, Config};
use scrape_lens::crawler::{CrawlRequest, Crawler, FetchStrategy, FieldKind, FieldLimits};
use scrape_lens::output::{render, OutputFormat};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Scrape-Lens: extract structured content from a page and its neighbours
///
/// Scrape-Lens fetches a page (directly or through a headless browser),
/// extracts the selected fields, optionally follows same-domain links, and
/// searches every page for a query. robots.txt is reported but never
/// enforced.
#[derive(Parser, Debug)]
#[command(name = "scrape-lens")]
#[command(version)]
#[command(about = "Extract structured content from web pages", long_about = None)]
struct Cli {
    /// URL of the page to scrape
    #[arg(value_name = "URL")]
    url: String,

    /// Extract the page title
    #[arg(long)]
    title: bool,

    /// Extract h1-h3 headings
    #[arg(long)]
    headings: bool,

    /// Extract links
    #[arg(long)]
    links: bool,

    /// Extract paragraphs (truncated to 100 characters)
    #[arg(long)]
    paragraphs: bool,

    /// Extract image sources
    #[arg(long)]
    images: bool,

    /// Extract video and YouTube embed sources
    #[arg(long)]
    videos: bool,

    /// Extract every field
    #[arg(long)]
    all: bool,

    /// Maximum headings per page
    #[arg(long, value_name = "N")]
    max_headings: Option<usize>,

    /// Maximum links per page
    #[arg(long, value_name = "N")]
    max_links: Option<usize>,

    /// Maximum paragraphs per page
    #[arg(long, value_name = "N")]
    max_paragraphs: Option<usize>,

    /// Maximum images per page
    #[arg(long, value_name = "N")]
    max_images: Option<usize>,

    /// Maximum videos per page
    #[arg(long, value_name = "N")]
    max_videos: Option<usize>,

    /// Follow same-domain links from the page
    #[arg(long)]
    follow: bool,

    /// Maximum number of linked pages to follow
    #[arg(long, value_name = "N", requires = "follow")]
    max_linked_pages: Option<usize>,

    /// How many link levels to follow
    #[arg(long, value_name = "N", default_value_t = 1)]
    depth: u32,

    /// Render pages in headless Chrome instead of a plain HTTP request
    #[arg(long)]
    render: bool,

    /// Seconds to wait for the page body when rendering
    #[arg(
        long,
        value_name = "SECS",
        requires = "render",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    dom_wait: Option<u64>,

    /// Search every scraped page for this text (case-insensitive)
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Builds the crawl request from flags and configured defaults
    fn to_request(&self, config: &Config) -> CrawlRequest {
        let selected = [
            (FieldKind::Title, self.title),
            (FieldKind::Headings, self.headings),
            (FieldKind::Links, self.links),
            (FieldKind::Paragraphs, self.paragraphs),
            (FieldKind::Images, self.images),
            (FieldKind::Videos, self.videos),
        ];

        let mut limits = FieldLimits::from(&config.limits);
        let overrides = [
            (FieldKind::Headings, self.max_headings),
            (FieldKind::Links, self.max_links),
            (FieldKind::Paragraphs, self.max_paragraphs),
            (FieldKind::Images, self.max_images),
            (FieldKind::Videos, self.max_videos),
        ];
        for (kind, limit) in overrides {
            if let Some(limit) = limit {
                limits.set(kind, limit);
            }
        }

        let mut request = CrawlRequest::new(self.url.clone())
            .with_fields(
                selected
                    .into_iter()
                    .filter(|(_, on)| self.all || *on)
                    .map(|(kind, _)| kind)
                    .collect(),
            )
            .with_limits(limits)
            .with_depth(self.depth);

        if self.follow {
            request = request.follow_links(
                self.max_linked_pages
                    .unwrap_or(config.crawler.default_linked_pages),
            );
        }

        if self.render {
            request = request.with_strategy(FetchStrategy::Rendered);
        }

        if let Some(query) = &self.search {
            request = request.with_query(query.as_str());
        }

        request
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(&cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Loads configuration, runs the crawl, and renders the result
async fn run(cli: &Cli) -> scrape_lens::Result<String> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let config = load_config_or_default(cli.config.as_deref())?;

    let request = cli.to_request(&config);

    let mut crawler = Crawler::new(config)?;
    if let Some(secs) = cli.dom_wait {
        crawler = crawler.with_dom_wait(secs);
    }

    let result = crawler.crawl(&request).await?;
    render(&result, cli.format)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scrape_lens=info,warn"),
            1 => EnvFilter::new("scrape_lens=debug,info"),
            2 => EnvFilter::new("scrape_lens=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout carries only the rendered result
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
