//! Markdown report generation
//!
//! This module formats a crawl result as a human-readable Markdown report,
//! including the robots.txt verdict, every page's extracted fields, and
//! search snippets.

use crate::crawler::PageRecord;
use crate::robots::RobotsVerdict;
use crate::CrawlResult;

/// Formats a crawl result as markdown
///
/// # Arguments
///
/// * `result` - The crawl result
///
/// # Returns
///
/// A formatted markdown string
pub fn format_report(result: &CrawlResult) -> String {
    let mut md = String::new();

    // Title
    md.push_str("# Scrape-Lens Report\n\n");

    // Run metadata
    md.push_str("## Crawl Information\n\n");
    md.push_str(&format!("- **URL**: {}\n", result.seed.url));
    md.push_str(&format!("- **Fetch Method**: {}\n", result.fetch_method));
    md.push_str(&format!(
        "- **Started**: {}\n",
        result.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        result.elapsed_ms as f64 / 1000.0
    ));
    md.push_str(&format!("- **Pages Scraped**: {}\n\n", result.pages_scraped));

    // robots.txt
    md.push_str("## robots.txt\n\n");
    let verdict = match result.robots_verdict {
        RobotsVerdict::Allowed => "allowed",
        RobotsVerdict::Disallowed => "disallowed (crawled anyway)",
        RobotsVerdict::Unknown => "unknown, robots.txt unavailable (treated as allowed)",
    };
    md.push_str(&format!("- **Verdict**: {}\n", verdict));
    if let Some(delay) = result.robots_crawl_delay {
        md.push_str(&format!("- **Crawl-delay**: {} seconds\n", delay));
    }
    md.push('\n');
    if let Some(text) = &result.robots_txt {
        md.push_str("```text\n");
        md.push_str(text.trim_end());
        md.push_str("\n```\n\n");
    }

    // Seed page
    md.push_str("## Seed Page\n\n");
    push_page(&mut md, &result.seed);

    // Linked pages
    if let Some(pages) = &result.linked_pages {
        md.push_str(&format!("## Linked Pages ({})\n\n", pages.len()));
        for page in pages {
            push_page(&mut md, page);
        }
    }

    md
}

fn push_page(md: &mut String, page: &PageRecord) {
    md.push_str(&format!("### {}\n\n", page.url));

    let fields = &page.fields;

    if let Some(title) = &fields.title {
        md.push_str(&format!("**Title**: {}\n\n", title));
    }

    if let Some(headings) = &fields.headings {
        push_list(md, "Headings", headings.iter().map(String::as_str));
    }

    if let Some(links) = &fields.links {
        md.push_str(&format!("**Links** ({})\n\n", links.len()));
        for link in links {
            let text = if link.text.is_empty() { &link.href } else { &link.text };
            md.push_str(&format!("- [{}]({})\n", text, link.href));
        }
        md.push('\n');
    }

    if let Some(paragraphs) = &fields.paragraphs {
        push_list(md, "Paragraphs", paragraphs.iter().map(String::as_str));
    }

    if let Some(images) = &fields.images {
        push_list(md, "Images", images.iter().map(String::as_str));
    }

    if let Some(videos) = &fields.videos {
        push_list(md, "Videos", videos.iter().map(String::as_str));
    }

    if let Some(search) = &page.search {
        if search.found {
            md.push_str(&format!(
                "**Search** \"{}\": {} occurrence(s)\n\n",
                search.query, search.count
            ));
            for snippet in &search.snippets {
                md.push_str(&format!("> {}\n\n", snippet.context));
            }
        } else {
            md.push_str(&format!("**Search** \"{}\": no matches\n\n", search.query));
        }
    }
}

fn push_list<'a>(md: &mut String, label: &str, items: impl ExactSizeIterator<Item = &'a str>) {
    md.push_str(&format!("**{}** ({})\n\n", label, items.len()));
    for item in items {
        md.push_str(&format!("- {}\n", item));
    }
    md.push('\n');
}
