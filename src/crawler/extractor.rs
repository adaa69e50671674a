//! HTML extraction of structured page fragments
//!
//! This module turns page markup into:
//! - The selected fields (title, headings, links, paragraphs, images, videos),
//!   each capped by its limit
//! - The full visible text of the document, for search
//! - The raw anchor hrefs used to pick link-follow candidates

use crate::crawler::request::{FieldKind, FieldLimits, FieldSelection};
use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

/// Title reported when the document has no (non-empty) `<title>`
pub const NO_TITLE: &str = "No title found";

/// Maximum characters kept from each paragraph
pub const PARAGRAPH_CHARS: usize = 100;

/// Elements whose text is never visible
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// An anchor's visible text and its raw, possibly relative href
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRef {
    pub text: String,
    pub href: String,
}

/// Extracted field values; only selected fields are present
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<LinkRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraphs: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<String>>,
}

/// Everything extracted from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub fields: PageFields,

    /// Full visible text, whitespace-collapsed
    pub text: String,

    /// Raw hrefs of the first anchors, in document order
    pub hrefs: Vec<String>,
}

/// Parses markup into a queryable document
///
/// The HTML parser recovers from malformed markup, so the only unparsable
/// input is an empty document.
pub fn parse_document(html: &str) -> Result<Html, ExtractError> {
    if html.trim().is_empty() {
        return Err(ExtractError::EmptyDocument);
    }

    Ok(Html::parse_document(html))
}

/// Parses markup and extracts fields, visible text, and up to `anchor_cap` hrefs
///
/// # Example
///
/// ```
/// use scrape_lens::crawler::{extract_page, FieldKind, FieldLimits, FieldSelection};
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let selection: FieldSelection = [FieldKind::Title].into_iter().collect();
/// let page = extract_page(html, &selection, &FieldLimits::default(), 10).unwrap();
/// assert_eq!(page.fields.title.as_deref(), Some("Test"));
/// assert_eq!(page.hrefs, vec!["/page".to_string()]);
/// ```
pub fn extract_page(
    html: &str,
    selection: &FieldSelection,
    limits: &FieldLimits,
    anchor_cap: usize,
) -> Result<Extraction, ExtractError> {
    let document = parse_document(html)?;

    let fields = extract(&document, selection, limits)?;
    let text = visible_text(&document);
    let hrefs = anchor_hrefs(&document, anchor_cap)?;

    Ok(Extraction {
        fields,
        text,
        hrefs,
    })
}

/// Extracts the selected fields from a parsed document
pub fn extract(
    document: &Html,
    selection: &FieldSelection,
    limits: &FieldLimits,
) -> Result<PageFields, ExtractError> {
    let mut fields = PageFields::default();

    for kind in selection.iter() {
        let limit = limits.limit(kind);
        match kind {
            FieldKind::Title => fields.title = Some(extract_title(document)?),
            FieldKind::Headings => fields.headings = Some(extract_headings(document, limit)?),
            FieldKind::Links => fields.links = Some(extract_links(document, limit)?),
            FieldKind::Paragraphs => {
                fields.paragraphs = Some(extract_paragraphs(document, limit)?)
            }
            FieldKind::Images => fields.images = Some(extract_images(document, limit)?),
            FieldKind::Videos => fields.videos = Some(extract_videos(document, limit)?),
        }
    }

    Ok(fields)
}

/// Returns the raw hrefs of the first `cap` anchors that carry one
pub fn anchor_hrefs(document: &Html, cap: usize) -> Result<Vec<String>, ExtractError> {
    let a_selector = selector("a[href]")?;

    Ok(document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .take(cap)
        .map(str::to_string)
        .collect())
}

/// Collects the document's visible text, skipping script-like elements
pub fn visible_text(document: &Html) -> String {
    let mut words: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
        });
        if hidden {
            continue;
        }

        words.extend(text.split_whitespace());
    }

    words.join(" ")
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Result<String, ExtractError> {
    let title_selector = selector("title")?;

    Ok(document
        .select(&title_selector)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string()))
}

fn extract_headings(document: &Html, limit: usize) -> Result<Vec<String>, ExtractError> {
    let heading_selector = selector("h1, h2, h3")?;

    Ok(document
        .select(&heading_selector)
        .take(limit)
        .map(element_text)
        .collect())
}

fn extract_links(document: &Html, limit: usize) -> Result<Vec<LinkRef>, ExtractError> {
    let a_selector = selector("a[href]")?;

    Ok(document
        .select(&a_selector)
        .take(limit)
        .filter_map(|element| {
            element.value().attr("href").map(|href| LinkRef {
                text: element_text(element),
                href: href.to_string(),
            })
        })
        .collect())
}

fn extract_paragraphs(document: &Html, limit: usize) -> Result<Vec<String>, ExtractError> {
    let p_selector = selector("p")?;

    Ok(document
        .select(&p_selector)
        .take(limit)
        .map(|element| element_text(element).chars().take(PARAGRAPH_CHARS).collect())
        .collect())
}

fn extract_images(document: &Html, limit: usize) -> Result<Vec<String>, ExtractError> {
    let img_selector = selector("img[src]")?;
    Ok(attr_values(document, &img_selector, "src", limit))
}

/// Native `<video>` sources first, then YouTube iframes, jointly capped
fn extract_videos(document: &Html, limit: usize) -> Result<Vec<String>, ExtractError> {
    let video_selector = selector("video[src]")?;
    let iframe_selector = selector("iframe[src]")?;

    let native = document
        .select(&video_selector)
        .filter_map(|element| element.value().attr("src"));
    let embedded = document
        .select(&iframe_selector)
        .filter_map(|element| element.value().attr("src"))
        .filter(|src| src.contains("youtube.com"));

    Ok(native
        .chain(embedded)
        .take(limit)
        .map(str::to_string)
        .collect())
}

fn attr_values(document: &Html, selector: &Selector, attr: &str, limit: usize) -> Vec<String> {
    document
        .select(selector)
        .filter_map(|element| element.value().attr(attr))
        .take(limit)
        .map(str::to_string)
        .collect()
}

/// Text content of an element with whitespace collapsed
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css.to_string()))
}
