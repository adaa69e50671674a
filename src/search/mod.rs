//! Substring search over extracted page text
//!
//! A linear, case-insensitive scan that reports every match (overlapping
//! matches included) and materializes a bounded number of context snippets.

use serde::Serialize;

/// Maximum number of snippets materialized per search
pub const MAX_SNIPPETS: usize = 10;

/// Characters of context kept on each side of a match
pub const CONTEXT_CHARS: usize = 100;

/// Marker added on a side where the snippet does not reach the text boundary
pub const ELLIPSIS: &str = "...";

/// Outcome of searching one page's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    /// The query that was searched for
    pub query: String,

    /// Whether at least one match was found
    pub found: bool,

    /// Total number of matches, including those beyond the snippet cap
    pub count: usize,

    /// The first matches, in text order
    pub snippets: Vec<Snippet>,
}

/// A bounded window of text around one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snippet {
    /// Character offset of the match start in the searched text
    pub position: usize,

    /// The context window, ellipsis-marked where it was cut short
    pub context: String,
}

/// Searches `text` for `query`, ignoring case
///
/// Returns `None` when either the query or the text is empty. The scan
/// advances one character past each match start, so overlapping matches
/// are all counted.
///
/// # Examples
///
/// ```
/// use scrape_lens::search::search;
///
/// let result = search("cat", "The cat sat").unwrap();
/// assert!(result.found);
/// assert_eq!(result.count, 1);
/// assert_eq!(result.snippets[0].context, "The cat sat");
///
/// assert_eq!(search("aa", "aaa").unwrap().count, 2);
/// ```
pub fn search(query: &str, text: &str) -> Option<SearchResult> {
    if query.is_empty() || text.is_empty() {
        return None;
    }

    // Offsets are character based; folding keeps one folded char per source char
    let source: Vec<char> = text.chars().collect();
    let haystack: Vec<char> = source.iter().map(|&c| fold_case(c)).collect();
    let needle: Vec<char> = query.chars().map(fold_case).collect();

    let mut count = 0;
    let mut snippets = Vec::new();

    if needle.len() <= haystack.len() {
        for start in 0..=(haystack.len() - needle.len()) {
            if haystack[start..start + needle.len()] != needle[..] {
                continue;
            }

            count += 1;
            if snippets.len() < MAX_SNIPPETS {
                snippets.push(build_snippet(&source, start, needle.len()));
            }
        }
    }

    tracing::debug!("Search for {:?} found {} matches", query, count);

    Some(SearchResult {
        query: query.to_string(),
        found: count > 0,
        count,
        snippets,
    })
}

/// Builds the context window around the match at `start`
fn build_snippet(source: &[char], start: usize, match_len: usize) -> Snippet {
    let window_start = start.saturating_sub(CONTEXT_CHARS);
    let window_end = (start + match_len + CONTEXT_CHARS).min(source.len());

    let window: String = source[window_start..window_end].iter().collect();

    let mut context = String::with_capacity(window.len() + 2 * ELLIPSIS.len());
    if window_start > 0 {
        context.push_str(ELLIPSIS);
    }
    context.push_str(window.trim());
    if window_end < source.len() {
        context.push_str(ELLIPSIS);
    }

    Snippet {
        position: start,
        context,
    }
}

/// Lowercases a character when its lowercase form is a single character
fn fold_case(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}
