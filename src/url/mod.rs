//! Link resolution for Scrape-Lens
//!
//! Resolves anchor hrefs against the page they were found on and decides
//! whether the result stays on the same site.

mod domain;

pub use domain::network_location;

use url::Url;

/// Resolves an href to an absolute URL against a base URL
///
/// # Arguments
///
/// * `base` - The URL of the page the href was found on
/// * `href` - The raw href attribute, possibly relative
///
/// # Returns
///
/// * `Some(Url)` - The resolved absolute URL
/// * `None` - If the href is absent, blank, or cannot be resolved
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scrape_lens::url::to_absolute;
///
/// let base = Url::parse("https://a.com/x").unwrap();
/// assert_eq!(to_absolute(&base, Some("/y")).unwrap().as_str(), "https://a.com/y");
/// assert!(to_absolute(&base, Some("")).is_none());
/// ```
pub fn to_absolute(base: &Url, href: Option<&str>) -> Option<Url> {
    let href = href?.trim();
    if href.is_empty() {
        return None;
    }

    base.join(href).ok()
}

/// Returns true when both URLs share the same `host[:port]`
///
/// An absent candidate is never same-domain.
pub fn same_domain(base: &Url, candidate: Option<&Url>) -> bool {
    let Some(candidate) = candidate else {
        return false;
    };

    match (network_location(base), network_location(candidate)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Returns true if the URL can be fetched by either fetch strategy
pub fn is_fetchable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
