use url::Url;

/// Extracts the network location (`host[:port]`) of a URL
///
/// The host is lowercased by the URL parser. A port is only included when it
/// was written explicitly and differs from the scheme default, so
/// `https://a.com:443/` and `https://a.com/` share a network location.
///
/// # Arguments
///
/// * `url` - The URL to extract the network location from
///
/// # Returns
///
/// * `Some(String)` - `host` or `host:port`
/// * `None` - If the URL has no host (e.g. `mailto:`)
///
/// # Examples
///
/// ```
/// use url::Url;
/// use scrape_lens::url::network_location;
///
/// let url = Url::parse("https://example.com/path").unwrap();
/// assert_eq!(network_location(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(network_location(&url), Some("example.com:8080".to_string()));
/// ```
pub fn network_location(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}
