//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use scrape_lens::config::{load_config, Config};
use scrape_lens::crawler::{
    build_http_client, CrawlRequest, Crawler, FieldKind, FieldLimits, NO_TITLE,
};
use scrape_lens::output::{render, OutputFormat};
use scrape_lens::robots::{RobotsGate, RobotsVerdict};
use scrape_lens::{ScrapeError, ValidationError};
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{any, method, path};
use url::Url;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.http.robots_timeout_secs = 2;
    config.http.fetch_timeout_secs = 5;
    config
}

/// Builds a page with a title, a body paragraph, and the given links
fn html_page(title: &str, body: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!("<a href=\"{}\">{}</a>\n", href, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><h1>{}</h1><p>{}</p>{}</body></html>",
        title, title, body, anchors
    )
}

fn html_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_response(body))
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

fn seed_url(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

fn linked_urls(result: &scrape_lens::CrawlResult) -> Vec<String> {
    result
        .linked_pages
        .iter()
        .flatten()
        .map(|page| page.url.clone())
        .collect()
}

#[tokio::test]
async fn test_validation_errors_make_no_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(create_test_config()).unwrap();

    let request = CrawlRequest::new(seed_url(&mock_server));
    let err = crawler.crawl(&request).await.unwrap_err();
    assert!(matches!(
        err,
        ScrapeError::Validation(ValidationError::NoFieldSelected)
    ));
    assert_eq!(err.to_string(), "Please select at least one field to extract");

    let request = CrawlRequest::new("").with_field(FieldKind::Title);
    let err = crawler.crawl(&request).await.unwrap_err();
    assert_eq!(err.to_string(), "Please enter a URL");

    let mut limits = FieldLimits::default();
    limits.links = 0;
    let request = CrawlRequest::new(seed_url(&mock_server))
        .with_field(FieldKind::Links)
        .with_limits(limits);
    let err = crawler.crawl(&request).await.unwrap_err();
    assert!(matches!(
        err,
        ScrapeError::Validation(ValidationError::ZeroLimit {
            field: FieldKind::Links
        })
    ));
}

#[tokio::test]
async fn test_seed_only_extraction() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Home</title></head><body>
            <h1>First</h1><h2>Second</h2><h3>Third</h3><h4>Ignored</h4>
            <p>Intro paragraph</p>
            <img src="/logo.png">
            <video src="/clip.mp4"></video>
            <iframe src="https://www.youtube.com/embed/abc"></iframe>
            <iframe src="https://player.vimeo.com/video/1"></iframe>
            <a href="/about">About us</a>
        </body></html>"#
            .to_string(),
    )
    .await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server)).with_fields(
        [
            FieldKind::Title,
            FieldKind::Headings,
            FieldKind::Links,
            FieldKind::Paragraphs,
            FieldKind::Images,
            FieldKind::Videos,
        ]
        .into_iter()
        .collect(),
    );

    let result = crawler.crawl(&request).await.unwrap();
    let fields = &result.seed.fields;

    assert_eq!(result.seed.url, seed_url(&mock_server));
    assert_eq!(fields.title.as_deref(), Some("Home"));
    assert_eq!(
        fields.headings.as_deref(),
        Some(&["First".to_string(), "Second".to_string(), "Third".to_string()][..])
    );
    assert_eq!(fields.links.as_ref().unwrap()[0].text, "About us");
    assert_eq!(fields.links.as_ref().unwrap()[0].href, "/about");
    assert_eq!(fields.paragraphs.as_ref().unwrap(), &vec!["Intro paragraph".to_string()]);
    assert_eq!(fields.images.as_ref().unwrap(), &vec!["/logo.png".to_string()]);
    assert_eq!(
        fields.videos.as_ref().unwrap(),
        &vec![
            "/clip.mp4".to_string(),
            "https://www.youtube.com/embed/abc".to_string()
        ]
    );

    assert!(result.linked_pages.is_none());
    assert_eq!(result.pages_scraped, 1);
    assert_eq!(result.fetch_method, "Static HTTP request");

    // No robots.txt mounted: wiremock answers 404
    assert_eq!(result.robots_verdict, RobotsVerdict::Unknown);
    assert!(result.robots_allowed);
    assert!(result.robots_txt.is_none());
}

#[tokio::test]
async fn test_only_selected_fields_are_present() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", html_page("Home", "Body", &["/a"])).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server)).with_field(FieldKind::Paragraphs);

    let result = crawler.crawl(&request).await.unwrap();
    let fields = &result.seed.fields;
    assert!(fields.title.is_none());
    assert!(fields.links.is_none());
    assert!(fields.headings.is_none());
    assert_eq!(fields.paragraphs.as_ref().unwrap(), &vec!["Body".to_string()]);
}

#[tokio::test]
async fn test_missing_title_uses_sentinel() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        "<html><body><p>No head here</p></body></html>".to_string(),
    )
    .await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server)).with_field(FieldKind::Title);

    let result = crawler.crawl(&request).await.unwrap();
    assert_eq!(result.seed.fields.title.as_deref(), Some(NO_TITLE));
}

#[tokio::test]
async fn test_robots_disallow_is_reported_not_enforced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nDisallow: /\nCrawl-delay: 3\n"),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", html_page("Forbidden", "Still fetched", &[])).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server)).with_field(FieldKind::Title);

    let result = crawler.crawl(&request).await.unwrap();
    assert_eq!(result.robots_verdict, RobotsVerdict::Disallowed);
    assert!(!result.robots_allowed);
    assert_eq!(result.robots_crawl_delay, Some(3.0));
    assert!(result.robots_txt.unwrap().contains("Disallow: /"));
    assert_eq!(result.seed.fields.title.as_deref(), Some("Forbidden"));
}

#[tokio::test]
async fn test_robots_allow() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", html_page("Home", "Body", &[])).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server)).with_field(FieldKind::Title);

    let result = crawler.crawl(&request).await.unwrap();
    assert_eq!(result.robots_verdict, RobotsVerdict::Allowed);
    assert!(result.robots_allowed);
    assert!(result.robots_crawl_delay.is_none());
}

#[tokio::test]
async fn test_follow_links_respects_limit() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html_page("Home", "Seed", &["/p1", "/p2", "/p3", "/p4", "/p5"]),
    )
    .await;
    for i in 1..=3 {
        mount_page(
            &mock_server,
            &format!("/p{}", i),
            html_page(&format!("Page {}", i), "Linked", &[]),
        )
        .await;
    }
    for i in 4..=5 {
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(html_response(html_page("Unused", "Unused", &[])))
            .expect(0)
            .mount(&mock_server)
            .await;
    }

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server))
        .with_field(FieldKind::Title)
        .follow_links(3);

    let result = crawler.crawl(&request).await.unwrap();
    let base = mock_server.uri();

    assert_eq!(
        linked_urls(&result),
        vec![
            format!("{}/p1", base),
            format!("{}/p2", base),
            format!("{}/p3", base)
        ]
    );
    let titles: Vec<_> = result
        .linked_pages
        .as_ref()
        .unwrap()
        .iter()
        .map(|page| page.fields.title.clone().unwrap())
        .collect();
    assert_eq!(titles, vec!["Page 1", "Page 2", "Page 3"]);
    assert_eq!(result.pages_scraped, 4);
}

#[tokio::test]
async fn test_failed_linked_pages_are_skipped() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", html_page("Home", "Seed", &["/ok", "/broken", "/gone"])).await;
    mount_page(&mock_server, "/ok", html_page("OK", "Fine", &[])).await;
    mount_status(&mock_server, "/broken", 500).await;
    mount_status(&mock_server, "/gone", 404).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server))
        .with_field(FieldKind::Title)
        .follow_links(3);

    let result = crawler.crawl(&request).await.unwrap();
    assert_eq!(linked_urls(&result), vec![format!("{}/ok", mock_server.uri())]);
    assert_eq!(result.pages_scraped, 2);
}

#[tokio::test]
async fn test_all_linked_pages_failing_omits_linked_pages() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", html_page("Home", "Seed", &["/a", "/b"])).await;
    mount_status(&mock_server, "/a", 500).await;
    mount_status(&mock_server, "/b", 503).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server))
        .with_field(FieldKind::Title)
        .follow_links(5);

    let result = crawler.crawl(&request).await.unwrap();
    assert!(result.linked_pages.is_none());
    assert_eq!(result.pages_scraped, 1);

    let json = render(&result, OutputFormat::Json).unwrap();
    assert!(!json.contains("linked_pages"));
}

#[tokio::test]
async fn test_cross_domain_links_are_not_followed() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html_page(
            "Home",
            "Seed",
            &[
                "https://elsewhere.example/x",
                "mailto:team@example.com",
                "/local",
            ],
        ),
    )
    .await;
    mount_page(&mock_server, "/local", html_page("Local", "Here", &[])).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server))
        .with_field(FieldKind::Title)
        .follow_links(5);

    let result = crawler.crawl(&request).await.unwrap();
    assert_eq!(linked_urls(&result), vec![format!("{}/local", mock_server.uri())]);
    assert_eq!(result.pages_scraped, 2);
}

#[tokio::test]
async fn test_duplicate_links_are_fetched_once() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", html_page("Home", "Seed", &["/a", "/a", "a", "/", "/b"])).await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_response(html_page("A", "First", &[])))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/b", html_page("B", "Second", &[])).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server))
        .with_field(FieldKind::Title)
        .follow_links(5);

    let result = crawler.crawl(&request).await.unwrap();
    let base = mock_server.uri();
    assert_eq!(
        linked_urls(&result),
        vec![format!("{}/a", base), format!("{}/b", base)]
    );
    assert_eq!(result.pages_scraped, 3);
}

#[tokio::test]
async fn test_depth_two_follows_grandchildren() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", html_page("Home", "Seed", &["/child"])).await;
    mount_page(&mock_server, "/child", html_page("Child", "Middle", &["/grandchild", "/"])).await;
    mount_page(&mock_server, "/grandchild", html_page("Grandchild", "Leaf", &[])).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server))
        .with_field(FieldKind::Title)
        .follow_links(5)
        .with_depth(2);

    let result = crawler.crawl(&request).await.unwrap();
    let base = mock_server.uri();
    assert_eq!(
        linked_urls(&result),
        vec![format!("{}/child", base), format!("{}/grandchild", base)]
    );
    assert_eq!(result.pages_scraped, 3);
}

#[tokio::test]
async fn test_seed_http_error_is_fatal() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/", 500).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server)).with_field(FieldKind::Title);

    let err = crawler.crawl(&request).await.unwrap_err();
    assert!(matches!(err, ScrapeError::Fetch { .. }));
    assert!(err.to_string().starts_with("An error occurred"));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_seed_timeout_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            html_response(html_page("Slow", "Slow", &[])).set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.http.fetch_timeout_secs = 1;
    let crawler = Crawler::new(config).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server)).with_field(FieldKind::Title);

    let err = crawler.crawl(&request).await.unwrap_err();
    assert!(matches!(err, ScrapeError::FetchTimeout { .. }));
}

#[tokio::test]
async fn test_empty_seed_document_is_a_parse_error() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", String::new()).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server)).with_field(FieldKind::Title);

    let err = crawler.crawl(&request).await.unwrap_err();
    assert!(matches!(err, ScrapeError::HtmlParse { .. }));
}

#[tokio::test]
async fn test_search_runs_on_every_page() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html_page("Home", "Rust is great. I like rust. RUST!", &["/other"]),
    )
    .await;
    mount_page(&mock_server, "/other", html_page("Other", "Nothing relevant", &[])).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server))
        .with_field(FieldKind::Title)
        .follow_links(1)
        .with_query("rust");

    let result = crawler.crawl(&request).await.unwrap();

    let seed_search = result.seed.search.as_ref().unwrap();
    assert!(seed_search.found);
    assert_eq!(seed_search.count, 3);
    assert_eq!(seed_search.snippets.len(), 3);

    let linked = result.linked_pages.as_ref().unwrap();
    let other_search = linked[0].search.as_ref().unwrap();
    assert!(!other_search.found);
    assert_eq!(other_search.count, 0);
    assert!(other_search.snippets.is_empty());
}

#[tokio::test]
async fn test_concurrent_fetches_keep_document_order() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", html_page("Home", "Seed", &["/slow", "/fast"])).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            html_response(html_page("Slow", "Slow", &[])).set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/fast", html_page("Fast", "Fast", &[])).await;

    let mut config = create_test_config();
    config.crawler.max_concurrent_fetches = 4;
    let crawler = Crawler::new(config).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server))
        .with_field(FieldKind::Title)
        .follow_links(2);

    let result = crawler.crawl(&request).await.unwrap();
    let base = mock_server.uri();
    assert_eq!(
        linked_urls(&result),
        vec![format!("{}/slow", base), format!("{}/fast", base)]
    );
}

#[tokio::test]
async fn test_config_file_drives_crawl() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        "<html><body><p>one</p><p>two</p><p>three</p></body></html>".to_string(),
    )
    .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[http]\nfetch-timeout-secs = 3\n\n[limits]\nparagraphs = 2\n"
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(config.http.fetch_timeout_secs, 3);

    let limits = FieldLimits::from(&config.limits);
    let crawler = Crawler::new(config).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server))
        .with_field(FieldKind::Paragraphs)
        .with_limits(limits);

    let result = crawler.crawl(&request).await.unwrap();
    assert_eq!(
        result.seed.fields.paragraphs.unwrap(),
        vec!["one".to_string(), "two".to_string()]
    );
}

#[tokio::test]
async fn test_robots_timeout_fails_open() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nDisallow: /\n")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/", html_page("Home", "Still fetched", &[])).await;

    let mut config = create_test_config();
    config.http.robots_timeout_secs = 1;

    let seed = Url::parse(&seed_url(&mock_server)).unwrap();
    let gate = RobotsGate::new(
        build_http_client(&config.http).unwrap(),
        config.http.robots_timeout(),
    );
    assert!(gate.is_allowed(&seed).await);

    let crawler = Crawler::new(config).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server)).with_field(FieldKind::Title);

    let result = crawler.crawl(&request).await.unwrap();
    assert_eq!(result.robots_verdict, RobotsVerdict::Unknown);
    assert!(result.robots_allowed);
    assert!(result.robots_txt.is_none());
    assert_eq!(result.seed.fields.title.as_deref(), Some("Home"));
}

#[tokio::test]
async fn test_robots_gate_reports_disallow() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config();
    let gate = RobotsGate::new(
        build_http_client(&config.http).unwrap(),
        config.http.robots_timeout(),
    );

    let base = mock_server.uri();
    let private = Url::parse(&format!("{}/private/page", base)).unwrap();
    let public = Url::parse(&format!("{}/public", base)).unwrap();
    assert!(!gate.is_allowed(&private).await);
    assert!(gate.is_allowed(&public).await);
}

#[tokio::test]
async fn test_anchor_cap_can_under_fill() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        html_page(
            "Home",
            "Seed",
            &[
                "https://elsewhere.example/1",
                "https://elsewhere.example/2",
                "https://elsewhere.example/3",
                "https://elsewhere.example/4",
                "/fifth",
            ],
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/fifth"))
        .respond_with(html_response(html_page("Fifth", "Beyond the cap", &[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server))
        .with_field(FieldKind::Title)
        .follow_links(2);

    let result = crawler.crawl(&request).await.unwrap();
    assert!(result.linked_pages.is_none());
    assert_eq!(result.pages_scraped, 1);
}

#[tokio::test]
async fn test_huge_linked_page_limit() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", html_page("Home", "Seed", &["/a"])).await;
    mount_page(&mock_server, "/a", html_page("A", "Only child", &[])).await;

    let crawler = Crawler::new(create_test_config()).unwrap();
    let request = CrawlRequest::new(seed_url(&mock_server))
        .with_field(FieldKind::Title)
        .follow_links(usize::MAX);

    let result = crawler.crawl(&request).await.unwrap();
    assert_eq!(linked_urls(&result), vec![format!("{}/a", mock_server.uri())]);
    assert_eq!(result.pages_scraped, 2);
}
