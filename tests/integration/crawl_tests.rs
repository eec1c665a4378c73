//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive the real
//! `HttpFetcher` through full crawls end-to-end.

use crawly::config::{Config, UserAgentConfig};
use crawly::crawler::{crawl, Crawl, CrawlerConfig, HttpFetcher, PageResult};
use crawly::url::HostScope;
use crawly::FetchError;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_fetcher() -> Arc<HttpFetcher> {
    let agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: None,
    };
    Arc::new(HttpFetcher::from_config(&agent, Duration::from_secs(5)).expect("Failed to build client"))
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .expect(1)
        .mount(server)
        .await;
}

async fn collect(mut crawl: Crawl) -> Vec<PageResult> {
    let mut results = Vec::new();
    while let Some(result) = tokio::time::timeout(Duration::from_secs(30), crawl.next())
        .await
        .expect("Crawl did not terminate")
    {
        results.push(result);
    }
    results
}

fn find<'a>(results: &'a [PageResult], route: &str) -> &'a PageResult {
    results
        .iter()
        .find(|r| r.url.path() == route)
        .unwrap_or_else(|| panic!("No result for {}", route))
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="{}/page1">Page 1</a>
            <a href="page2">Page 2</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        r#"<html><body><a href="/">Home</a><a href="/page2#top">Page 2</a></body></html>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/page2",
        r#"<html><body><a href="/missing">Gone</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = CrawlerConfig::new(&format!("{}/", base_url), test_fetcher())
        .expect("Failed to create config")
        .with_concurrency(3);
    let results = collect(crawl(config).expect("Crawl failed to start")).await;

    // /, /page1, /page2 and /missing, each exactly once
    assert_eq!(results.len(), 4);

    let home = find(&results, "/");
    assert!(home.is_success());
    assert_eq!(home.link_count, 2);
    assert!(home.body.contains("<title>Home</title>"));

    let page1 = find(&results, "/page1");
    assert_eq!(page1.link_count, 2);

    let missing = find(&results, "/missing");
    assert_eq!(
        missing.error,
        Some(FetchError::Status {
            url: format!("{}/missing", base_url),
            status: 404
        })
    );
    assert_eq!(missing.link_count, 0);
    assert_eq!(missing.depth, 2);

    // Wiremock verifies the expect(1) counts when mock_server drops
}

#[tokio::test]
async fn test_two_links_then_close() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        &format!(
            r#"<html><a href="{0}/com">Link</a><a href="{0}/org">Another</a></html>"#,
            base_url
        ),
    )
    .await;
    mount_page(&mock_server, "/com", "").await;
    mount_page(&mock_server, "/org", "").await;

    let config = CrawlerConfig::new(&base_url, test_fetcher()).expect("Failed to create config");
    let results = collect(crawl(config).expect("Crawl failed to start")).await;

    assert_eq!(results.len(), 3);
    assert_eq!(find(&results, "/").link_count, 2);
    assert_eq!(find(&results, "/com").link_count, 0);
    assert_eq!(find(&results, "/org").link_count, 0);
    assert!(results.iter().all(|r| r.is_success()));
}

#[tokio::test]
async fn test_server_error_is_recorded_not_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", r#"<a href="/broken">x</a><a href="/ok">y</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string(r#"<a href="/never">never</a>"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/never"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/ok", "").await;

    let config = CrawlerConfig::new(&base_url, test_fetcher()).expect("Failed to create config");
    let results = collect(crawl(config).expect("Crawl failed to start")).await;

    assert_eq!(results.len(), 3);
    let broken = find(&results, "/broken");
    assert!(matches!(
        broken.error,
        Some(FetchError::Status { status: 500, .. })
    ));
    assert!(broken.body.is_empty());
    assert!(find(&results, "/ok").is_success());
}

#[tokio::test]
async fn test_timeout_and_refused_connection() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/slow">slow</a><a href="http://127.0.0.1:1/">refused</a><a href="/fast">fast</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/fast", "").await;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(300))
        .build()
        .expect("Failed to build client");
    let config = CrawlerConfig::new(&base_url, Arc::new(HttpFetcher::new(client)))
        .expect("Failed to create config");
    let results = collect(crawl(config).expect("Crawl failed to start")).await;

    assert_eq!(results.len(), 4);
    assert!(matches!(
        find(&results, "/slow").error,
        Some(FetchError::Timeout { .. })
    ));
    let refused = results
        .iter()
        .find(|r| r.url.port() == Some(1))
        .expect("No result for refused URL");
    assert!(matches!(refused.error, Some(FetchError::Transport { .. })));
    assert!(find(&results, "/fast").is_success());
}

#[tokio::test]
async fn test_same_host_scope() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let port = url::Url::parse(&base_url)
        .expect("Failed to parse base URL")
        .port()
        .expect("Mock server has no port");

    // Same server reached through a different host name
    let other_host = format!("http://localhost:{}/external", port);

    mount_page(
        &mock_server,
        "/",
        &format!(r#"<a href="{}">out</a><a href="/inside">in</a>"#, other_host),
    )
    .await;
    mount_page(&mock_server, "/inside", "").await;
    Mock::given(method("GET"))
        .and(path("/external"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = CrawlerConfig::new(&base_url, test_fetcher())
        .expect("Failed to create config")
        .with_scope(HostScope::SameHost);
    let results = collect(crawl(config).expect("Crawl failed to start")).await;

    assert_eq!(results.len(), 2);
    let home = find(&results, "/");
    assert_eq!(home.link_count, 2);
    assert_eq!(home.new_links, 1);
}

#[tokio::test]
async fn test_links_resolve_against_redirect_target() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "/docs/index.html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/docs/index.html",
        r#"<a href="index.html">self</a><a href="child.html">child</a>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/docs/child.html",
        r#"<a href="/docs/index.html">up</a>"#,
    )
    .await;

    let config = CrawlerConfig::new(&base_url, test_fetcher()).expect("Failed to create config");
    let results = collect(crawl(config).expect("Crawl failed to start")).await;

    // The redirect target counts as visited, so neither link back to it
    // triggers a second fetch
    assert_eq!(results.len(), 2);
    let home = find(&results, "/");
    assert_eq!(home.link_count, 2);
    assert_eq!(home.new_links, 1);
    let child = find(&results, "/docs/child.html");
    assert!(child.is_success());
    assert_eq!(child.depth, 1);
    assert_eq!(child.new_links, 0);
}

#[tokio::test]
async fn test_crawl_from_file_config() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "TestBot/2.0 (+https://example.com/bot)"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="/a">a</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .and(header("user-agent", "TestBot/2.0 (+https://example.com/bot)"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="/b">b</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config: Config = toml::from_str(&format!(
        r#"
[crawler]
seed = "{}/"
concurrency = 2
max-depth = 1
timeout-secs = 5

[user-agent]
crawler-name = "TestBot"
crawler-version = "2.0"
contact-url = "https://example.com/bot"
"#,
        base_url
    ))
    .expect("Failed to parse config");
    crawly::config::validate(&config).expect("Config should be valid");

    let crawler = CrawlerConfig::from_config(&config).expect("Failed to build crawler");
    let results = collect(crawl(crawler).expect("Crawl failed to start")).await;

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.is_success()));
    assert_eq!(find(&results, "/a").link_count, 1);
    assert_eq!(find(&results, "/a").new_links, 0);
}

#[tokio::test]
async fn test_missing_seed_is_config_error() {
    let config = Config::default();
    let result = CrawlerConfig::from_config(&config);
    assert!(matches!(result, Err(crawly::CrawlyError::Config(_))));
}
