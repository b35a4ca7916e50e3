//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use flate2::write::GzEncoder;
use flate2::Compression;
use sitemap_scout::config::Config;
use sitemap_scout::crawler::{
    crawl_site, find_news_fast, CrawlPhase, CrawlVariant, FallbackSet, HttpFetcher,
    SitemapFetcher,
};
use sitemap_scout::{FetchError, Sitemap};
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

/// Creates a test configuration with no pause between steps
fn create_test_config(variant: CrawlVariant, fallbacks: FallbackSet) -> Config {
    let mut config = Config::default();
    config.crawler.variant = variant;
    config.crawler.fallbacks = fallbacks;
    config.crawler.sleep_ms = 0;
    config.crawler.timeout_secs = 5;
    config
}

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(&Config::default().user_agent).expect("Failed to build HTTP client")
}

fn news_urlset(base_url: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
        xmlns:news="http://www.google.com/schemas/sitemap-news/0.9">
  <url>
    <loc>{base}/story-1</loc>
    <lastmod>2024-05-02T08:00:00Z</lastmod>
    <news:news>
      <news:publication>
        <news:name>Example Times</news:name>
        <news:language>en</news:language>
      </news:publication>
      <news:publication_date>2024-05-02T08:00:00Z</news:publication_date>
      <news:title>First story</news:title>
    </news:news>
  </url>
  <url>
    <loc>{base}/story-2</loc>
    <news:news>
      <news:publication>
        <news:name>Example Times</news:name>
        <news:language>en</news:language>
      </news:publication>
      <news:title>Second story</news:title>
    </news:news>
  </url>
</urlset>"#,
        base = base_url
    )
}

fn plain_urlset(base_url: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{base}/about</loc></url>
  <url><loc>{base}/contact</loc></url>
</urlset>"#,
        base = base_url
    )
}

fn sitemap_index(children: &[String]) -> String {
    let entries: String = children
        .iter()
        .map(|child| format!("  <sitemap><loc>{}</loc></sitemap>\n", child))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</sitemapindex>",
        entries
    )
}

async fn mount_body(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_heuristic_crawl_finds_news_sitemap() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_body(
        &mock_server,
        "/robots.txt",
        format!("User-agent: *\nDisallow: /admin\nSitemap: {}/sitemap_index.xml\n", base_url),
    )
    .await;

    mount_body(
        &mock_server,
        "/sitemap_index.xml",
        sitemap_index(&[
            format!("{}/sitemap-2019.xml", base_url),
            format!("{}/page-sitemap.xml", base_url),
            format!("{}/sitemap-news.xml", base_url),
        ]),
    )
    .await;

    mount_body(&mock_server, "/sitemap-news.xml", news_urlset(&base_url)).await;

    // Archive-looking and lower-ranked sitemaps must never be fetched
    Mock::given(method("GET"))
        .and(path("/sitemap-2019.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(plain_urlset(&base_url)))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page-sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(plain_urlset(&base_url)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(CrawlVariant::Heuristic, FallbackSet::None);
    let crawl = crawl_site(fetcher(), &config, &base_url)
        .await
        .expect("Crawl failed");

    let session = crawl.session;
    assert_eq!(session.phase, CrawlPhase::Done);
    assert_eq!(session.home_page, format!("{}/", base_url));
    assert_eq!(session.counters.pages_visited, 3);
    assert_eq!(session.counters.discarded, 1);

    let results = session.results.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].url, format!("{}/sitemap-news.xml", base_url));
    assert!(results[0].google_news_tags);
    assert_eq!(results[0].entries.len(), 2);
}

#[tokio::test]
async fn test_missing_robots_falls_back_to_well_known_paths() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // robots.txt is not mounted, so the server answers 404
    mount_body(&mock_server, "/news-sitemap.xml", news_urlset(&base_url)).await;

    let config = create_test_config(CrawlVariant::Heuristic, FallbackSet::News);
    let crawl = crawl_site(fetcher(), &config, &base_url)
        .await
        .expect("Crawl failed");

    let session = crawl.session;
    assert_eq!(session.phase, CrawlPhase::Done);
    assert_eq!(
        session.results.results()[0].url,
        format!("{}/news-sitemap.xml", base_url)
    );
    assert!(session.counters.fetch_failures > 0);
}

#[tokio::test]
async fn test_full_crawl_collects_every_urlset() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_body(
        &mock_server,
        "/robots.txt",
        format!("Sitemap: {}/sitemap_index.xml\n", base_url),
    )
    .await;
    mount_body(
        &mock_server,
        "/sitemap_index.xml",
        sitemap_index(&[
            format!("{}/news.xml", base_url),
            format!("{}/pages.xml", base_url),
            format!("{}/broken.xml", base_url),
        ]),
    )
    .await;
    mount_body(&mock_server, "/news.xml", news_urlset(&base_url)).await;
    mount_body(&mock_server, "/pages.xml", plain_urlset(&base_url)).await;
    mount_body(&mock_server, "/broken.xml", "<html><body>oops</body></html>".to_string()).await;

    let mut config = create_test_config(CrawlVariant::Full, FallbackSet::None);
    config.crawler.max_results = Some(0);
    let crawl = crawl_site(fetcher(), &config, &base_url)
        .await
        .expect("Crawl failed");

    let session = crawl.session;
    assert_eq!(session.phase, CrawlPhase::Exhausted);

    let urls: Vec<&str> = session
        .results
        .results()
        .iter()
        .map(|u| u.url.as_str())
        .collect();
    assert_eq!(
        urls,
        vec![
            format!("{}/news.xml", base_url),
            format!("{}/pages.xml", base_url)
        ]
    );
    assert_eq!(session.counters.fetch_failures, 1);
}

#[tokio::test]
async fn test_depth_limit_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_body(
        &mock_server,
        "/robots.txt",
        format!("Sitemap: {}/sitemap_index.xml\n", base_url),
    )
    .await;
    mount_body(
        &mock_server,
        "/sitemap_index.xml",
        sitemap_index(&[format!("{}/news.xml", base_url)]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/news.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(news_urlset(&base_url)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(CrawlVariant::News, FallbackSet::None);
    config.crawler.max_depth = 0;
    let crawl = crawl_site(fetcher(), &config, &base_url)
        .await
        .expect("Crawl failed");

    assert_eq!(crawl.session.phase, CrawlPhase::Exhausted);
    assert!(crawl.session.results.is_empty());
    assert_eq!(crawl.session.counters.depth_cutoffs, 1);
}

#[tokio::test]
async fn test_gzipped_sitemap_is_inflated() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(news_urlset(&base_url).as_bytes())
        .expect("Failed to compress");
    let compressed = encoder.finish().expect("Failed to compress");

    Mock::given(method("GET"))
        .and(path("/sitemaps/new/news.xml.gz"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(compressed)
                .insert_header("content-type", "application/x-gzip"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/sitemaps/new/news.xml.gz", base_url);
    let sitemap = fetcher()
        .sitemap_get(&url, TIMEOUT, false, 0)
        .await
        .expect("Fetch failed");

    match sitemap {
        Sitemap::Urlset(urlset) => {
            assert!(urlset.google_news_tags);
            assert_eq!(urlset.entries.len(), 2);
        }
        other => panic!("Expected a urlset, got {:?}", other),
    }
}

#[tokio::test]
async fn test_robots_sitemaps_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_body(
        &mock_server,
        "/robots.txt",
        "User-agent: *\nSitemap: https://example.com/a.xml\nsitemap: https://example.com/b.xml\n"
            .to_string(),
    )
    .await;

    let urls = fetcher()
        .robots_sitemaps(&base_url, TIMEOUT)
        .await
        .expect("Fetch failed");
    assert_eq!(urls, vec!["https://example.com/a.xml", "https://example.com/b.xml"]);
}

#[tokio::test]
async fn test_missing_robots_is_empty() {
    let mock_server = MockServer::start().await;

    let urls = fetcher()
        .robots_sitemaps(&mock_server.uri(), TIMEOUT)
        .await
        .expect("404 should not be an error");
    assert!(urls.is_empty());
}

#[tokio::test]
async fn test_fetch_error_kinds() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/down.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;
    mount_body(&mock_server, "/feed.xml", "<rss><channel/></rss>".to_string()).await;

    let fetcher = fetcher();

    let down = fetcher
        .sitemap_get(&format!("{}/down.xml", base_url), TIMEOUT, false, 0)
        .await;
    assert!(matches!(down, Err(FetchError::Status { status: 503, .. })));

    let feed = fetcher
        .sitemap_get(&format!("{}/feed.xml", base_url), TIMEOUT, false, 0)
        .await;
    match feed {
        Err(e) => {
            assert!(matches!(e, FetchError::Parse { .. }));
            assert!(!e.is_transport());
            assert_eq!(e.url(), format!("{}/feed.xml", base_url));
        }
        Ok(other) => panic!("Expected a parse error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old-news.xml"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/news.xml", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;
    mount_body(&mock_server, "/news.xml", news_urlset(&base_url)).await;

    let sitemap = fetcher()
        .sitemap_get(&format!("{}/old-news.xml", base_url), TIMEOUT, false, 0)
        .await
        .expect("Fetch failed");
    assert!(matches!(sitemap, Sitemap::Urlset(ref u) if u.google_news_tags));
}

#[tokio::test]
async fn test_find_news_fast_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_body(
        &mock_server,
        "/robots.txt",
        format!(
            "Sitemap: {base}/sitemap_index.xml\nSitemap: {base}/custom-news.xml\n",
            base = base_url
        ),
    )
    .await;
    mount_body(
        &mock_server,
        "/sitemap_index.xml",
        sitemap_index(&[format!("{}/deep-news.xml", base_url)]),
    )
    .await;
    mount_body(&mock_server, "/custom-news.xml", news_urlset(&base_url)).await;
    mount_body(&mock_server, "/sitemap_news.xml", news_urlset(&base_url)).await;

    // index children are never followed
    Mock::given(method("GET"))
        .and(path("/deep-news.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(news_urlset(&base_url)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let found = find_news_fast(&fetcher(), &base_url, 2, TIMEOUT).await;
    assert_eq!(
        found,
        vec![
            format!("{}/custom-news.xml", base_url),
            format!("{}/sitemap_news.xml", base_url)
        ]
    );
}
