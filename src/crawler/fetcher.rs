//! Sitemap fetching
//!
//! The crawl engine only talks to the network through the [`SitemapFetcher`]
//! trait. [`HttpFetcher`] is the production implementation:
//! - Building an HTTP client with a descriptive user agent string
//! - Fetching robots.txt and extracting its `Sitemap:` declarations
//! - Fetching sitemap documents, inflating gzipped bodies
//! - Classifying the body as an index or a urlset

use crate::config::UserAgentConfig;
use crate::robots::{extract_sitemaps, robots_txt_url};
use crate::sitemap::{parse_sitemap, ParseOptions, Sitemap};
use crate::FetchError;
use async_trait::async_trait;
use flate2::read::GzDecoder;
use reqwest::{redirect::Policy, Client};
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

/// Maximum number of redirects followed per request
const MAX_REDIRECTS: usize = 10;

/// Leading bytes of a gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Source of robots.txt declarations and classified sitemap documents
#[async_trait]
pub trait SitemapFetcher: Send + Sync {
    /// Returns the sitemap URLs declared in the site's robots.txt, in order
    async fn robots_sitemaps(
        &self,
        home_page: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, FetchError>;

    /// Fetches and classifies one sitemap document
    ///
    /// # Arguments
    ///
    /// * `url` - The sitemap URL
    /// * `timeout` - Per-request timeout
    /// * `urlset_only` - If true, an index document may be returned without children
    /// * `max_non_news_urls` - Stop parsing a urlset after this many entries
    ///   without news metadata (0 disables the cap)
    async fn sitemap_get(
        &self,
        url: &str,
        timeout: Duration,
        urlset_only: bool,
        max_non_news_urls: usize,
    ) -> Result<Sitemap, FetchError>;
}

#[async_trait]
impl<'a, T: SitemapFetcher + ?Sized> SitemapFetcher for &'a T {
    async fn robots_sitemaps(
        &self,
        home_page: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, FetchError> {
        (**self).robots_sitemaps(home_page, timeout).await
    }

    async fn sitemap_get(
        &self,
        url: &str,
        timeout: Duration,
        urlset_only: bool,
        max_non_news_urls: usize,
    ) -> Result<Sitemap, FetchError> {
        (**self)
            .sitemap_get(url, timeout, urlset_only, max_non_news_urls)
            .await
    }
}

#[async_trait]
impl<T: SitemapFetcher + ?Sized> SitemapFetcher for Arc<T> {
    async fn robots_sitemaps(
        &self,
        home_page: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, FetchError> {
        (**self).robots_sitemaps(home_page, timeout).await
    }

    async fn sitemap_get(
        &self,
        url: &str,
        timeout: Duration,
        urlset_only: bool,
        max_non_news_urls: usize,
    ) -> Result<Sitemap, FetchError> {
        (**self)
            .sitemap_get(url, timeout, urlset_only, max_non_news_urls)
            .await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitemap_scout::config::UserAgentConfig;
/// use sitemap_scout::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches sitemaps over HTTP(S) with `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from the user agent configuration
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// GETs a URL and returns the decoded body text
    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let transport = |source: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(transport)?;
        decode_body(url, &bytes)
    }
}

#[async_trait]
impl SitemapFetcher for HttpFetcher {
    async fn robots_sitemaps(
        &self,
        home_page: &str,
        timeout: Duration,
    ) -> Result<Vec<String>, FetchError> {
        let robots_url = robots_txt_url(home_page);
        tracing::debug!("Fetching {}", robots_url);

        match self.get_text(&robots_url, timeout).await {
            Ok(content) => Ok(extract_sitemaps(&content)),
            // a missing robots.txt simply declares nothing
            Err(FetchError::Status { status, .. }) => {
                tracing::debug!("{} returned HTTP {}", robots_url, status);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn sitemap_get(
        &self,
        url: &str,
        timeout: Duration,
        urlset_only: bool,
        max_non_news_urls: usize,
    ) -> Result<Sitemap, FetchError> {
        tracing::debug!("Fetching sitemap {}", url);
        let content = self.get_text(url, timeout).await?;

        let options = ParseOptions {
            urlset_only,
            max_non_news_urls,
        };
        parse_sitemap(url, &content, options).map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })
    }
}

/// Turns a response body into text, inflating it first if it is gzipped
///
/// Servers usually hand `.xml.gz` files out as opaque `application/x-gzip`
/// bodies rather than with a `Content-Encoding`, so the client's transparent
/// decompression does not apply to them.
fn decode_body(url: &str, bytes: &[u8]) -> Result<String, FetchError> {
    let text = if bytes.starts_with(&GZIP_MAGIC) {
        let mut inflated = Vec::new();
        GzDecoder::new(bytes)
            .read_to_end(&mut inflated)
            .map_err(|source| FetchError::Decode {
                url: url.to_string(),
                source,
            })?;
        String::from_utf8_lossy(&inflated).into_owned()
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestScout".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&create_test_config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_http_fetcher_new() {
        assert!(HttpFetcher::new(&create_test_config()).is_ok());
    }

    #[test]
    fn test_decode_plain_body() {
        let text = decode_body("https://example.com/a.xml", b"<urlset/>").unwrap();
        assert_eq!(text, "<urlset/>");
    }

    #[test]
    fn test_decode_gzip_body() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"<sitemapindex/>").unwrap();
        let compressed = encoder.finish().unwrap();

        let text = decode_body("https://example.com/a.xml.gz", &compressed).unwrap();
        assert_eq!(text, "<sitemapindex/>");
    }

    #[test]
    fn test_decode_truncated_gzip_is_error() {
        let result = decode_body("https://example.com/a.xml.gz", &[0x1f, 0x8b, 0x08]);
        assert!(matches!(result, Err(FetchError::Decode { .. })));
    }

    #[test]
    fn test_decode_strips_bom() {
        let text = decode_body("https://example.com/a.xml", "\u{feff}<urlset/>".as_bytes()).unwrap();
        assert_eq!(text, "<urlset/>");
    }
}
