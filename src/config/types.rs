use crate::crawler::{CrawlVariant, FallbackSet};
use serde::Deserialize;

/// Main configuration structure for Sitemap-Scout
///
/// Every field has a default, so an empty file (or no file at all) is valid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlerConfig {
    /// Maximum sitemap index depth to expand
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Number of accepted urlsets that ends a crawl (0 = no limit, variant default if unset)
    #[serde(rename = "max-results", default)]
    pub max_results: Option<usize>,

    /// Urlset parse cap on entries without news metadata (0 = no cap)
    #[serde(rename = "max-non-news-urls", default)]
    pub max_non_news_urls: usize,

    /// Pause between crawl steps (milliseconds)
    #[serde(rename = "sleep-ms", default = "default_sleep_ms")]
    pub sleep_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Crawl flavor: scorer and result filter
    #[serde(default)]
    pub variant: CrawlVariant,

    /// Well-known paths seeded next to robots.txt declarations
    #[serde(default)]
    pub fallbacks: FallbackSet,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_results: None,
            max_non_news_urls: 0,
            sleep_ms: default_sleep_ms(),
            timeout_secs: default_timeout_secs(),
            variant: CrawlVariant::default(),
            fallbacks: FallbackSet::default(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SitemapScout".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/sitemap-scout/sitemap-scout".to_string(),
            contact_email: "sitemap-scout@example.org".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

fn default_max_depth() -> u32 {
    4
}

fn default_sleep_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    30
}
