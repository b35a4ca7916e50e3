//! Well-known sitemap locations
//!
//! Many sites publish sitemaps they never declare in robots.txt. These tables
//! list the locations where such sitemaps have been found in practice, relative
//! to the home page.

use serde::{Deserialize, Serialize};

/// Paths which are not exposed in robots.txt but might still hold a sitemap index
pub const INDEX_PATHS: &[&str] = &[
    "sitemap.xml",
    "sitemap.xml.gz",
    "sitemap_index.xml",
    "sitemap-index.xml",
    "sitemap_index.xml.gz",
    "sitemap-index.xml.gz",
    ".sitemap.xml",
    "sitemap",
    "admin/config/search/xmlsitemap",
    "sitemap/sitemap-index.xml",
    // Arc XP sites (AJC, inquirer, elnuevodia, reuters)
    "arc/outboundfeeds/sitemap-index/?outputType=xml",
    "arc/outboundfeeds/news-sitemap-index/?outputType=xml",
];

/// Paths which might hold a Google News urlset, even if not in robots.txt
pub const NEWS_PATHS: &[&str] = &[
    "arc/outboundfeeds/news-sitemap/?outputType=xml",
    "arc/outboundfeeds/sitemap/latest/?outputType=xml",
    "feeds/sitemap_news.xml",
    "google-news-sitemap.xml",
    "googlenewssitemap.xml",
    "news-sitemap.xml",
    "news-sitemap-content.xml",
    "news/sitemap_news.xml",
    "sitemap_news.xml",
    "sitemap/news.xml",
    "sitemaps/news.xml",
    "sitemaps/new/news.xml.gz",
    "sitemaps/sitemap-google-news.xml",
    "tncms/sitemap/news.xml",
];

/// Origin label for seeds from [`INDEX_PATHS`]
pub const INDEX_ORIGIN: &str = "well-known index path";

/// Origin label for seeds from [`NEWS_PATHS`]
pub const NEWS_ORIGIN: &str = "well-known news path";

/// Which well-known tables are seeded during bootstrap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FallbackSet {
    /// Only robots.txt declarations
    None,
    /// Index-style paths only
    Index,
    /// News-sitemap paths only
    News,
    /// Both tables, index paths first
    #[default]
    Both,
}

impl FallbackSet {
    /// Returns `(relative path, origin label)` pairs in seeding order
    pub fn seeds(self) -> Vec<(&'static str, &'static str)> {
        let index = INDEX_PATHS.iter().map(|p| (*p, INDEX_ORIGIN));
        let news = NEWS_PATHS.iter().map(|p| (*p, NEWS_ORIGIN));
        match self {
            Self::None => Vec::new(),
            Self::Index => index.collect(),
            Self::News => news.collect(),
            Self::Both => index.chain(news).collect(),
        }
    }
}

/// Returns true if `url` ends with one of the well-known news paths
pub fn has_news_path(url: &str) -> bool {
    NEWS_PATHS.iter().any(|path| url.ends_with(path))
}

/// Path components (leading `/`, no query) of a well-known table
pub(crate) fn path_components(table: &[&str]) -> Vec<String> {
    table
        .iter()
        .map(|p| {
            let path = p.split('?').next().unwrap_or_default();
            format!("/{}", path)
        })
        .collect()
}
