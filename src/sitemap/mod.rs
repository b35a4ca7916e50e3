//! Sitemap documents and their XML classifier
//!
//! A fetched sitemap is either an [`Index`] (an internal tree node listing further
//! sitemaps) or a [`Urlset`] (a leaf listing content pages, possibly carrying
//! Google News metadata).

mod parser;

pub use parser::{parse_sitemap, ParseOptions, SitemapParseError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A classified sitemap document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Sitemap {
    Index(Index),
    Urlset(Urlset),
}

impl Sitemap {
    /// The URL the document was fetched from
    pub fn url(&self) -> &str {
        match self {
            Self::Index(index) => &index.url,
            Self::Urlset(urlset) => &urlset.url,
        }
    }
}

/// A `<sitemapindex>` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub url: String,

    /// Child sitemap URLs in document order, without duplicates
    pub sub_sitemap_urls: Vec<String>,

    pub fetched_at: DateTime<Utc>,
}

/// A `<urlset>` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Urlset {
    pub url: String,

    /// True if any `<news:*>` publication tag was seen
    pub google_news_tags: bool,

    /// Page entries that carried a `<loc>`
    pub entries: Vec<SitemapEntry>,

    /// Document size in characters
    pub size: usize,

    /// True if parsing stopped early because of the non-news entry cap
    #[serde(default)]
    pub truncated: bool,

    pub fetched_at: DateTime<Utc>,
}

impl Urlset {
    /// Returns the most recent `<lastmod>` value among the entries
    ///
    /// Values are compared as strings, which orders W3C datetimes correctly as
    /// long as the site is consistent about its format.
    pub fn last_lastmod(&self) -> Option<&str> {
        self.entries
            .iter()
            .filter_map(|entry| entry.lastmod.as_deref())
            .filter(|lastmod| !lastmod.is_empty())
            .max()
    }

    /// Number of entries carrying Google News metadata
    pub fn news_entry_count(&self) -> usize {
        self.entries.iter().filter(|e| e.news.is_some()).count()
    }
}

/// One `<url>` entry of a urlset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SitemapEntry {
    pub loc: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub changefreq: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub news: Option<NewsMetadata>,
}

/// Metadata from a Google News `<news:news>` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsMetadata {
    pub title: Option<String>,
    pub publication_date: Option<String>,
    pub publication_name: Option<String>,
    pub publication_language: Option<String>,
    pub access: Option<String>,
    pub keywords: Option<String>,
    pub stock_tickers: Option<String>,
}
