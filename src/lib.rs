//! Sitemap-Scout: a news sitemap finder
//!
//! This crate discovers a site's news sitemap starting from its home page. It walks
//! the tree of sitemap documents declared in robots.txt and found at well-known
//! paths, visiting the most promising documents first and pruning archive-style
//! branches before they are ever fetched.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod sitemap;
pub mod url;

use thiserror::Error;

/// Main error type for Sitemap-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid scoring pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Usage faults raised by the crawl engine
///
/// These are never retried; they indicate the caller drove the engine incorrectly.
#[derive(Debug, Error, PartialEq)]
pub enum CrawlError {
    #[error("step() called before start()")]
    NotStarted,

    #[error("frontier popped while empty")]
    EmptyFrontier,

    #[error("session already finished ({0:?})")]
    Finished(crawler::CrawlPhase),
}

/// Recoverable failures while fetching or classifying a single document
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode body of {url}: {source}")]
    Decode { url: String, source: std::io::Error },

    #[error("Parse error for {url}: {source}")]
    Parse {
        url: String,
        source: sitemap::SitemapParseError,
    },
}

impl FetchError {
    /// Returns the URL the failure relates to
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. }
            | Self::Status { url, .. }
            | Self::Decode { url, .. }
            | Self::Parse { url, .. } => url,
        }
    }

    /// True for DNS/connect/TLS/HTTP failures, false for malformed documents
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Status { .. })
    }
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlStrategy, Crawler, StepOutcome};
pub use sitemap::{Index, Sitemap, Urlset};
pub use url::normalize_url;
