//! Crawler module for sitemap discovery
//!
//! This module contains the core crawling logic, including:
//! - Candidate scoring and pruning
//! - The priority frontier with its seen set
//! - The single-step crawl engine
//! - Result collection policies
//! - HTTP fetching behind the `SitemapFetcher` seam
//! - A fast discovery pass over robots.txt and well-known paths

mod collector;
mod discover;
mod engine;
mod fetcher;
mod frontier;
mod scorer;
mod strategy;
mod wellknown;

pub use collector::{AcceptAll, NewsTagsOnly, ResultCollector, SaveFilter};
pub use discover::{find_news_fast, unique_feeds, DEFAULT_MAX_ROBOTS_PAGES};
pub use engine::{
    CrawlCounters, CrawlPhase, CrawlSession, CrawlSettings, Crawler, StepOutcome, FALLBACK_DEPTH,
    ROBOTS_ORIGIN,
};
pub use fetcher::{build_http_client, HttpFetcher, SitemapFetcher};
pub use frontier::{Candidate, Frontier};
pub use scorer::{
    is_discarded, HeuristicScorer, PreferenceScorer, UniformScorer, DISCARD_THRESHOLD,
    FALLBACK_PENALTY, KNOWN_INDEX_SCORE, KNOWN_NEWS_SCORE, SECTION_PENALTY,
};
pub use strategy::{CrawlStrategy, CrawlVariant};
pub use wellknown::{has_news_path, FallbackSet, INDEX_ORIGIN, INDEX_PATHS, NEWS_ORIGIN, NEWS_PATHS};

use crate::config::Config;
use crate::ScoutError;
use std::time::{Duration, Instant};

/// Outcome of crawling one site
#[derive(Debug)]
pub struct SiteCrawl {
    pub session: CrawlSession,
    pub elapsed: Duration,
}

/// Runs a complete crawl of one home page
///
/// This is the main entry point for a configured crawl. It will:
/// 1. Build the strategy for the configured variant
/// 2. Start a session at `home_page`
/// 3. Step until the quota is met or the frontier is empty, sleeping between steps
///
/// # Arguments
///
/// * `fetcher` - Source of robots.txt and sitemap documents
/// * `config` - The crawler configuration
/// * `home_page` - The site's home page
///
/// # Returns
///
/// * `Ok(SiteCrawl)` - The finished session and how long it took
/// * `Err(ScoutError)` - The strategy could not be built
pub async fn crawl_site<F: SitemapFetcher>(
    fetcher: F,
    config: &Config,
    home_page: &str,
) -> Result<SiteCrawl, ScoutError> {
    let strategy =
        CrawlStrategy::for_variant(config.crawler.variant)?.with_fallbacks(config.crawler.fallbacks);
    let settings = CrawlSettings::from_config(&config.crawler);

    let started = Instant::now();
    let mut crawler = Crawler::new(fetcher, strategy, settings);
    crawler.start(home_page);
    crawler
        .run(Duration::from_millis(config.crawler.sleep_ms))
        .await?;

    Ok(SiteCrawl {
        session: crawler.into_session(),
        elapsed: started.elapsed(),
    })
}
