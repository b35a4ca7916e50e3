//! Quick news-sitemap discovery without walking index documents
//!
//! This is the cheap first pass: only the sitemaps named in robots.txt and the
//! well-known news paths are fetched, and only urlsets carrying Google News tags
//! are reported.

use crate::crawler::fetcher::SitemapFetcher;
use crate::crawler::wellknown::{has_news_path, NEWS_PATHS};
use crate::sitemap::Sitemap;
use crate::url::{join_home_page, normalize_url};
use std::collections::HashMap;
use std::time::Duration;

/// Robots.txt hits above which only well-known news paths are kept
pub const DEFAULT_MAX_ROBOTS_PAGES: usize = 2;

/// Scans a site for news urlsets, without following index links
///
/// # Arguments
///
/// * `fetcher` - Source of robots.txt and sitemap documents
/// * `home_page` - The site's home page
/// * `max_robots_pages` - If robots.txt yields more news urlsets than this,
///   only those ending in a well-known news path are kept
/// * `timeout` - Per-request timeout
///
/// # Returns
///
/// The news urlset URLs found, deduplicated with [`unique_feeds`]
pub async fn find_news_fast<F: SitemapFetcher>(
    fetcher: &F,
    home_page: &str,
    max_robots_pages: usize,
    timeout: Duration,
) -> Vec<String> {
    let declared = match fetcher.robots_sitemaps(home_page, timeout).await {
        Ok(urls) => urls,
        Err(e) => {
            tracing::info!("robots.txt unavailable for {}: {}", home_page, e);
            Vec::new()
        }
    };

    let mut robots_urls = Vec::new();
    for url in declared {
        if is_news_urlset(fetcher, &url, timeout).await {
            robots_urls.push(url);
        }
    }

    if robots_urls.len() > max_robots_pages {
        tracing::info!(
            "{}: {} news urlsets in robots.txt, keeping well-known paths only",
            home_page,
            robots_urls.len()
        );
        robots_urls.retain(|url| has_news_path(url));
        tracing::info!("{}: {} left after pruning", home_page, robots_urls.len());
    }

    let mut found = robots_urls;
    for path in NEWS_PATHS {
        let url = join_home_page(home_page, path);
        if is_news_urlset(fetcher, &url, timeout).await {
            found.push(url);
        }
    }

    unique_feeds(found)
}

/// Fetches a URL and reports whether it is a urlset with news tags
async fn is_news_urlset<F: SitemapFetcher>(fetcher: &F, url: &str, timeout: Duration) -> bool {
    match fetcher.sitemap_get(url, timeout, true, 0).await {
        Ok(Sitemap::Urlset(urlset)) if urlset.google_news_tags => {
            tracing::info!("{} has google news tags", url);
            true
        }
        Ok(_) => false,
        Err(e) => {
            tracing::debug!("{}", e);
            false
        }
    }
}

/// Removes URLs that normalize to the same key
///
/// Input is sorted first so the output doesn't depend on input order. For each
/// key the lexically last spelling wins (so `https` beats `http` and `www.`
/// beats a bare host); keys keep the position of their first sorted spelling.
pub fn unique_feeds(mut urls: Vec<String>) -> Vec<String> {
    urls.sort();

    let mut order: Vec<String> = Vec::new();
    let mut chosen: HashMap<String, String> = HashMap::new();
    for url in urls {
        let key = normalize_url(&url);
        if !chosen.contains_key(&key) {
            order.push(key.clone());
        }
        chosen.insert(key, url);
    }

    order
        .into_iter()
        .filter_map(|key| chosen.remove(&key))
        .collect()
}
