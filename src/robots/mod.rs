//! Robots.txt handling module
//!
//! Only the `Sitemap:` directives matter here; Allow/Disallow rules are parsed by
//! `robotstxt` but not enforced.

mod parser;

pub use parser::RobotsSitemaps;

/// Returns the robots.txt URL for a home page
///
/// # Examples
///
/// ```
/// use sitemap_scout::robots::robots_txt_url;
///
/// assert_eq!(robots_txt_url("https://example.com"), "https://example.com/robots.txt");
/// ```
pub fn robots_txt_url(home_page: &str) -> String {
    crate::url::join_home_page(home_page, "robots.txt")
}

/// Extracts sitemap URLs from robots.txt content, in file order
///
/// # Arguments
///
/// * `content` - The raw robots.txt file content
///
/// # Returns
///
/// Every non-empty `Sitemap:` value. These may include RSS feeds or duplicates;
/// the crawl engine sorts that out.
pub fn extract_sitemaps(content: &str) -> Vec<String> {
    RobotsSitemaps::from_content(content).into_urls()
}
