//! XML sitemap classifier
//!
//! Streams the document with `quick-xml`'s namespace-aware reader. Elements in the
//! sitemaps.org namespace (or in no namespace at all) are treated as sitemap tags,
//! elements in the Google News namespace as news tags, and everything else
//! (images, video, xhtml links) is ignored.

use super::{Index, NewsMetadata, Sitemap, SitemapEntry, Urlset};
use chrono::Utc;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

/// Reasons a document could not be classified as a sitemap
#[derive(Debug, Error)]
pub enum SitemapParseError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),

    #[error("document has no root element")]
    Empty,

    #[error("nested <url> element")]
    NestedUrl,
}

/// Hints from the crawl engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// The caller will not expand an index, so its children need not be read
    pub urlset_only: bool,

    /// Stop reading a urlset once more than this many entries without news
    /// metadata have been seen; 0 disables the cap
    pub max_non_news_urls: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ns {
    Sitemap,
    News,
    Other,
}

fn classify_namespace(resolved: &ResolveResult) -> Ns {
    match resolved {
        ResolveResult::Bound(Namespace(ns)) => {
            if contains(ns, b"/sitemap-news/") {
                Ns::News
            } else if contains(ns, b"/sitemap/") {
                Ns::Sitemap
            } else {
                Ns::Other
            }
        }
        ResolveResult::Unbound => Ns::Sitemap,
        ResolveResult::Unknown(_) => Ns::Other,
    }
}

/// Google News elements whose presence marks a urlset as a news sitemap
fn is_publication_tag(name: &str) -> bool {
    matches!(
        name,
        "name" | "language" | "publication_date" | "keywords" | "stock_tickers"
    )
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

fn is_http_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

/// Outcome of handling one closing tag
enum Flow {
    Continue,
    Stop,
}

#[derive(Default)]
struct IndexBuilder {
    sub_sitemap_urls: Vec<String>,
    seen: HashSet<String>,
}

impl IndexBuilder {
    fn end(&mut self, ns: Ns, name: &str, text: &str) {
        if ns != Ns::Sitemap || name != "loc" {
            return;
        }
        let sub_sitemap_url = text.trim();
        if !is_http_url(sub_sitemap_url) {
            tracing::warn!("Sub-sitemap URL does not look like one: {}", sub_sitemap_url);
            return;
        }
        if self.seen.insert(sub_sitemap_url.to_string()) {
            self.sub_sitemap_urls.push(sub_sitemap_url.to_string());
        }
    }
}

#[derive(Default)]
struct UrlsetBuilder {
    current: Option<SitemapEntry>,
    entries: Vec<SitemapEntry>,
    seen: HashSet<String>,
    google_news_tags: bool,
    non_news: usize,
    max_non_news: usize,
    truncated: bool,
}

impl UrlsetBuilder {
    fn start(&mut self, ns: Ns, name: &str) -> Result<(), SitemapParseError> {
        if ns == Ns::Sitemap && name == "url" {
            if self.current.is_some() {
                return Err(SitemapParseError::NestedUrl);
            }
            self.current = Some(SitemapEntry::default());
        }
        Ok(())
    }

    fn end(&mut self, ns: Ns, name: &str, text: &str) -> Flow {
        if ns == Ns::Sitemap && name == "url" {
            return self.finish_entry();
        }

        let value = text.trim();
        let Some(entry) = self.current.as_mut() else {
            return Flow::Continue;
        };
        // <news:title> and <news:access> alone don't mark a news sitemap
        if ns == Ns::News && is_publication_tag(name) {
            self.google_news_tags = true;
        }
        if value.is_empty() {
            return Flow::Continue;
        }
        let value = Some(value.to_string());

        match ns {
            Ns::Sitemap => match name {
                "loc" => entry.loc = value.unwrap_or_default(),
                "lastmod" => entry.lastmod = value,
                "changefreq" => entry.changefreq = value,
                "priority" => entry.priority = value,
                _ => {}
            },
            Ns::News => {
                let news = entry.news.get_or_insert_with(NewsMetadata::default);
                match name {
                    "name" => news.publication_name = value,
                    "language" => news.publication_language = value,
                    "publication_date" => news.publication_date = value,
                    "keywords" => news.keywords = value,
                    "stock_tickers" => news.stock_tickers = value,
                    "title" => news.title = value,
                    "access" => news.access = value,
                    _ => {}
                }
            }
            Ns::Other => {}
        }
        Flow::Continue
    }

    fn finish_entry(&mut self) -> Flow {
        let Some(entry) = self.current.take() else {
            return Flow::Continue;
        };
        if entry.loc.is_empty() || !self.seen.insert(entry.loc.clone()) {
            return Flow::Continue;
        }

        if entry.news.is_none() {
            self.non_news += 1;
        }
        self.entries.push(entry);

        if self.max_non_news > 0 && self.non_news > self.max_non_news {
            self.truncated = true;
            return Flow::Stop;
        }
        Flow::Continue
    }
}

enum Builder {
    Index(IndexBuilder),
    Urlset(UrlsetBuilder),
}

/// Parses and classifies a sitemap document
///
/// # Arguments
///
/// * `url` - The URL the document was fetched from (recorded on the result)
/// * `content` - The decoded document text
/// * `options` - Early-exit hints from the crawl engine
///
/// # Returns
///
/// * `Ok(Sitemap)` - An index or urlset
/// * `Err(SitemapParseError)` - Malformed XML or a non-sitemap root element
///
/// # Example
///
/// ```
/// use sitemap_scout::sitemap::{parse_sitemap, ParseOptions, Sitemap};
///
/// let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <sitemap><loc>https://example.com/news.xml</loc></sitemap>
/// </sitemapindex>"#;
/// let sitemap = parse_sitemap("https://example.com/sitemap.xml", xml, ParseOptions::default()).unwrap();
/// assert!(matches!(sitemap, Sitemap::Index(_)));
/// ```
pub fn parse_sitemap(
    url: &str,
    content: &str,
    options: ParseOptions,
) -> Result<Sitemap, SitemapParseError> {
    let mut reader = NsReader::from_str(content);
    let mut builder: Option<Builder> = None;
    let mut text = String::new();

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let ns = classify_namespace(&resolved);

        let (name, opens, closes) = match &event {
            Event::Start(e) => (local_name(e.local_name().as_ref()), true, false),
            Event::Empty(e) => (local_name(e.local_name().as_ref()), true, true),
            Event::End(e) => (local_name(e.local_name().as_ref()), false, true),
            Event::Text(t) => {
                match t.unescape() {
                    Ok(unescaped) => text.push_str(&unescaped),
                    Err(_) => text.push_str(&String::from_utf8_lossy(t)),
                }
                continue;
            }
            Event::CData(c) => {
                text.push_str(&String::from_utf8_lossy(c));
                continue;
            }
            Event::Eof => break,
            _ => continue,
        };

        if opens {
            text.clear();
            match builder.as_mut() {
                None => {
                    let root = match (ns, name.as_str()) {
                        (Ns::Sitemap, "urlset") => Builder::Urlset(UrlsetBuilder {
                            max_non_news: options.max_non_news_urls,
                            ..UrlsetBuilder::default()
                        }),
                        (Ns::Sitemap, "sitemapindex") => Builder::Index(IndexBuilder::default()),
                        _ => return Err(SitemapParseError::UnexpectedRoot(name)),
                    };
                    let skip_children = options.urlset_only && matches!(root, Builder::Index(_));
                    builder = Some(root);
                    if skip_children {
                        tracing::debug!("{}: index will not be expanded, skipping children", url);
                        break;
                    }
                }
                Some(Builder::Urlset(urlset)) => urlset.start(ns, &name)?,
                Some(Builder::Index(_)) => {}
            }
        }

        if closes {
            let flow = match builder.as_mut() {
                Some(Builder::Urlset(urlset)) => urlset.end(ns, &name, &text),
                Some(Builder::Index(index)) => {
                    index.end(ns, &name, &text);
                    Flow::Continue
                }
                None => Flow::Continue,
            };
            text.clear();
            if let Flow::Stop = flow {
                tracing::debug!("{}: non-news entry cap reached, stopping early", url);
                break;
            }
        }
    }

    let fetched_at = Utc::now();
    match builder {
        Some(Builder::Index(index)) => Ok(Sitemap::Index(Index {
            url: url.to_string(),
            sub_sitemap_urls: index.sub_sitemap_urls,
            fetched_at,
        })),
        Some(Builder::Urlset(urlset)) => Ok(Sitemap::Urlset(Urlset {
            url: url.to_string(),
            google_news_tags: urlset.google_news_tags,
            entries: urlset.entries,
            size: content.chars().count(),
            truncated: urlset.truncated,
            fetched_at,
        })),
        None => Err(SitemapParseError::Empty),
    }
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}
