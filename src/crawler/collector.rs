//! Result collection policy
//!
//! The collector decides which discovered urlsets count as results and tells
//! the engine when the result quota has been met.

use crate::sitemap::Urlset;
use serde::{Deserialize, Serialize};

/// Decides whether a discovered urlset is worth keeping
pub trait SaveFilter: Send + Sync {
    fn accepts(&self, urlset: &Urlset, score: f64) -> bool;

    /// Short label for logs
    fn name(&self) -> &'static str;
}

/// Keeps every urlset
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl SaveFilter for AcceptAll {
    fn accepts(&self, _urlset: &Urlset, _score: f64) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "all"
    }
}

/// Keeps only urlsets carrying Google News tags
#[derive(Debug, Clone, Copy, Default)]
pub struct NewsTagsOnly;

impl SaveFilter for NewsTagsOnly {
    fn accepts(&self, urlset: &Urlset, _score: f64) -> bool {
        urlset.google_news_tags
    }

    fn name(&self) -> &'static str {
        "news-tags"
    }
}

/// Accumulates accepted urlsets up to a quota
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultCollector {
    /// Quota; 0 means unlimited
    max_results: usize,
    results: Vec<Urlset>,
}

impl ResultCollector {
    pub fn new(max_results: usize) -> Self {
        Self {
            max_results,
            results: Vec::new(),
        }
    }

    /// Offers a urlset to the collector
    ///
    /// # Arguments
    ///
    /// * `filter` - Policy deciding whether the urlset counts
    /// * `urlset` - The discovered document
    /// * `score` - The score it was visited with
    ///
    /// # Returns
    ///
    /// `true` once the quota has been reached, `false` otherwise (including when
    /// the urlset was rejected)
    pub fn save(&mut self, filter: &dyn SaveFilter, urlset: Urlset, score: f64) -> bool {
        if !filter.accepts(&urlset, score) {
            tracing::debug!("{} filter rejected {}", filter.name(), urlset.url);
            return false;
        }

        if self.is_full() {
            // a finished session never calls save again, but don't overflow if it does
            return true;
        }

        tracing::info!(
            "Collected {} ({} entries, news tags: {})",
            urlset.url,
            urlset.size,
            urlset.google_news_tags
        );
        self.results.push(urlset);
        self.is_full()
    }

    /// True once the quota is met; never true when unlimited
    pub fn is_full(&self) -> bool {
        self.max_results > 0 && self.results.len() >= self.max_results
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub fn results(&self) -> &[Urlset] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
