//! Crawl strategies: which scorer, which result filter and which fallback seeds

use crate::crawler::collector::{AcceptAll, NewsTagsOnly, SaveFilter};
use crate::crawler::scorer::{HeuristicScorer, PreferenceScorer, UniformScorer};
use crate::crawler::wellknown::FallbackSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named crawl flavors selectable from the CLI and config file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CrawlVariant {
    /// Visit everything breadth-first and keep every urlset
    Full,
    /// Visit everything breadth-first, keep only news urlsets
    News,
    /// Visit promising sitemaps first, prune archives, keep only news urlsets
    #[default]
    Heuristic,
}

impl CrawlVariant {
    /// Result quota used when none is configured (0 = no limit)
    pub fn default_max_results(self) -> usize {
        match self {
            Self::Full | Self::News => 0,
            Self::Heuristic => 1,
        }
    }
}

impl fmt::Display for CrawlVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Full => "full",
            Self::News => "news",
            Self::Heuristic => "heuristic",
        };
        f.write_str(name)
    }
}

/// The pluggable half of the engine: ordering, result policy and fallback seeds
pub struct CrawlStrategy {
    pub scorer: Box<dyn PreferenceScorer>,
    pub filter: Box<dyn SaveFilter>,
    pub fallbacks: FallbackSet,
}

impl CrawlStrategy {
    pub fn new(
        scorer: Box<dyn PreferenceScorer>,
        filter: Box<dyn SaveFilter>,
        fallbacks: FallbackSet,
    ) -> Self {
        Self {
            scorer,
            filter,
            fallbacks,
        }
    }

    /// Uniform scoring, every urlset kept
    pub fn full() -> Self {
        Self::new(Box::new(UniformScorer), Box::new(AcceptAll), FallbackSet::Both)
    }

    /// Uniform scoring, only news urlsets kept
    pub fn news() -> Self {
        Self::new(Box::new(UniformScorer), Box::new(NewsTagsOnly), FallbackSet::Both)
    }

    /// Heuristic scoring, only news urlsets kept
    pub fn heuristic() -> Result<Self, regex::Error> {
        Ok(Self::new(
            Box::new(HeuristicScorer::new()?),
            Box::new(NewsTagsOnly),
            FallbackSet::Both,
        ))
    }

    /// Builds the strategy for a named variant
    pub fn for_variant(variant: CrawlVariant) -> Result<Self, regex::Error> {
        match variant {
            CrawlVariant::Full => Ok(Self::full()),
            CrawlVariant::News => Ok(Self::news()),
            CrawlVariant::Heuristic => Self::heuristic(),
        }
    }

    /// Replaces the fallback seed selection
    pub fn with_fallbacks(mut self, fallbacks: FallbackSet) -> Self {
        self.fallbacks = fallbacks;
        self
    }
}

impl fmt::Debug for CrawlStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrawlStrategy")
            .field("scorer", &self.scorer.name())
            .field("filter", &self.filter.name())
            .field("fallbacks", &self.fallbacks)
            .finish()
    }
}
