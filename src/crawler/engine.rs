//! The crawl engine: a resumable, single-step sitemap tree walker
//!
//! A [`Crawler`] owns a [`CrawlSession`] and advances it one unit of work per
//! [`Crawler::step`] call. The first step reads robots.txt and seeds the
//! frontier; every later step visits exactly one sitemap. The session holds no
//! live resources, so it can be serialized between steps and resumed with
//! [`Crawler::resume`].

use crate::config::CrawlerConfig;
use crate::crawler::collector::ResultCollector;
use crate::crawler::fetcher::SitemapFetcher;
use crate::crawler::frontier::{Candidate, Frontier};
use crate::crawler::scorer::is_discarded;
use crate::crawler::strategy::{CrawlStrategy, CrawlVariant};
use crate::sitemap::{Index, Sitemap, Urlset};
use crate::url::{join_home_page, normalize_url};
use crate::CrawlError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Origin label for sitemaps declared in robots.txt
pub const ROBOTS_ORIGIN: &str = "robots.txt";

/// Depth assigned to well-known fallback seeds
pub const FALLBACK_DEPTH: u32 = 0;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrawlPhase {
    NotStarted,
    Bootstrapping,
    Visiting,
    /// The result quota was reached
    Done,
    /// The frontier ran dry
    Exhausted,
}

/// What a single step reports back to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Work remains in the frontier
    More,
    /// The result quota was reached on this step
    Done,
    /// The frontier is empty
    Fin,
}

/// Per-session crawl limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrawlSettings {
    /// Deepest index level whose children are expanded
    pub max_depth: u32,

    /// Accepted urlsets that end the crawl (0 = no limit)
    pub max_results: usize,

    /// Urlset parse cap on entries without news metadata (0 = no cap)
    pub max_non_news_urls: usize,

    /// Per-request timeout
    pub fetch_timeout: Duration,
}

impl CrawlSettings {
    /// Default limits for a variant
    pub fn for_variant(variant: CrawlVariant) -> Self {
        Self {
            max_depth: 4,
            max_results: variant.default_max_results(),
            max_non_news_urls: 0,
            fetch_timeout: Duration::from_secs(30),
        }
    }

    /// Limits taken from the `[crawler]` configuration section
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            max_results: config
                .max_results
                .unwrap_or_else(|| config.variant.default_max_results()),
            max_non_news_urls: config.max_non_news_urls,
            fetch_timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self::for_variant(CrawlVariant::default())
    }
}

/// Running totals for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlCounters {
    /// Steps that did work: the bootstrap plus every sitemap visit
    pub pages_visited: usize,
    pub fetch_failures: usize,
    /// Candidates pruned by the scorer
    pub discarded: usize,
    /// Candidates whose normalized URL had already been seen
    pub duplicates: usize,
    /// Index documents whose children were past the depth limit
    pub depth_cutoffs: usize,
    /// Urlsets the save filter turned away
    pub rejected: usize,
}

/// Everything needed to continue a crawl, minus the collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSession {
    pub home_page: String,
    pub settings: CrawlSettings,
    pub phase: CrawlPhase,
    pub frontier: Frontier,
    pub results: ResultCollector,
    pub counters: CrawlCounters,
}

impl CrawlSession {
    pub fn new(settings: CrawlSettings) -> Self {
        Self {
            home_page: String::new(),
            settings,
            phase: CrawlPhase::NotStarted,
            frontier: Frontier::new(),
            results: ResultCollector::new(settings.max_results),
            counters: CrawlCounters::default(),
        }
    }

    /// Clears all progress and points the session at a new home page
    fn reset(&mut self, home_page: String) {
        self.home_page = home_page;
        self.phase = CrawlPhase::Bootstrapping;
        self.frontier = Frontier::new();
        self.results = ResultCollector::new(self.settings.max_results);
        self.counters = CrawlCounters::default();
    }
}

/// Drives a [`CrawlSession`] with a fetcher and a strategy
pub struct Crawler<F> {
    fetcher: F,
    strategy: CrawlStrategy,
    session: CrawlSession,
}

impl<F: SitemapFetcher> Crawler<F> {
    /// Creates an idle crawler; call [`Crawler::start`] before stepping
    pub fn new(fetcher: F, strategy: CrawlStrategy, settings: CrawlSettings) -> Self {
        Self::resume(fetcher, strategy, CrawlSession::new(settings))
    }

    /// Continues a previously suspended session
    pub fn resume(fetcher: F, strategy: CrawlStrategy, session: CrawlSession) -> Self {
        Self {
            fetcher,
            strategy,
            session,
        }
    }

    /// Begins a fresh crawl of `home_page`, discarding any previous progress
    ///
    /// A trailing `/` is added if missing so that well-known paths can be
    /// appended directly.
    pub fn start(&mut self, home_page: &str) {
        let mut home_page = home_page.trim().to_string();
        if !home_page.ends_with('/') {
            home_page.push('/');
        }

        tracing::info!(
            "Starting crawl of {} ({} scorer, {} filter, max depth {})",
            home_page,
            self.strategy.scorer.name(),
            self.strategy.filter.name(),
            self.session.settings.max_depth
        );
        self.session.reset(home_page);
    }

    /// Performs exactly one unit of work
    ///
    /// # Returns
    ///
    /// * `Ok(StepOutcome::More)` - Call again
    /// * `Ok(StepOutcome::Done)` - The result quota was reached
    /// * `Ok(StepOutcome::Fin)` - Nothing left to visit
    /// * `Err(CrawlError)` - The session was not started or has already finished
    pub async fn step(&mut self) -> Result<StepOutcome, CrawlError> {
        match self.session.phase {
            CrawlPhase::NotStarted => return Err(CrawlError::NotStarted),
            phase @ (CrawlPhase::Done | CrawlPhase::Exhausted) => {
                return Err(CrawlError::Finished(phase))
            }
            CrawlPhase::Bootstrapping => self.bootstrap().await,
            CrawlPhase::Visiting => {
                if self.visit_next().await? {
                    return Ok(StepOutcome::Done);
                }
            }
        }

        if self.session.frontier.is_empty() {
            self.session.phase = CrawlPhase::Exhausted;
            tracing::info!(
                "Frontier exhausted for {} after {} pages",
                self.session.home_page,
                self.session.counters.pages_visited
            );
            Ok(StepOutcome::Fin)
        } else {
            Ok(StepOutcome::More)
        }
    }

    /// Steps until the session finishes, pausing between steps
    ///
    /// # Arguments
    ///
    /// * `pause` - Delay after every step that leaves work behind
    ///
    /// # Returns
    ///
    /// The final outcome, either `Done` or `Fin`
    pub async fn run(&mut self, pause: Duration) -> Result<StepOutcome, CrawlError> {
        loop {
            match self.step().await? {
                StepOutcome::More => {
                    if !pause.is_zero() {
                        tokio::time::sleep(pause).await;
                    }
                }
                outcome => return Ok(outcome),
            }
        }
    }

    /// Seeds the frontier from robots.txt and the well-known fallback paths
    async fn bootstrap(&mut self) {
        let home_page = self.session.home_page.clone();
        let timeout = self.session.settings.fetch_timeout;

        let declared = match self.fetcher.robots_sitemaps(&home_page, timeout).await {
            Ok(urls) => urls,
            Err(e) => {
                tracing::warn!("Could not read robots.txt for {}: {}", home_page, e);
                Vec::new()
            }
        };
        tracing::info!("robots.txt for {} declares {} sitemaps", home_page, declared.len());

        for url in declared {
            self.consider(url, 0, ROBOTS_ORIGIN.to_string(), 0.0);
        }

        let penalty = self.strategy.scorer.fallback_penalty();
        for (path, origin) in self.strategy.fallbacks.seeds() {
            let url = join_home_page(&home_page, path);
            self.consider(url, FALLBACK_DEPTH, origin.to_string(), penalty);
        }

        self.session.counters.pages_visited += 1;
        self.session.phase = CrawlPhase::Visiting;
        tracing::debug!("Bootstrap queued {} candidates", self.session.frontier.len());
    }

    /// Visits the best candidate
    ///
    /// # Returns
    ///
    /// `true` if the result quota was reached
    async fn visit_next(&mut self) -> Result<bool, CrawlError> {
        let candidate = self.session.frontier.pop_min()?;
        let settings = self.session.settings;
        let urlset_only = candidate.depth.saturating_add(1) > settings.max_depth;

        self.session.counters.pages_visited += 1;
        tracing::debug!(
            "Visiting {} (score {:.2}, depth {}, from {})",
            candidate.url,
            candidate.score,
            candidate.depth,
            candidate.origin
        );

        let fetched = self
            .fetcher
            .sitemap_get(
                &candidate.url,
                settings.fetch_timeout,
                urlset_only,
                settings.max_non_news_urls,
            )
            .await;

        match fetched {
            Ok(Sitemap::Index(index)) => {
                self.expand(&candidate, index);
                Ok(false)
            }
            Ok(Sitemap::Urlset(urlset)) => Ok(self.collect(&candidate, urlset)),
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch {} (depth {}, from {}): {}",
                    candidate.url,
                    candidate.depth,
                    candidate.origin,
                    e
                );
                self.session.counters.fetch_failures += 1;
                Ok(false)
            }
        }
    }

    /// Queues the children of an index, unless they would be too deep
    fn expand(&mut self, parent: &Candidate, index: Index) {
        let child_depth = parent.depth.saturating_add(1);
        if child_depth > self.session.settings.max_depth {
            tracing::debug!(
                "Not expanding {}: depth {} exceeds max depth {}",
                index.url,
                child_depth,
                self.session.settings.max_depth
            );
            self.session.counters.depth_cutoffs += 1;
            return;
        }

        let listed = index.sub_sitemap_urls.len();
        let origin = format!("{} -> {}", parent.origin, parent.url);
        let mut queued = 0;
        for child in index.sub_sitemap_urls {
            if self.consider(child, child_depth, origin.clone(), 0.0) {
                queued += 1;
            }
        }
        tracing::debug!("Index {} lists {} sitemaps, {} queued", index.url, listed, queued);
    }

    /// Hands a urlset to the collector; returns true when the quota is met
    fn collect(&mut self, candidate: &Candidate, urlset: Urlset) -> bool {
        let before = self.session.results.len();
        let quota_reached =
            self.session
                .results
                .save(self.strategy.filter.as_ref(), urlset, candidate.score);

        if self.session.results.len() == before {
            self.session.counters.rejected += 1;
        }

        if quota_reached {
            self.session.phase = CrawlPhase::Done;
            tracing::info!(
                "Result quota of {} reached for {} after {} pages",
                self.session.results.max_results(),
                self.session.home_page,
                self.session.counters.pages_visited
            );
        }
        quota_reached
    }

    /// Dedups, scores and (unless pruned) queues a discovered URL
    ///
    /// # Returns
    ///
    /// `true` if the URL entered the frontier
    fn consider(&mut self, url: String, depth: u32, origin: String, penalty: f64) -> bool {
        if !self.session.frontier.mark_seen(normalize_url(&url)) {
            self.session.counters.duplicates += 1;
            tracing::trace!("Already seen {}", url);
            return false;
        }

        let score = self.strategy.scorer.score(&url) + penalty;
        if is_discarded(score) {
            self.session.counters.discarded += 1;
            tracing::debug!("Discarded {} (score {:.2}, from {})", url, score, origin);
            return false;
        }

        self.session
            .frontier
            .push(Candidate::new(score, depth, url, origin));
        true
    }
}

impl<F> Crawler<F> {
    pub fn session(&self) -> &CrawlSession {
        &self.session
    }

    /// Detaches the session so it can be stored or handed elsewhere
    pub fn into_session(self) -> CrawlSession {
        self.session
    }

    pub fn phase(&self) -> CrawlPhase {
        self.session.phase
    }

    pub fn results(&self) -> &[Urlset] {
        self.session.results.results()
    }

    pub fn counters(&self) -> &CrawlCounters {
        &self.session.counters
    }

    pub fn strategy(&self) -> &CrawlStrategy {
        &self.strategy
    }
}
