//! Preference scoring for sitemap candidates
//!
//! A score does two jobs: it orders the frontier (lower is visited sooner) and it
//! gates entry to the frontier (anything at or above [`DISCARD_THRESHOLD`] is
//! pruned without being fetched). Scorers only look at the URL's path and query
//! and never change after construction.

use crate::crawler::wellknown::{path_components, INDEX_PATHS, NEWS_PATHS};
use crate::url::split_path_query;
use regex::RegexSet;
use std::collections::HashMap;

/// Scores at or above this value are never visited
pub const DISCARD_THRESHOLD: f64 = 10.0;

/// Penalty per non-news section keyword in the path
pub const SECTION_PENALTY: f64 = 5.0;

/// Fixed score for an exact well-known news sitemap path
pub const KNOWN_NEWS_SCORE: f64 = -8.0;

/// Fixed score for an exact well-known sitemap index path
pub const KNOWN_INDEX_SCORE: f64 = -2.0;

/// Added to the score of well-known seeds that weren't discovered organically
pub const FALLBACK_PENALTY: f64 = 0.5;

/// Returns true if a candidate with this score must be pruned
///
/// NaN is treated as a discard.
pub fn is_discarded(score: f64) -> bool {
    !(score < DISCARD_THRESHOLD)
}

/// Maps a candidate URL to a visit preference
pub trait PreferenceScorer: Send + Sync {
    /// Lower is visited sooner; `>= DISCARD_THRESHOLD` is never visited
    fn score(&self, url: &str) -> f64;

    /// Extra score for well-known seeds added during bootstrap
    ///
    /// Keeps guessed paths behind robots.txt declarations of equal score.
    fn fallback_penalty(&self) -> f64 {
        FALLBACK_PENALTY
    }

    /// Short label for logs
    fn name(&self) -> &'static str;
}

/// Scores every URL the same, so the frontier degenerates to depth order
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformScorer;

impl PreferenceScorer for UniformScorer {
    fn score(&self, _url: &str) -> f64 {
        0.0
    }

    fn name(&self) -> &'static str {
        "uniform"
    }
}

/// Patterns recognizing per-day, per-year and paginated archive sitemaps
const CALENDAR_PATTERNS: &[&str] = &[
    // a plausible year standing on its own
    r"(^|[^0-9])(19[5-9][0-9]|20[0-4][0-9])([^0-9]|$)",
    // YYYY-MM-DD
    r"[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}",
    // DD-Mon-YY
    r"[0-9]{1,2}-(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*-[0-9]{2}",
    r"(^|[?&;])(date|year)=",
    r"sitemap[-_]?[0-9]+",
    r"page=[0-9]+",
    r"post[-_][0-9]+",
];

/// Path substrings marking sections that never hold the news feed
const SECTION_KEYWORDS: &[&str] = &[
    "author",
    "sports",
    "recipe",
    "weather",
    "tags",
    "video",
    "category",
    "categories",
    "topic",
    "image",
    "photo",
    "gallery",
    "podcast",
    "product",
    "event",
    "obituar",
    "classified",
    "horoscope",
    "real-estate",
    "jobs",
    "shop",
];

/// Additive weights for substrings of the path and query
const TOKEN_WEIGHTS: &[(&str, f64)] = &[
    ("news", -3.0),
    ("google", -1.0),
    ("latest", -1.0),
    ("recent", -1.0),
    ("index", -0.5),
    ("archive", 3.0),
    ("rss", 2.0),
    ("page", 1.0),
    (".html", 9.0),
];

/// Heuristic scorer that favors news-looking sitemaps and prunes archives
///
/// Rules are applied in order and the first decisive one wins:
///
/// 1. an exact well-known path gets a fixed low score
/// 2. a calendar or pagination pattern discards the candidate
/// 3. each non-news section keyword adds [`SECTION_PENALTY`]
/// 4. token weights are summed
pub struct HeuristicScorer {
    known_paths: HashMap<String, f64>,
    calendar: RegexSet,
    section_keywords: Vec<&'static str>,
    token_weights: Vec<(&'static str, f64)>,
}

impl HeuristicScorer {
    /// Builds the scorer with the built-in tables
    pub fn new() -> Result<Self, regex::Error> {
        let mut known_paths = HashMap::new();
        for path in path_components(INDEX_PATHS) {
            known_paths.insert(path, KNOWN_INDEX_SCORE);
        }
        for path in path_components(NEWS_PATHS) {
            known_paths.insert(path, KNOWN_NEWS_SCORE);
        }

        Ok(Self {
            known_paths,
            calendar: RegexSet::new(CALENDAR_PATTERNS)?,
            section_keywords: SECTION_KEYWORDS.to_vec(),
            token_weights: TOKEN_WEIGHTS.to_vec(),
        })
    }
}

impl PreferenceScorer for HeuristicScorer {
    fn score(&self, url: &str) -> f64 {
        let (path, query) = split_path_query(url);

        if let Some(score) = self.known_paths.get(&path) {
            return *score;
        }

        let lower_path = path.to_lowercase();
        let target = match &query {
            Some(q) => format!("{}?{}", lower_path, q.to_lowercase()),
            None => lower_path.clone(),
        };

        if self.calendar.is_match(&target) {
            return DISCARD_THRESHOLD;
        }

        let mut score = 0.0;
        for keyword in &self.section_keywords {
            if lower_path.contains(keyword) {
                score += SECTION_PENALTY;
                if is_discarded(score) {
                    return score;
                }
            }
        }

        for (token, weight) in &self.token_weights {
            if target.contains(token) {
                score += weight;
            }
        }
        score
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}
