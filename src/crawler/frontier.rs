//! The crawl frontier: a priority queue of unvisited sitemap candidates
//!
//! Candidates are popped best-first according to [`Candidate::visit_order`].
//! A separate seen set of normalized URLs guarantees that each sitemap is
//! considered at most once per session, even when it was pruned by the scorer.

use crate::CrawlError;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

/// A sitemap URL waiting to be visited
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Preference score (lower is visited sooner)
    pub score: f64,

    /// Number of index hops from the bootstrap seeds
    pub depth: u32,

    /// The sitemap URL as discovered
    pub url: String,

    /// Breadcrumb of how this URL was reached
    pub origin: String,
}

impl Candidate {
    pub fn new(score: f64, depth: u32, url: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            score,
            depth,
            url: url.into(),
            origin: origin.into(),
        }
    }

    /// Total order used by the frontier: score, then depth, then url, then origin
    ///
    /// Scores are compared with IEEE total ordering so NaN never breaks the heap.
    pub fn visit_order(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.depth.cmp(&other.depth))
            .then_with(|| self.url.cmp(&other.url))
            .then_with(|| self.origin.cmp(&other.origin))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.visit_order(other)
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.visit_order(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Serialized form of the heap: its candidates in visit order
#[derive(Serialize, Deserialize)]
struct QueueSnapshot(Vec<Candidate>);

/// Min-heap over candidates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "QueueSnapshot", into = "QueueSnapshot")]
struct CandidateQueue(BinaryHeap<Reverse<Candidate>>);

impl From<QueueSnapshot> for CandidateQueue {
    fn from(snapshot: QueueSnapshot) -> Self {
        Self(snapshot.0.into_iter().map(Reverse).collect())
    }
}

impl From<CandidateQueue> for QueueSnapshot {
    fn from(queue: CandidateQueue) -> Self {
        let mut candidates: Vec<Candidate> = queue.0.into_iter().map(|r| r.0).collect();
        candidates.sort_by(Candidate::visit_order);
        Self(candidates)
    }
}

/// Unvisited candidates plus the set of every normalized URL considered so far
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frontier {
    queue: CandidateQueue,
    seen: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a normalized URL as seen
    ///
    /// # Returns
    ///
    /// `true` if the key was new, `false` if it had already been seen
    pub fn mark_seen(&mut self, key: impl Into<String>) -> bool {
        self.seen.insert(key.into())
    }

    /// Returns true if the normalized URL has been seen this session
    pub fn is_seen(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Queues a candidate
    pub fn push(&mut self, candidate: Candidate) {
        tracing::trace!(
            "Queued {} (score {:.2}, depth {})",
            candidate.url,
            candidate.score,
            candidate.depth
        );
        self.queue.0.push(Reverse(candidate));
    }

    /// Removes and returns the best candidate
    ///
    /// # Returns
    ///
    /// * `Ok(Candidate)` - The candidate with the lowest [`Candidate::visit_order`]
    /// * `Err(CrawlError::EmptyFrontier)` - Nothing is queued
    pub fn pop_min(&mut self) -> Result<Candidate, CrawlError> {
        self.queue
            .0
            .pop()
            .map(|Reverse(candidate)| candidate)
            .ok_or(CrawlError::EmptyFrontier)
    }

    /// Returns the best candidate without removing it
    pub fn peek(&self) -> Option<&Candidate> {
        self.queue.0.peek().map(|Reverse(candidate)| candidate)
    }

    pub fn len(&self) -> usize {
        self.queue.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.0.is_empty()
    }

    /// Number of distinct normalized URLs seen
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
