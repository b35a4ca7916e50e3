use crate::crawler::{CrawlCounters, CrawlPhase, CrawlSession};
use crate::sitemap::Urlset;
use crate::ScoutError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::time::Duration;

/// Compact description of a collected urlset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlsetSummary {
    pub url: String,

    /// Document size in characters
    pub size: usize,

    /// True if the urlset carries Google News tags
    pub gnews: bool,

    /// Number of page entries
    pub entries: usize,

    /// Most recent `<lastmod>` among the entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_lastmod: Option<String>,
}

impl From<&Urlset> for UrlsetSummary {
    fn from(urlset: &Urlset) -> Self {
        Self {
            url: urlset.url.clone(),
            size: urlset.size,
            gnews: urlset.google_news_tags,
            entries: urlset.entries.len(),
            last_lastmod: urlset.last_lastmod().map(str::to_string),
        }
    }
}

/// Everything the CLI reports about one finished crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub home_page: String,
    pub phase: CrawlPhase,
    pub pages_visited: usize,
    pub elapsed_secs: f64,
    pub counters: CrawlCounters,
    pub results: Vec<UrlsetSummary>,
}

impl CrawlReport {
    /// Builds a report from a finished (or suspended) session
    pub fn from_session(session: &CrawlSession, elapsed: Duration) -> Self {
        Self {
            home_page: session.home_page.clone(),
            phase: session.phase,
            pages_visited: session.counters.pages_visited,
            elapsed_secs: elapsed.as_secs_f64(),
            counters: session.counters,
            results: session
                .results
                .results()
                .iter()
                .map(UrlsetSummary::from)
                .collect(),
        }
    }

    /// The closing line printed after the result URLs
    pub fn summary_line(&self) -> String {
        format!(
            "pages visited: {}, elapsed: {:.2}s",
            self.pages_visited, self.elapsed_secs
        )
    }
}

/// Writes a report to `out`
///
/// Plain mode prints one result URL per line followed by the summary line.
/// JSON mode prints the whole report as a single JSON line.
pub fn write_report<W: Write>(
    out: &mut W,
    report: &CrawlReport,
    json: bool,
) -> Result<(), ScoutError> {
    if json {
        serde_json::to_writer(&mut *out, report)?;
        writeln!(out)?;
        return Ok(());
    }

    for result in &report.results {
        writeln!(out, "{}", result.url)?;
    }
    writeln!(out, "{}", report.summary_line())?;
    Ok(())
}
