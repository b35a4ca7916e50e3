//! Human-readable crawl statistics

use crate::output::CrawlReport;
use std::io::Write;

/// Prints the session counters in a formatted manner
///
/// # Arguments
///
/// * `out` - Destination, usually stderr so stdout stays machine-readable
/// * `report` - The report whose counters to display
pub fn print_statistics<W: Write>(out: &mut W, report: &CrawlReport) -> std::io::Result<()> {
    let counters = &report.counters;

    writeln!(out, "=== Crawl Statistics: {} ===", report.home_page)?;
    writeln!(out, "  Finished as: {:?}", report.phase)?;
    writeln!(out, "  Pages visited: {}", counters.pages_visited)?;
    writeln!(out, "  Fetch failures: {}", counters.fetch_failures)?;
    writeln!(out, "  Pruned by score: {}", counters.discarded)?;
    writeln!(out, "  Duplicates skipped: {}", counters.duplicates)?;
    writeln!(out, "  Indexes past max depth: {}", counters.depth_cutoffs)?;
    writeln!(out, "  Urlsets rejected: {}", counters.rejected)?;
    writeln!(out, "  Results: {}", report.results.len())?;

    let useful = counters.pages_visited.saturating_sub(counters.fetch_failures);
    let success_rate = if counters.pages_visited > 0 {
        (useful as f64 / counters.pages_visited as f64) * 100.0
    } else {
        0.0
    };
    writeln!(
        out,
        "  Success Rate: {:.1}% ({} / {} steps fetched something)",
        success_rate, useful, counters.pages_visited
    )?;
    Ok(())
}
