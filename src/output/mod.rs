//! Output module for reporting crawl results
//!
//! This module handles:
//! - Summarizing collected urlsets
//! - Writing results as plain URL lines or JSON
//! - Printing per-session crawl statistics

mod report;
pub mod stats;

pub use report::{write_report, CrawlReport, UrlsetSummary};
pub use stats::print_statistics;
