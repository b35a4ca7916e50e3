//! Configuration module for Sitemap-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Command-line flags are layered on top by the binary.
//!
//! # Example
//!
//! ```no_run
//! use sitemap_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scout.toml")).unwrap();
//! println!("Crawler will expand indexes down to depth {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::{validate, validate_crawler_config};
