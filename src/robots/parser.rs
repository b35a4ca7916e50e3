//! Robots.txt parser implementation
//!
//! This module collects sitemap declarations using the robotstxt crate's
//! callback-driven parser.

use robotstxt::{parse_robotstxt, RobotsParseHandler};

/// Sitemap URLs declared in a robots.txt file
///
/// The parser is the same one Google's matcher uses, so BOMs, CR/LF variants and
/// HTML error pages served in place of robots.txt are tolerated: invalid lines
/// are simply skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsSitemaps {
    urls: Vec<String>,
}

impl RobotsSitemaps {
    /// Parses raw robots.txt content
    pub fn from_content(content: &str) -> Self {
        let mut handler = Self::default();
        parse_robotstxt(content, &mut handler);
        handler
    }

    /// Returns the declared sitemap URLs
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }
}

impl RobotsParseHandler for RobotsSitemaps {
    fn handle_robots_start(&mut self) {
        self.urls.clear();
    }

    fn handle_robots_end(&mut self) {}

    fn handle_user_agent(&mut self, _line_num: u32, _user_agent: &str) {}

    fn handle_allow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_disallow(&mut self, _line_num: u32, _value: &str) {}

    fn handle_sitemap(&mut self, _line_num: u32, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.urls.push(value.to_string());
        }
    }

    fn handle_unknown_action(&mut self, _line_num: u32, _action: &str, _value: &str) {}
}
