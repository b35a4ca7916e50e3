//! URL handling module for Sitemap-Scout
//!
//! This module provides the canonical form used for seen-set membership and the
//! path/query split the preference scorer works on.

mod normalize;
mod path;

// Re-export main functions
pub use normalize::normalize_url;
pub use path::{join_home_page, split_path_query};
