//! URL handling module for Sitewalk
//!
//! This module turns command-line targets into seed URLs and derives the
//! per-URL pieces the crawler keys on: domain and origin.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, origin_of, robots_url};
pub use normalize::normalize_target;
