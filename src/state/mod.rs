//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: the outcome recorded for each visited page, from a parsed
//!   HTML page through robots.txt exclusion to fetch failure

mod page_state;

pub use page_state::PageState;
