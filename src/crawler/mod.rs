//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a fixed politeness delay
//! - HTML link extraction
//! - The FIFO frontier and visited set
//! - Overall crawl coordination and cancellation

mod cancel;
mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use cancel::CancelHandle;
pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, FetchOutcome, Fetcher};
pub use frontier::{Admission, Frontier, FrontierEntry};
pub use parser::extract_links;

use crate::config::Config;
use crate::output::CrawlReport;
use crate::SitewalkError;
use url::Url;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Open the result sink
/// 3. Walk the site breadth-first from `seed`
/// 4. Close the sink and return a report
///
/// # Arguments
///
/// * `seed` - The URL to start from
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed successfully
/// * `Err(SitewalkError)` - Setup failed or the sink could not be written
pub async fn crawl(seed: Url, config: &Config) -> Result<CrawlReport, SitewalkError> {
    run_crawl(seed, config, CancelHandle::new()).await
}
