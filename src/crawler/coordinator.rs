//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Managing the frontier queue and visited set
//! - Consulting robots.txt per origin
//! - Coordinating fetching and link extraction
//! - Streaming every visited URL to the result sink

use crate::config::Config;
use crate::crawler::cancel::CancelHandle;
use crate::crawler::fetcher::{build_http_client, FetchOutcome, Fetcher};
use crate::crawler::frontier::{Admission, Frontier, FrontierEntry};
use crate::crawler::parser::extract_links;
use crate::output::{open_sink, CrawlReport, ResultSink};
use crate::robots::RobotsChecker;
use crate::state::PageState;
use crate::url::{extract_domain, origin_of};
use crate::{SitewalkError, UrlError};
use std::collections::HashMap;
use std::time::Instant;
use url::Url;

/// Pages between progress reports
const PROGRESS_INTERVAL: u64 = 10;

/// One crawl session
///
/// Owns the frontier, the visited set, the robots.txt cache and the result
/// sink. Everything runs on the caller's task, one page at a time, so at most
/// one request is in flight.
pub struct Coordinator {
    seed: Url,
    frontier: Frontier,
    fetcher: Fetcher,
    robots: RobotsChecker,
    sink: Box<dyn ResultSink>,
    cancel: CancelHandle,
    pages_by_state: HashMap<PageState, u64>,
    links_discovered: u64,
    skipped_duplicates: u64,
    skipped_depth: u64,
}

impl Coordinator {
    /// Creates a new crawl session
    ///
    /// Builds the HTTP client and opens the result sink (creating the output
    /// directory). Any failure here is fatal: nothing has been crawled yet.
    ///
    /// # Arguments
    ///
    /// * `seed` - The URL to start from (depth 0)
    /// * `config` - Validated crawler and output configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Session ready to run
    /// * `Err(SitewalkError)` - Client or sink could not be set up
    pub fn new(seed: Url, config: &Config) -> Result<Self, SitewalkError> {
        let host = extract_domain(&seed).ok_or(UrlError::MissingDomain)?;

        let client = build_http_client(config.crawler.request_timeout_duration())?;
        let sink = open_sink(&config.output.directory, &host, config.output.format)?;
        tracing::info!("Writing visited URLs to {}", sink.path().display());

        let fetcher = Fetcher::new(
            client.clone(),
            config.crawler.user_agent.clone(),
            config.crawler.delay_duration(),
        );
        let robots = RobotsChecker::new(client);

        let mut frontier = Frontier::new(config.crawler.max_depth);
        frontier.push(seed.clone(), 0);

        Ok(Self {
            seed,
            frontier,
            fetcher,
            robots,
            sink,
            cancel: CancelHandle::new(),
            pages_by_state: HashMap::new(),
            links_discovered: 0,
            skipped_duplicates: 0,
            skipped_depth: 0,
        })
    }

    /// Replaces the session's cancellation handle with a shared one
    pub fn with_cancel_handle(mut self, cancel: CancelHandle) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns a handle that stops this session when cancelled
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Swaps in a different result sink
    #[cfg(test)]
    pub(crate) fn with_sink(mut self, sink: Box<dyn ResultSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Read access to the frontier and visited set
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Runs the main crawl loop
    ///
    /// Each iteration:
    /// 1. Stops if cancellation was requested
    /// 2. Takes the next entry off the frontier; skips it if already visited
    ///    or too deep
    /// 3. Checks robots.txt for the URL's origin
    /// 4. Fetches the page and enqueues its links at depth + 1
    /// 5. Appends the URL to the sink
    ///
    /// Robots-disallowed pages are not fetched but are still recorded and
    /// written. Fetch failures only cost the page its links.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The frontier drained or the crawl was cancelled;
    ///   the sink has been closed
    /// * `Err(SitewalkError)` - A sink write failed; the sink is left as is
    pub async fn run(&mut self) -> Result<CrawlReport, SitewalkError> {
        tracing::info!(
            "Starting crawl of {} (max depth {})",
            self.seed,
            self.frontier.max_depth()
        );

        let start_time = Instant::now();
        let mut pages_crawled: u64 = 0;
        let mut cancelled = false;

        loop {
            if self.cancel.is_cancelled() {
                tracing::warn!(
                    "Crawl cancelled with {} entries left in the frontier",
                    self.frontier.len()
                );
                cancelled = true;
                break;
            }

            let entry = match self.frontier.next() {
                Some(Admission::Accepted(entry)) => entry,
                Some(Admission::AlreadyVisited(entry)) => {
                    tracing::trace!("Already visited: {}", entry.url);
                    self.skipped_duplicates += 1;
                    continue;
                }
                Some(Admission::TooDeep(entry)) => {
                    tracing::trace!("Depth {} too deep: {}", entry.depth, entry.url);
                    self.skipped_depth += 1;
                    continue;
                }
                None => {
                    tracing::info!("Frontier is empty, crawl complete");
                    break;
                }
            };

            let state = self.process_url(&entry).await;

            if let Err(e) = self.sink.append(entry.url.as_str()) {
                tracing::error!(
                    "Failed to write {} to {}: {}",
                    entry.url,
                    self.sink.path().display(),
                    e
                );
                return Err(e.into());
            }

            *self.pages_by_state.entry(state).or_insert(0) += 1;
            pages_crawled += 1;

            if pages_crawled % PROGRESS_INTERVAL == 0 {
                let elapsed = start_time.elapsed();
                let rate = pages_crawled as f64 / elapsed.as_secs_f64();
                tracing::info!(
                    "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
                    pages_crawled,
                    self.frontier.len(),
                    rate
                );
            }
        }

        self.sink.close()?;

        tracing::info!(
            "Crawl finished: {} pages crawled in {:?}",
            pages_crawled,
            start_time.elapsed()
        );
        tracing::debug!(
            "robots.txt consulted for {} origin(s)",
            self.robots.cached_origins()
        );

        Ok(CrawlReport {
            seed: self.seed.to_string(),
            output_path: self.sink.path().to_path_buf(),
            format: self.sink.format(),
            pages_by_state: self.pages_by_state.clone(),
            records_written: self.sink.records_written(),
            links_discovered: self.links_discovered,
            skipped_duplicates: self.skipped_duplicates,
            skipped_depth: self.skipped_depth,
            robots_origins: self.robots.cached_origins() as u64,
            elapsed: start_time.elapsed(),
            cancelled,
        })
    }

    /// Processes a single accepted URL
    ///
    /// Never fails: robots and fetch problems are absorbed into the
    /// returned state.
    async fn process_url(&mut self, entry: &FrontierEntry) -> PageState {
        tracing::info!("Crawling: {} (depth {})", entry.url, entry.depth);

        if let Some(origin) = origin_of(&entry.url) {
            if !self.robots.allowed(&entry.url, &origin).await {
                tracing::info!("Skipping URL: {}. Not allowed by robots.txt.", entry.url);
                return PageState::RobotsDisallowed;
            }
        }

        match self.fetcher.fetch(&entry.url).await {
            FetchOutcome::Content { body, final_url } => {
                let links = extract_links(&body, &final_url);
                tracing::debug!("Found {} links on {}", links.len(), entry.url);

                for link in links {
                    self.frontier.push(link, entry.depth + 1);
                    self.links_discovered += 1;
                }
                PageState::Fetched
            }
            FetchOutcome::NotHtml { .. } => PageState::NotHtml,
            FetchOutcome::Denied => PageState::Denied,
            FetchOutcome::TransportError { .. } => PageState::Failed,
        }
    }
}

/// Runs a complete crawl session
///
/// # Arguments
///
/// * `seed` - The URL to start from
/// * `config` - Validated configuration
/// * `cancel` - Handle the caller can use to stop the crawl early
///
/// # Example
///
/// ```no_run
/// use sitewalk::config::Config;
/// use sitewalk::crawler::{run_crawl, CancelHandle};
/// use sitewalk::url::normalize_target;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let seed = normalize_target("example.com")?;
/// let report = run_crawl(seed, &Config::default(), CancelHandle::new()).await?;
/// println!("wrote {}", report.output_path.display());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    seed: Url,
    config: &Config,
    cancel: CancelHandle,
) -> Result<CrawlReport, SitewalkError> {
    let mut coordinator = Coordinator::new(seed, config)?.with_cancel_handle(cancel);
    coordinator.run().await
}
