//! Crawl report generation
//!
//! This module provides the summary a finished crawl session returns and a
//! printer for it.

use crate::output::OutputFormat;
use crate::state::PageState;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Summary of one crawl session
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Seed URL the session started from
    pub seed: String,

    /// File the visited URLs were written to
    pub output_path: PathBuf,

    /// Format of the output file
    pub format: OutputFormat,

    /// Count of visited pages by outcome
    pub pages_by_state: HashMap<PageState, u64>,

    /// Records written to the output file
    pub records_written: u64,

    /// Links enqueued from fetched pages (including duplicates)
    pub links_discovered: u64,

    /// Frontier entries dropped because the URL was already visited
    pub skipped_duplicates: u64,

    /// Frontier entries dropped because their depth reached the limit
    pub skipped_depth: u64,

    /// Origins whose robots.txt was consulted
    pub robots_origins: u64,

    /// Wall-clock duration of the session
    pub elapsed: Duration,

    /// True if the session stopped on a cancellation request
    pub cancelled: bool,
}

impl CrawlReport {
    /// Number of pages visited with the given outcome
    pub fn count(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Total number of visited pages
    pub fn pages_visited(&self) -> u64 {
        self.pages_by_state.values().sum()
    }

    /// Pages whose outcome matches `predicate`
    fn count_where(&self, predicate: impl Fn(PageState) -> bool) -> u64 {
        self.pages_by_state
            .iter()
            .filter(|(state, _)| predicate(**state))
            .map(|(_, n)| n)
            .sum()
    }

    /// Page requests actually sent (robots-disallowed pages excluded)
    pub fn requests_sent(&self) -> u64 {
        self.count_where(|s| s.was_fetched())
    }

    /// Pages that were denied or failed
    pub fn errors(&self) -> u64 {
        self.count_where(|s| s.is_error())
    }

    /// Returns the share of visited pages whose links were extracted
    pub fn success_rate(&self) -> f64 {
        let visited = self.pages_visited();
        if visited == 0 {
            return 0.0;
        }
        (self.count_where(|s| s.is_success()) as f64 / visited as f64) * 100.0
    }
}

/// Prints a crawl report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");

    println!("Seed: {}", report.seed);
    println!("Output: {} ({})", report.output_path.display(), report.format);
    if report.cancelled {
        println!("Status: cancelled before the frontier drained");
    }
    println!();

    println!("Overview:");
    println!("  Pages visited: {}", report.pages_visited());
    println!("  Requests sent: {}", report.requests_sent());
    println!("  Errors: {}", report.errors());
    println!("  Records written: {}", report.records_written);
    println!("  Links discovered: {}", report.links_discovered);
    println!("  Skipped (already visited): {}", report.skipped_duplicates);
    println!("  Skipped (depth limit): {}", report.skipped_depth);
    println!("  robots.txt origins: {}", report.robots_origins);
    println!("  Elapsed: {:.2}s", report.elapsed.as_secs_f64());
    println!();

    println!("Pages by Outcome:");
    for state in PageState::all_states() {
        let count = report.count(state);
        if count > 0 {
            println!("  {}: {}", state, count);
        }
    }
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        report.success_rate(),
        report.count(PageState::Fetched),
        report.pages_visited()
    );
}
