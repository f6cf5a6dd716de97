//! Robots.txt handling module
//!
//! This module provides functionality for fetching, parsing, and caching robots.txt files.
//! Lookups fail open: a robots.txt that cannot be fetched, or is not served
//! with status 200, allows everything on its origin.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::{ParsedRobots, ROBOTS_AGENT};

use crate::url::robots_url;
use reqwest::{Client, StatusCode};
use url::Url;

/// Fetches robots.txt for an origin
///
/// Sends a plain GET to `{origin}/robots.txt` with no delay and no
/// user-agent override. Any transport failure, non-200 status or unreadable
/// body yields an allow-all policy.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `origin` - Scheme and host (and port), e.g. `https://example.com`
pub async fn fetch_robots(client: &Client, origin: &str) -> ParsedRobots {
    let location = robots_url(origin);

    let response = match client.get(&location).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(
                "Could not fetch {}: {}; treating origin as allowed",
                location,
                e
            );
            return ParsedRobots::allow_all();
        }
    };

    if response.status() != StatusCode::OK {
        tracing::debug!(
            "{} returned HTTP {}; treating origin as allowed",
            location,
            response.status().as_u16()
        );
        return ParsedRobots::allow_all();
    }

    match response.text().await {
        Ok(body) => ParsedRobots::from_content(&body),
        Err(e) => {
            tracing::warn!(
                "Could not read {}: {}; treating origin as allowed",
                location,
                e
            );
            ParsedRobots::allow_all()
        }
    }
}

/// Checks if a URL is allowed by robots.txt
pub fn is_allowed(robots: &ParsedRobots, url: &Url) -> bool {
    robots.is_allowed(url.as_str())
}

/// Answers allow/deny questions for a crawl session
///
/// Each origin's robots.txt is fetched at most once per session.
pub struct RobotsChecker {
    client: Client,
    cache: RobotsCache,
}

impl RobotsChecker {
    /// Creates a checker that fetches through the given client
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cache: RobotsCache::new(),
        }
    }

    /// Returns true if `url` may be fetched under `origin`'s robots.txt
    pub async fn allowed(&mut self, url: &Url, origin: &str) -> bool {
        if let Some(robots) = self.cache.get(origin) {
            tracing::trace!("Using cached robots.txt for {}", origin);
            return is_allowed(robots, url);
        }

        tracing::debug!("Fetching robots.txt for origin: {}", origin);
        let robots = fetch_robots(&self.client, origin).await;
        if robots.is_allow_all() {
            tracing::debug!("No robots.txt policy for {}; all paths allowed", origin);
        }
        let allowed = is_allowed(&robots, url);
        self.cache.insert(origin, robots);
        allowed
    }

    /// Number of origins whose policy has been fetched this session
    pub fn cached_origins(&self) -> usize {
        self.cache.len()
    }
}
