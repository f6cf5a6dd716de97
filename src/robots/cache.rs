//! Robots.txt caching implementation
//!
//! Policies are cached per origin for the lifetime of one crawl session and
//! never expire inside it.

use crate::robots::ParsedRobots;
use std::collections::HashMap;

/// Session-scoped robots.txt cache keyed by origin
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: HashMap<String, ParsedRobots>,
}

impl RobotsCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached policy for an origin, if any
    pub fn get(&self, origin: &str) -> Option<&ParsedRobots> {
        self.entries.get(origin)
    }

    /// Stores the policy for an origin, replacing any previous entry
    pub fn insert(&mut self, origin: &str, robots: ParsedRobots) {
        self.entries.insert(origin.to_string(), robots);
    }

    /// Number of origins cached
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
