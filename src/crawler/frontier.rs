//! Crawl frontier and visited set
//!
//! The frontier is a plain FIFO queue of (url, depth) entries. Duplicates are
//! allowed in the queue; they are filtered when dequeued, against the
//! visited set and the depth limit.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// A URL waiting to be processed, with its distance from the seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// The URL to process
    pub url: Url,

    /// Link distance from the seed (seed = 0)
    pub depth: u32,
}

/// What happened to an entry taken off the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Entry is new and within the depth limit; it is now marked visited
    Accepted(FrontierEntry),

    /// The URL was already visited
    AlreadyVisited(FrontierEntry),

    /// The entry's depth is at or beyond the limit
    TooDeep(FrontierEntry),
}

/// FIFO work queue plus the set of URLs already accepted
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
    max_depth: u32,
}

impl Frontier {
    /// Creates an empty frontier that admits depths `0..max_depth`
    pub fn new(max_depth: u32) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            max_depth,
        }
    }

    /// Appends an entry to the back of the queue
    ///
    /// No deduplication happens here.
    pub fn push(&mut self, url: Url, depth: u32) {
        self.queue.push_back(FrontierEntry { url, depth });
    }

    /// Takes the next entry off the queue and decides whether to process it
    ///
    /// An accepted entry is inserted into the visited set before this
    /// returns, so a later copy of the same URL is rejected no matter how
    /// processing goes. Returns None once the queue is empty.
    pub fn next(&mut self) -> Option<Admission> {
        let entry = self.queue.pop_front()?;

        if self.visited.contains(entry.url.as_str()) {
            return Some(Admission::AlreadyVisited(entry));
        }

        if entry.depth >= self.max_depth {
            return Some(Admission::TooDeep(entry));
        }

        self.visited.insert(entry.url.as_str().to_string());
        Some(Admission::Accepted(entry))
    }

    /// Returns true if the URL has been accepted before
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Number of URLs accepted so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Number of entries waiting in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The depth limit entries are checked against
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }
}
