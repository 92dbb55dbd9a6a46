//! Frontier queue and visited set
//!
//! The frontier is a plain FIFO, so dequeue order is discovery order and
//! shallower pages are always visited before deeper ones. Duplicates may sit
//! in the queue; the visited set is checked and updated when a URL is taken
//! out, which is the only place de-duplication happens.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// Pending URLs plus the set of URLs already taken for processing
#[derive(Debug, Default)]
pub struct Frontier {
    /// URLs waiting to be visited, oldest first
    queue: VecDeque<Url>,

    /// Normalized URL strings already dequeued for processing
    visited: HashSet<String>,

    /// Seeds accepted regardless of content length
    forced: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Initializes the queue with starting URLs
    pub fn seed(&mut self, urls: impl IntoIterator<Item = Url>) {
        self.queue.extend(urls);
    }

    /// Adds a seed that is recorded as a page even when its content is short
    pub fn seed_forced(&mut self, url: Url) {
        self.forced.insert(url.as_str().to_string());
        self.queue.push_back(url);
    }

    /// Appends discovered URLs that have not been visited yet
    ///
    /// URLs already waiting in the queue are not checked; they are dropped
    /// when dequeued a second time. Returns the number of URLs appended.
    pub fn enqueue(&mut self, urls: impl IntoIterator<Item = Url>) -> usize {
        let before = self.queue.len();
        for url in urls {
            if !self.visited.contains(url.as_str()) {
                self.queue.push_back(url);
            }
        }
        self.queue.len() - before
    }

    /// Pops the oldest queued URL
    pub fn dequeue_next(&mut self) -> Option<Url> {
        self.queue.pop_front()
    }

    /// Marks a URL as visited
    ///
    /// Returns false if the URL had already been visited, in which case the
    /// caller must skip it.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    /// Returns true if the URL has been taken for processing
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// Returns true if the URL was seeded with `seed_forced`
    pub fn is_forced(&self, url: &Url) -> bool {
        self.forced.contains(url.as_str())
    }

    /// Number of URLs waiting in the queue (duplicates included)
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct URLs taken for processing
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
