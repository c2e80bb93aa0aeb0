//! Memoization of statement fetches.
//!
//! Results are keyed by URL and never evicted for the lifetime of the cache,
//! so repeated lookups of the same company in one session hit the network
//! once. Failed fetches are cached as `None` as well; a new session (or
//! [`FetchCache::clear`]) is needed to retry them.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::RawTable;

#[derive(Debug, Default)]
pub struct FetchCache {
    entries: HashMap<String, Option<RawTable>>,
    hits: usize,
    misses: usize,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `url`, calling `fetch` only on the first request.
    pub fn get_or_fetch<F>(&mut self, url: &str, fetch: F) -> Option<RawTable>
    where
        F: FnOnce(&str) -> Option<RawTable>,
    {
        if let Some(cached) = self.entries.get(url) {
            self.hits += 1;
            debug!(url, "fetch cache hit");
            return cached.clone();
        }

        self.misses += 1;
        let value = fetch(url);
        self.entries.insert(url.to_string(), value.clone());
        value
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
