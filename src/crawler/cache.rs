//! Explicit cache of crawl results

use std::collections::HashMap;

use tracing::debug;

use crate::crawler::CrawlResult;

/// Crawl results keyed by `(base_url, max_pages)`
///
/// Nothing expires on its own; a re-crawl is requested by invalidating the
/// entry first.
#[derive(Debug, Clone, Default)]
pub struct CrawlCache {
    entries: HashMap<(String, usize), CrawlResult>,
}

impl CrawlCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result for a crawl of `base_url` capped at `max_pages`
    pub fn get(&self, base_url: &str, max_pages: usize) -> Option<&CrawlResult> {
        self.entries.get(&(base_url.to_string(), max_pages))
    }

    /// Store a result, replacing any previous one for the same key
    pub fn insert(&mut self, base_url: &str, max_pages: usize, result: CrawlResult) {
        debug!("Caching crawl of {} ({} pages max)", base_url, max_pages);
        self.entries.insert((base_url.to_string(), max_pages), result);
    }

    /// Drop the entry for one key, returning it if present
    pub fn invalidate(&mut self, base_url: &str, max_pages: usize) -> Option<CrawlResult> {
        self.entries.remove(&(base_url.to_string(), max_pages))
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached crawls
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds nothing
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(text: &str) -> CrawlResult {
        [("https://site/".to_string(), text.to_string())]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_keyed_by_url_and_page_cap() {
        let mut cache = CrawlCache::new();
        cache.insert("https://site/", 80, sample("full"));
        cache.insert("https://site/", 1, sample("single"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("https://site/", 80).unwrap().get("https://site/"), Some("full"));
        assert_eq!(cache.get("https://site/", 1).unwrap().get("https://site/"), Some("single"));
        assert!(cache.get("https://other/", 80).is_none());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let mut cache = CrawlCache::new();
        cache.insert("https://site/", 80, sample("old"));
        cache.insert("https://other/", 80, sample("other"));

        assert!(cache.invalidate("https://site/", 80).is_some());
        assert!(cache.invalidate("https://site/", 80).is_none());
        assert!(cache.get("https://site/", 80).is_none());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
