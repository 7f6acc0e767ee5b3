//! # Website Crawler Module
//!
//! This module crawls a single website breadth-first and flattens each page
//! into plain text. It is the first stage of the chat pipeline: its output is
//! assembled into the context handed to the language model.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: Page cap, politeness throttle, timeout and boilerplate selectors
//! - `Crawler` / `crawl_website`: The crawl loop over a FIFO frontier
//! - `CrawlResult`: URL to text mapping in discovery order
//! - `CrawlCache`: Explicit cache of crawl results keyed by base URL and page cap
//! - `CrawlEvent`: Progress notifications for a host to display
//!
//! ## Features
//!
//! - Same-origin filtering on the network location only
//! - Boilerplate removal (`script`, `style`, `header`, `footer`, `nav`)
//! - Minimum interval between requests via a rate limiter
//! - Network and parse failures are reported, never fatal

mod cache;
mod config;
mod content_extraction;
mod crawl;
mod error;
mod fetch;
mod filter;

pub use cache::CrawlCache;
pub use config::{
    CrawlerConfig, CrawlerConfigBuilder, DEFAULT_MAX_PAGES, DEFAULT_RATE_LIMIT_MS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
pub use content_extraction::{
    extract_links, extract_text, normalize_whitespace, parse_page, ParsedPage,
};
pub use crawl::{crawl_website, Crawler};
pub use error::CrawlError;
pub use fetch::PageFetcher;
pub use filter::{is_same_origin, network_location, resolve_in_scope};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Text collected from a crawl, keyed by page URL in discovery order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// URL the crawl started from
    pub base_url: String,

    /// Extracted text per page URL, in the order pages were visited
    pub pages: IndexMap<String, String>,

    /// Number of URLs visited, including those that yielded no text
    pub visited: usize,

    /// When the crawl finished
    pub crawled_at: Option<DateTime<Utc>>,
}

impl CrawlResult {
    /// Create an empty result for a crawl rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Record the text of a page
    pub fn insert(&mut self, url: impl Into<String>, text: impl Into<String>) {
        self.pages.insert(url.into(), text.into());
    }

    /// Text recorded for `url`
    pub fn get(&self, url: &str) -> Option<&str> {
        self.pages.get(url).map(String::as_str)
    }

    /// Number of pages with content
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether no page yielded content
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// `(url, text)` pairs in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pages
            .iter()
            .map(|(url, text)| (url.as_str(), text.as_str()))
    }

    /// Page URLs in discovery order
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }
}

impl FromIterator<(String, String)> for CrawlResult {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let pages: IndexMap<String, String> = iter.into_iter().collect();
        Self {
            visited: pages.len(),
            pages,
            ..Default::default()
        }
    }
}

/// Progress notifications emitted while crawling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// The crawl has started
    Started {
        /// Normalized base URL
        base_url: String,
        /// Page cap for this crawl
        max_pages: usize,
    },

    /// A URL was dequeued and is about to be fetched
    Visiting {
        /// URL being fetched
        url: String,
        /// Number of URLs visited so far, this one included
        visited: usize,
        /// Page cap for this crawl
        max_pages: usize,
    },

    /// The fetch failed; the page contributes nothing
    PageFailed {
        /// URL that failed
        url: String,
        /// Why it failed
        error: String,
    },

    /// The page was fetched but had no visible text
    PageSkipped {
        /// URL that was skipped
        url: String,
    },

    /// The crawl is over
    Finished {
        /// Number of URLs visited
        visited: usize,
        /// Number of pages with content
        collected: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_result_keeps_insertion_order() {
        let mut result = CrawlResult::new("https://example.com/");
        result.insert("https://example.com/z", "last letter");
        result.insert("https://example.com/a", "first letter");
        result.insert("https://example.com/m", "middle");

        let urls: Vec<&str> = result.urls().collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/z",
                "https://example.com/a",
                "https://example.com/m"
            ]
        );
        assert_eq!(result.get("https://example.com/a"), Some("first letter"));
        assert_eq!(result.len(), 3);
        assert!(!result.is_empty());
    }

    #[test]
    fn test_crawl_result_json_round_trip_preserves_order() {
        let result: CrawlResult = [
            ("https://site/b".to_string(), "bee".to_string()),
            ("https://site/a".to_string(), "ay".to_string()),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.find("https://site/b").unwrap() < json.find("https://site/a").unwrap());

        let back: CrawlResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
