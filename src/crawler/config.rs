//! # Crawler Configuration Module
//!
//! Configuration options for the single-site crawler: the page cap, the
//! politeness throttle between requests, the per-request timeout and the
//! boilerplate selectors stripped before text extraction. It uses a builder
//! pattern for flexible configuration.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: The main configuration struct with crawler parameters
//! - `CrawlerConfigBuilder`: Builder pattern implementation for easier configuration

use std::time::Duration;

/// Default page cap for a crawl
pub const DEFAULT_MAX_PAGES: usize = 80;

/// Default minimum interval between two requests, in milliseconds
pub const DEFAULT_RATE_LIMIT_MS: u64 = 500;

/// Default per-request timeout, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Maximum number of URLs to visit (failed fetches count)
    pub max_pages: usize,

    /// Minimum interval in milliseconds between requests; 0 disables throttling
    pub rate_limit_ms: u64,

    /// Timeout in seconds for a single page request
    pub request_timeout_secs: u64,

    /// User agent to send; `None` keeps the HTTP client's default
    pub user_agent: Option<String>,

    /// CSS selectors for elements removed (with their subtree) before text extraction
    pub exclude_selectors: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: None,
            exclude_selectors: vec![
                "script".to_string(),
                "style".to_string(),
                "header".to_string(),
                "footer".to_string(),
                "nav".to_string(),
            ],
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the maximum number of pages to visit
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the minimum interval in milliseconds between requests
    pub fn rate_limit_ms(mut self, rate_limit_ms: u64) -> Self {
        self.config.rate_limit_ms = rate_limit_ms;
        self
    }

    /// Set the per-request timeout in seconds
    pub fn request_timeout_secs(mut self, request_timeout_secs: u64) -> Self {
        self.config.request_timeout_secs = request_timeout_secs;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    /// Set the CSS selectors for elements to exclude
    pub fn exclude_selectors(mut self, exclude_selectors: Vec<String>) -> Self {
        self.config.exclude_selectors = exclude_selectors;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// Get the rate limit as a Duration
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
