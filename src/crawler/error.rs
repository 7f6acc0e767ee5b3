//! Error types for the crawler module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP client error (connection failure, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with something other than 200 OK
    #[error("Unexpected status {status} for {url}")]
    Status {
        /// URL that was requested
        url: String,
        /// Status code returned by the server
        status: u16,
    },

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl From<CrawlError> for CrateError {
    fn from(err: CrawlError) -> Self {
        match err {
            CrawlError::Http(e) => CrateError::Http(e),
            CrawlError::UrlParse(e) => CrateError::Other(format!("URL parse error: {}", e)),
            _ => CrateError::Crawl(err.to_string()),
        }
    }
}
