//! Error types for the sitechat crate

use thiserror::Error;

/// Result type for sitechat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sitechat operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Markdown rendering or terminal output error
    #[error("Markdown error: {0}")]
    Markdown(#[from] std::io::Error),

    /// Web crawling error
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Chat completion error
    #[error("Chat error: {0}")]
    Chat(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
