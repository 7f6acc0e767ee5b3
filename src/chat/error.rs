//! Error types for the chat module

use crate::error::Error as CrateError;
use thiserror::Error;

/// Error type for chat completion requests
#[derive(Debug, Error)]
pub enum ChatError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Please retry after {retry_after_secs} seconds")]
    RateLimit {
        /// Seconds to wait before retrying
        retry_after_secs: u64,
    },

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),
}

impl From<ChatError> for CrateError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Http(e) => CrateError::Http(e),
            ChatError::Json(e) => CrateError::Json(e),
            _ => CrateError::Chat(err.to_string()),
        }
    }
}
