//! # Mock Chat Model for Testing
//!
//! Provides a `MockChatModel` that implements the `ChatModel` trait for use in
//! tests. It returns a predefined reply or error and records every request so
//! tests can inspect the messages that would have been sent.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::chat::error::ChatError;
use crate::chat::model::ChatModel;
use crate::chat::types::ChatMessage;

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Auth(String),
    Api { status_code: u16, message: String },
}

/// A request received by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// API key the request carried
    pub api_key: String,

    /// Messages the request carried
    pub messages: Vec<ChatMessage>,
}

/// A mock chat model for testing purposes.
/// It returns a predefined reply or error when `complete` is called.
#[derive(Debug, Clone)]
pub struct MockChatModel {
    reply: Arc<Mutex<MockReply>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockChatModel {
    /// Creates a new mock model that replies with an empty string.
    pub fn new() -> Self {
        Self {
            reply: Arc::new(Mutex::new(MockReply::Text(String::new()))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a mock that always replies with `text`.
    pub fn with_reply(text: &str) -> Self {
        Self {
            reply: Arc::new(Mutex::new(MockReply::Text(text.to_string()))),
            ..Self::new()
        }
    }

    /// Sets the reply text.
    pub async fn set_text_response(&self, text: &str) {
        *self.reply.lock().await = MockReply::Text(text.to_string());
    }

    /// Makes every request fail with an authentication error.
    pub async fn set_auth_error(&self, message: &str) {
        *self.reply.lock().await = MockReply::Auth(message.to_string());
    }

    /// Makes every request fail with an API error.
    pub async fn set_api_error(&self, status_code: u16, message: &str) {
        *self.reply.lock().await = MockReply::Api {
            status_code,
            message: message.to_string(),
        };
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of requests received so far.
    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

impl Default for MockChatModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatModel for MockChatModel {
    async fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String, ChatError> {
        self.requests.lock().await.push(RecordedRequest {
            api_key: api_key.to_string(),
            messages: messages.to_vec(),
        });

        let reply = self.reply.lock().await.clone();
        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Auth(message) => Err(ChatError::Auth(message)),
            MockReply::Api {
                status_code,
                message,
            } => Err(ChatError::Api {
                status_code,
                message,
            }),
        }
    }
}
