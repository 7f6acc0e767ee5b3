//! Message types shared by the chat pipeline

use serde::{Deserialize, Serialize};

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions and context for the model
    System,
    /// The person asking questions
    User,
    /// The model's replies
    Assistant,
}

/// One message in a chat completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message
    pub role: Role,

    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A past exchange in the conversation history
///
/// History only ever holds user and assistant turns; the system message is
/// rebuilt for every question.
pub type ConversationTurn = ChatMessage;
