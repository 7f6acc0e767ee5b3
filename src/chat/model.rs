//! The seam between the orchestrator and a chat-completion backend

use std::future::Future;

use crate::chat::error::ChatError;
use crate::chat::types::ChatMessage;

/// A backend that turns a message sequence into one reply
///
/// The API key travels with each request because it is supplied by the
/// person using the session, not fixed when the backend is built.
pub trait ChatModel {
    /// Request a completion for `messages`
    fn complete(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> impl Future<Output = Result<String, ChatError>> + Send;
}
