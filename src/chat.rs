//! # Chat Module
//!
//! Turns crawled site content into answers. The orchestrator builds one system
//! message from the persona, the canonical-domain instruction and the
//! assembled context, appends the conversation so far and the new question,
//! and hands the sequence to a [`ChatModel`].
//!
//! ## Key Components
//!
//! - `ChatModel`: Trait implemented by completion backends
//! - `OpenRouterClient`: The OpenRouter (OpenAI-compatible) backend
//! - `MockChatModel`: Recording backend for tests
//! - `Orchestrator`: Prompt construction, model call, reply correction

mod error;
pub mod mock_model;
mod model;
mod openrouter;
mod orchestrator;
mod types;

pub use error::ChatError;
pub use mock_model::MockChatModel;
pub use model::ChatModel;
pub use openrouter::{DEFAULT_MODEL, OPENROUTER_BASE_URL, OpenRouterClient, OpenRouterOptions};
pub use orchestrator::{MISSING_API_KEY_MESSAGE, Orchestrator};
pub use types::{ChatMessage, ConversationTurn, Role};
