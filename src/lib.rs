//! # sitechat - Single-Site Crawler and Chat Assistant
//!
//! This crate crawls one website, flattens its pages into a bounded text
//! context and answers questions about the site with a remote language model.
//! Replies are post-processed so that links always point at the site's
//! canonical domain.
//!
//! ## Features
//!
//! - Breadth-first, same-origin crawling with a page cap and a politeness throttle
//! - Boilerplate-free text extraction (scripts, styles, header, footer, nav)
//! - Context assembly within a character budget, in discovery order
//! - OpenRouter chat completions with conversation history
//! - Correction of misspelled domains in model output
//! - Explicit session state with a crawl cache and manual re-crawl
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitechat::chat::OpenRouterClient;
//! use sitechat::config::SiteProfile;
//! use sitechat::crawler::CrawlerConfig;
//! use sitechat::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenRouterClient::new()?;
//!     let mut session = Session::new(client, SiteProfile::default(), CrawlerConfig::default())?;
//!     session.set_api_key(std::env::var("OPENROUTER_API_KEY").unwrap_or_default());
//!
//!     session.ensure_crawled(None).await?;
//!     let reply = session.ask("Which courses help me get a job?").await;
//!
//!     println!("{}", reply);
//!     Ok(())
//! }
//! ```

mod error;
mod markdown;

pub mod chat;
pub mod config;
pub mod context;
pub mod correction;
pub mod crawler;
pub mod session;

pub use error::Error;
pub use markdown::{format_markdown, render_markdown};

/// Re-export of common types for public use
pub mod prelude {
    pub use crate::chat::{ChatMessage, ChatModel, ConversationTurn, Orchestrator};
    pub use crate::config::SiteProfile;
    pub use crate::crawler::{CrawlResult, Crawler, CrawlerConfig};
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::session::Session;
}
