//! # Chat Session
//!
//! A [`Session`] owns everything one user accumulates while talking to the
//! assistant: the API key they entered, the current crawl of the site, a cache
//! of earlier crawls and the conversation history. Nothing is shared between
//! sessions and nothing outlives one.
//!
//! Lifecycle:
//!
//! - created empty at start
//! - `ensure_crawled` fills the crawl on first use, `crawl(true)` replaces it
//! - `ask` appends the question and the reply to the history
//! - `clear_conversation` empties the history and keeps the crawl

use tokio::sync::mpsc;
use tracing::{info, instrument};

use crate::chat::{ChatMessage, ChatModel, ConversationTurn, Orchestrator};
use crate::config::SiteProfile;
use crate::crawler::{CrawlCache, CrawlError, CrawlEvent, CrawlResult, Crawler, CrawlerConfig};

/// State of one conversation with the site assistant
pub struct Session<M: ChatModel> {
    orchestrator: Orchestrator<M>,
    crawler: Crawler,
    cache: CrawlCache,
    crawl: CrawlResult,
    history: Vec<ConversationTurn>,
    api_key: String,
}

impl<M: ChatModel> Session<M> {
    /// Create a session for `profile` backed by `model`
    pub fn new(model: M, profile: SiteProfile, crawler_config: CrawlerConfig) -> Result<Self, CrawlError> {
        Ok(Self::from_parts(
            Orchestrator::new(model, profile),
            Crawler::new(crawler_config)?,
        ))
    }

    /// Create a session from an already configured orchestrator and crawler
    pub fn from_parts(orchestrator: Orchestrator<M>, crawler: Crawler) -> Self {
        Self {
            orchestrator,
            crawler,
            cache: CrawlCache::new(),
            crawl: CrawlResult::default(),
            history: Vec::new(),
            api_key: String::new(),
        }
    }

    /// Set the API key used for model requests
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.api_key = api_key.into();
    }

    /// Whether an API key has been entered
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// URL the site crawl starts from
    pub fn base_url(&self) -> &str {
        &self.orchestrator.profile().base_url
    }

    /// Page cap used for crawls
    pub fn max_pages(&self) -> usize {
        self.crawler.config().max_pages
    }

    /// The orchestrator answering questions
    pub fn orchestrator(&self) -> &Orchestrator<M> {
        &self.orchestrator
    }

    /// Current crawl of the site
    pub fn crawl_result(&self) -> &CrawlResult {
        &self.crawl
    }

    /// Replace the current crawl, e.g. with one loaded from disk
    pub fn replace_crawl(&mut self, crawl: CrawlResult) {
        self.crawl = crawl;
    }

    /// Conversation so far, oldest first
    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    /// Crawl the site, reusing a cached crawl unless `force` is set
    ///
    /// A forced crawl invalidates the cache entry first. Either way the
    /// result replaces the session's current crawl wholesale.
    #[instrument(skip(self, progress), fields(base_url = %self.base_url()))]
    pub async fn crawl(
        &mut self,
        force: bool,
        progress: Option<mpsc::Sender<CrawlEvent>>,
    ) -> Result<&CrawlResult, CrawlError> {
        let base_url = self.base_url().to_string();
        let max_pages = self.max_pages();

        if force {
            self.cache.invalidate(&base_url, max_pages);
        } else if let Some(cached) = self.cache.get(&base_url, max_pages) {
            info!("Using cached crawl with {} pages", cached.len());
            self.crawl = cached.clone();
            return Ok(&self.crawl);
        }

        let result = self.crawler.crawl_with_progress(&base_url, progress).await?;
        self.cache.insert(&base_url, max_pages, result.clone());
        self.crawl = result;
        Ok(&self.crawl)
    }

    /// Crawl the site if the session has no content yet
    pub async fn ensure_crawled(
        &mut self,
        progress: Option<mpsc::Sender<CrawlEvent>>,
    ) -> Result<&CrawlResult, CrawlError> {
        if self.crawl.is_empty() {
            self.crawl(false, progress).await
        } else {
            Ok(&self.crawl)
        }
    }

    /// Ask a question and record the exchange
    ///
    /// The reply is answered against the history as it was before this
    /// question, then both the question and the reply are appended. Error and
    /// guidance replies are recorded like any other.
    pub async fn ask(&mut self, question: &str) -> String {
        let reply = self
            .orchestrator
            .answer(&self.api_key, question, &self.crawl, &self.history)
            .await;

        self.history.push(ChatMessage::user(question));
        self.history.push(ChatMessage::assistant(reply.clone()));
        reply
    }

    /// Forget the conversation, keeping the crawl
    pub fn clear_conversation(&mut self) {
        info!("Clearing {} conversation turns", self.history.len());
        self.history.clear();
    }
}
