//! Question answering over crawled site content

use tracing::{debug, error, info, instrument};

use crate::chat::model::ChatModel;
use crate::chat::types::{ChatMessage, ConversationTurn};
use crate::config::SiteProfile;
use crate::context::{assemble_context, ContextOptions};
use crate::correction::UrlCorrector;
use crate::crawler::CrawlResult;

/// Reply returned instead of calling the model when no API key is set
pub const MISSING_API_KEY_MESSAGE: &str = "Please enter your OpenRouter API key.";

/// Builds prompts from crawled content and post-processes model replies
///
/// `answer` never fails: a missing key or a model error is turned into a
/// reply string so the conversation can carry on.
pub struct Orchestrator<M: ChatModel> {
    model: M,
    profile: SiteProfile,
    context_options: ContextOptions,
    corrector: UrlCorrector,
}

impl<M: ChatModel> Orchestrator<M> {
    /// Create an orchestrator for the given site
    pub fn new(model: M, profile: SiteProfile) -> Self {
        Self {
            model,
            context_options: ContextOptions::for_site(&profile),
            corrector: UrlCorrector::for_site(&profile),
            profile,
        }
    }

    /// Override the context budget settings
    pub fn with_context_options(mut self, context_options: ContextOptions) -> Self {
        self.context_options = context_options;
        self
    }

    /// The backing model
    pub fn model(&self) -> &M {
        &self.model
    }

    /// The site this orchestrator answers for
    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    /// System prompt: persona, canonical-domain instruction, then the context
    pub fn system_prompt(&self, crawl: &CrawlResult) -> String {
        let profile = &self.profile;
        let misspellings = profile
            .misspelled_domains
            .iter()
            .map(|domain| format!("'{}'", domain))
            .collect::<Vec<_>>()
            .join(" or ");
        let context = assemble_context(crawl, &self.context_options);

        format!(
            "You are a helpful AI assistant for {name}, {description}.\n\
             Use the following content from the website to answer user questions. \
             If the question is not related to the website or the information is not \
             available in the content, politely say so and try to provide general \
             guidance related to {name}.\n\n\
             IMPORTANT: When referring to any URLs related to the website, ALWAYS use the \
             domain '{domain}' (NOT {misspellings}).\n\
             For example, use '{origin}{example}' instead of any other domain.\n\n\
             {context}",
            name = profile.site_name,
            description = profile.site_description,
            domain = profile.canonical_domain,
            misspellings = misspellings,
            origin = profile.canonical_origin(),
            example = profile.example_path,
            context = context,
        )
    }

    /// Full message sequence for a question: system, history, then the question
    pub fn build_messages(
        &self,
        question: &str,
        crawl: &CrawlResult,
        history: &[ConversationTurn],
    ) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.system_prompt(crawl)));
        messages.extend(history.iter().cloned());
        messages.push(ChatMessage::user(question));
        messages
    }

    /// Answer a question about the site
    ///
    /// # Returns
    ///
    /// The corrected model reply, [`MISSING_API_KEY_MESSAGE`] when `api_key` is
    /// empty, or a message describing the model error
    #[instrument(skip_all, fields(history = history.len(), pages = crawl.len()))]
    pub async fn answer(
        &self,
        api_key: &str,
        question: &str,
        crawl: &CrawlResult,
        history: &[ConversationTurn],
    ) -> String {
        if api_key.is_empty() {
            info!("No API key configured, skipping model call");
            return MISSING_API_KEY_MESSAGE.to_string();
        }

        let messages = self.build_messages(question, crawl, history);
        debug!("Sending {} messages to the model", messages.len());

        match self.model.complete(api_key, &messages).await {
            Ok(reply) => self.corrector.correct(&reply),
            Err(e) => {
                error!("Model request failed: {}", e);
                format!("Error querying the model: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::mock_model::MockChatModel;
    use crate::chat::types::Role;

    fn orchestrator(model: MockChatModel) -> Orchestrator<MockChatModel> {
        Orchestrator::new(model, SiteProfile::default())
    }

    fn seed_crawl() -> CrawlResult {
        [(
            "https://site/x".to_string(),
            "Our courses help students get jobs.".to_string(),
        )]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_missing_api_key_makes_no_call() {
        let model = MockChatModel::with_reply("should not be used");
        let orchestrator = orchestrator(model.clone());

        let reply = orchestrator
            .answer("", "What does the site offer?", &seed_crawl(), &[])
            .await;
        assert_eq!(reply, MISSING_API_KEY_MESSAGE);

        assert_eq!(model.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_whitespace_key_is_sent_as_given() {
        let model = MockChatModel::new();
        model.set_text_response("Welcome!").await;
        let orchestrator = orchestrator(model.clone());

        let reply = orchestrator.answer("   ", "Hello?", &seed_crawl(), &[]).await;

        assert_eq!(reply, "Welcome!");
        assert_eq!(model.requests().await[0].api_key, "   ");
    }

    #[tokio::test]
    async fn test_context_reaches_system_message() {
        let model = MockChatModel::with_reply("We offer IT courses.");
        let orchestrator = orchestrator(model.clone());

        let reply = orchestrator
            .answer("key", "What does the site offer?", &seed_crawl(), &[])
            .await;
        assert_eq!(reply, "We offer IT courses.");

        let requests = model.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].api_key, "key");

        let system = &requests[0].messages[0];
        assert_eq!(system.role, Role::System);
        assert!(system.content.contains("Our courses help students get jobs."));
        assert!(system.content.contains("https://site/x"));
        assert!(system.content.contains("ALWAYS use the domain 'innovativeskillsbd.com'"));
        assert!(system
            .content
            .contains("(NOT 'innovative-skill.com' or 'innovativeskill.com')"));
        assert!(system
            .content
            .contains("https://innovativeskillsbd.com/student-job-success"));
    }

    #[tokio::test]
    async fn test_history_order_then_question() {
        let model = MockChatModel::with_reply("ok");
        let orchestrator = orchestrator(model.clone());
        let history = vec![
            ChatMessage::user("first question"),
            ChatMessage::assistant("first answer"),
            ChatMessage::user("second question"),
            ChatMessage::assistant("second answer"),
        ];

        orchestrator
            .answer("key", "third question", &seed_crawl(), &history)
            .await;

        let messages = &model.requests().await[0].messages;
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(&messages[1..5], history.as_slice());
        assert_eq!(messages[5], ChatMessage::user("third question"));
    }

    #[tokio::test]
    async fn test_reply_urls_are_corrected() {
        let model = MockChatModel::with_reply(
            "See https://innovative-skill.com/jobs and https://innovativeskillsbd.com/about",
        );
        let orchestrator = orchestrator(model);

        let reply = orchestrator.answer("key", "jobs?", &seed_crawl(), &[]).await;
        assert_eq!(
            reply,
            "See https://innovativeskillsbd.com/jobs and https://innovativeskillsbd.com/about"
        );
    }

    #[tokio::test]
    async fn test_model_error_becomes_reply() {
        let model = MockChatModel::new();
        model.set_auth_error("invalid key").await;
        let orchestrator = orchestrator(model.clone());

        let reply = orchestrator.answer("key", "hi", &seed_crawl(), &[]).await;
        assert_eq!(
            reply,
            "Error querying the model: Authentication error: invalid key"
        );

        model.set_api_error(503, "provider down").await;
        let reply = orchestrator.answer("key", "hi", &seed_crawl(), &[]).await;
        assert!(reply.starts_with("Error querying the model:"));
        assert!(reply.contains("provider down"));
    }

    #[test]
    fn test_context_budget_applies_to_system_prompt() {
        let crawl: CrawlResult = (0..20)
            .map(|i| (format!("https://site/{i}"), "word ".repeat(300)))
            .collect();
        let orchestrator = orchestrator(MockChatModel::new())
            .with_context_options(ContextOptions::default().with_max_chars(2000));

        let prompt = orchestrator.system_prompt(&crawl);
        assert!(prompt.contains("https://site/0"));
        assert!(!prompt.contains("https://site/19"));
    }
}
