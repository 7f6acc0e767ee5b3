//! OpenRouter chat-completion client
//!
//! Speaks the OpenAI-compatible `chat/completions` API exposed by OpenRouter.
//! Requests carry the referer and title headers OpenRouter uses to attribute
//! traffic to the calling application.

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client as ReqwestClient, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::chat::error::ChatError;
use crate::chat::model::ChatModel;
use crate::chat::types::ChatMessage;
use crate::config::SiteProfile;

/// OpenRouter API root
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat-v3-0324:free";

/// Default timeout for completion requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Retry delay reported when a 429 carries no `Retry-After` header
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Options for the OpenRouter client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRouterOptions {
    /// API root, without the `/chat/completions` suffix
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Value of the `HTTP-Referer` header
    pub referer: String,

    /// Value of the `X-Title` header
    pub app_title: String,
}

impl Default for OpenRouterOptions {
    fn default() -> Self {
        Self::for_site(&SiteProfile::default())
    }
}

impl OpenRouterOptions {
    /// Options identifying the application with the site's headers
    pub fn for_site(profile: &SiteProfile) -> Self {
        Self {
            base_url: OPENROUTER_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            referer: profile.referer.clone(),
            app_title: profile.app_title.clone(),
        }
    }

    /// Use a different model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,

    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,

    #[serde(default)]
    code: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

/// HTTP client for OpenRouter chat completions
#[derive(Clone)]
pub struct OpenRouterClient {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Endpoint, model and identification headers
    options: OpenRouterOptions,
}

#[cfg(test)]
impl OpenRouterClient {
    /// Set the base URL (for testing only)
    pub fn set_base_url(&mut self, url: String) {
        self.options.base_url = url;
    }
}

impl OpenRouterClient {
    /// Create a client with default options
    pub fn new() -> Result<Self, ChatError> {
        Self::with_options(OpenRouterOptions::default())
    }

    /// Create a client with custom options
    pub fn with_options(options: OpenRouterOptions) -> Result<Self, ChatError> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()?;

        Ok(Self { client, options })
    }

    /// The options this client was built with
    pub fn options(&self) -> &OpenRouterOptions {
        &self.options
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.options.base_url.trim_end_matches('/')
        )
    }

    /// Execute a completion request and pull the reply text out of the response
    async fn execute_request(&self, request: RequestBuilder) -> Result<String, ChatError> {
        let response = request.send().await?;

        let status = response.status();
        let retry_after_secs = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        let response_text = response.text().await?;

        if !status.is_success() {
            error!("API error: {} - {}", status, response_text);
            let message = serde_json::from_str::<ErrorEnvelope>(&response_text)
                .map(|envelope| envelope.error.message)
                .unwrap_or(response_text);

            return Err(if status == StatusCode::TOO_MANY_REQUESTS {
                ChatError::RateLimit { retry_after_secs }
            } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                ChatError::Auth(message)
            } else {
                ChatError::Api {
                    status_code: status.as_u16(),
                    message,
                }
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!("Failed to parse response: {}", e);
                ChatError::UnexpectedResponse(format!("Failed to parse response: {}", e))
            })?;

        if let Some(api_error) = parsed.error {
            return Err(ChatError::Api {
                status_code: api_error.code.unwrap_or(status.as_u16()),
                message: api_error.message,
            });
        }

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                ChatError::UnexpectedResponse("Response contained no message content".to_string())
            })
    }
}

impl ChatModel for OpenRouterClient {
    #[instrument(skip(self, api_key, messages), fields(model = %self.options.model, messages = messages.len()))]
    async fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let body = ChatCompletionRequest {
            model: &self.options.model,
            messages,
        };

        let request = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.options.referer)
            .header("X-Title", &self.options.app_title)
            .json(&body);

        debug!("Sending chat completion request to {}", self.endpoint());
        self.execute_request(request).await
    }
}
