//! LLM completion clients used by the semantic matcher.
//!
//! Provides an [`Llm`] abstraction with implementations for the OpenAI Chat
//! Completions API and the Anthropic Messages API.

use async_trait::async_trait;
use edge_scan_core::{MatcherConfig, MatcherError, MatcherProvider};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// OpenAI Chat Completions API endpoint.
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Anthropic Messages API endpoint.
pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header value.
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// A text completion backend.
#[async_trait]
pub trait Llm: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// Sends `prompt` as a single user message and returns the reply text.
    async fn complete(&self, prompt: &str) -> Result<String, MatcherError>;
}

/// Settings shared by the HTTP completion clients.
#[derive(Clone)]
pub struct LlmSettings {
    pub api_key: SecretString,
    pub model: String,
    pub endpoint: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl LlmSettings {
    /// Builds settings from run configuration for `provider`'s default endpoint.
    ///
    /// # Errors
    /// [`MatcherError::MissingApiKey`] when no key is configured.
    pub fn from_config(
        config: &MatcherConfig,
        provider: &'static str,
        default_endpoint: &str,
    ) -> Result<Self, MatcherError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(MatcherError::MissingApiKey { provider })?;

        Ok(Self {
            api_key: SecretString::from(api_key.to_string()),
            model: config.model.clone(),
            endpoint: config
                .base_url
                .clone()
                .unwrap_or_else(|| default_endpoint.to_string()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

fn http_client(timeout: Duration) -> Result<Client, MatcherError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MatcherError::Http(format!("failed to build HTTP client: {e}")))
}

async fn read_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, MatcherError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(MatcherError::Api {
            status: status.as_u16(),
            message,
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| MatcherError::InvalidResponse(e.to_string()))
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

// =============================================================================
// OpenAI
// =============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI Chat Completions client.
#[derive(Debug)]
pub struct OpenAiClient {
    client: Client,
    settings: LlmSettings,
}

impl OpenAiClient {
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(settings: LlmSettings) -> Result<Self, MatcherError> {
        Ok(Self {
            client: http_client(settings.timeout)?,
            settings,
        })
    }
}

#[async_trait]
impl Llm for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String, MatcherError> {
        let request = ChatRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(provider = "openai", model = %self.settings.model, prompt_len = prompt.len(), "POST completion");

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(self.settings.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let body: ChatResponse = read_json(response).await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| MatcherError::InvalidResponse("empty completion".to_string()))
    }
}

// =============================================================================
// Anthropic
// =============================================================================

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<Message<'a>>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic Messages API client.
#[derive(Debug)]
pub struct AnthropicClient {
    client: Client,
    settings: LlmSettings,
}

impl AnthropicClient {
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(settings: LlmSettings) -> Result<Self, MatcherError> {
        Ok(Self {
            client: http_client(settings.timeout)?,
            settings,
        })
    }
}

#[async_trait]
impl Llm for AnthropicClient {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str) -> Result<String, MatcherError> {
        let request = MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        debug!(provider = "anthropic", model = %self.settings.model, prompt_len = prompt.len(), "POST completion");

        let response = self
            .client
            .post(&self.settings.endpoint)
            .header("x-api-key", self.settings.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&request)
            .send()
            .await?;

        let body: MessagesResponse = read_json(response).await?;
        let text: String = body.content.into_iter().filter_map(|b| b.text).collect();
        if text.is_empty() {
            return Err(MatcherError::InvalidResponse("empty completion".to_string()));
        }
        Ok(text)
    }
}

/// Builds the completion client for a configured provider.
///
/// Returns `Ok(None)` for [`MatcherProvider::Noop`].
///
/// # Errors
/// [`MatcherError::MissingApiKey`] when the provider needs a key and none is set.
pub fn build_llm(config: &MatcherConfig) -> Result<Option<Arc<dyn Llm>>, MatcherError> {
    match config.provider {
        MatcherProvider::Noop => Ok(None),
        MatcherProvider::OpenAi => {
            let settings = LlmSettings::from_config(config, "openai", OPENAI_API_URL)?;
            Ok(Some(Arc::new(OpenAiClient::new(settings)?)))
        }
        MatcherProvider::Anthropic => {
            let settings = LlmSettings::from_config(config, "anthropic", ANTHROPIC_API_URL)?;
            Ok(Some(Arc::new(AnthropicClient::new(settings)?)))
        }
    }
}
