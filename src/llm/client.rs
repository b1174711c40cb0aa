//! LLM completion client
//!
//! This is a model-agnostic HTTP client for calling LLM APIs.
//! Supports both Anthropic and OpenAI-compatible APIs.
//! Completions are untrusted text: every caller validates what comes back.

use crate::core::config::LlmConfig;
use crate::core::error::{PilotError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;

/// Blocking completion seam used by the pipeline
///
/// Pipeline stages run on worker threads, so the contract is synchronous.
/// Closures `Fn(system, user) -> Result<String>` implement it, which is how
/// tests script responses.
pub trait CompletionService: Send + Sync {
    fn complete(&self, system: &str, user: &str) -> Result<String>;
}

impl<F> CompletionService for F
where
    F: Fn(&str, &str) -> Result<String> + Send + Sync,
{
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        self(system, user)
    }
}

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
        }
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }

    /// Create a client from configuration plus environment
    ///
    /// Required: LLM_API_KEY
    /// Optional: LLM_API_URL and LLM_MODEL override the configured values
    pub fn from_env(config: &LlmConfig) -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| PilotError::Llm("LLM_API_KEY not set".into()))?;
        let api_url = std::env::var("LLM_API_URL").unwrap_or_else(|_| config.api_url.clone());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| config.model.clone());

        Ok(Self::new(api_key, api_url, model))
    }

    /// Send a completion request to the LLM
    ///
    /// # Arguments
    /// * `system` - System prompt providing context and instructions
    /// * `user` - User message/query to process
    ///
    /// # Returns
    /// The LLM's text response
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.api_format {
            ApiFormat::Anthropic => self.complete_anthropic(system, user).await,
            ApiFormat::OpenAI => self.complete_openai(system, user).await,
        }
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String> {
        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            temperature: 0.0,
            system: system.into(),
            messages: vec![Message {
                role: "user".into(),
                content: user.into(),
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| PilotError::Llm(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PilotError::Llm(format!("API error: {}", error_text)));
        }

        let completion: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| PilotError::Llm(e.to_string()))?;

        completion
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or_else(|| PilotError::Llm("Empty response".into()))
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String> {
        let request = OpenAIRequest {
            model: self.model.clone(),
            max_tokens: 1024,
            temperature: 0.0,
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system.into(),
                },
                Message {
                    role: "user".into(),
                    content: user.into(),
                },
            ],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| PilotError::Llm(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PilotError::Llm(format!("API error: {}", error_text)));
        }

        let completion: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| PilotError::Llm(e.to_string()))?;

        completion
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| PilotError::Llm("Empty response".into()))
    }
}

/// Drives an [`LlmClient`] from plain threads through a tokio runtime
///
/// Must not be called from inside an async task.
pub struct LlmService {
    client: LlmClient,
    runtime: Handle,
}

impl LlmService {
    pub fn new(client: LlmClient, runtime: Handle) -> Self {
        Self { client, runtime }
    }
}

impl CompletionService for LlmService {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.runtime.block_on(self.client.complete(system, user))
    }
}

/// Stand-in used when no API key is configured; every call fails
pub struct OfflineCompletion;

impl CompletionService for OfflineCompletion {
    fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        Err(PilotError::Llm("no completion service configured".into()))
    }
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

// OpenAI-compatible API format
#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}
