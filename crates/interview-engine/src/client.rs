//! OpenRouter API client for chat completions.

use async_trait::async_trait;
use interview_core::ModelConfig;
use interview_models::MessageRole;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{EngineError, ModelError};
use crate::model::{ConversationModel, ModelRequest};

/// OpenRouter chat completions endpoint.
const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// OpenRouter-backed conversational model.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
    config: ModelConfig,
}

impl OpenRouterClient {
    /// Create a client with an explicit API key.
    pub fn new(api_key: impl Into<String>, config: ModelConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            config,
        }
    }

    /// Create a client reading the key from `config.api_key_env`.
    pub fn from_env(config: ModelConfig) -> Result<Self, EngineError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                EngineError::Configuration(format!(
                    "Missing {} environment variable",
                    config.api_key_env
                ))
            })?;
        Ok(Self::new(api_key, config))
    }

    /// Send a chat completion request.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<ChatResponse, ModelError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        };

        trace!("Sending chat request: {:?}", request);

        let response = self
            .client
            .post(OPENROUTER_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", "https://github.com/callout-interview/interview")
            .header("X-Title", "Callout Interview")
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::ResponseParse(e.to_string()))?;

        debug!(
            model = %self.config.model,
            tokens = response.usage.as_ref().map_or(0, |u| u.total_tokens),
            "Chat response received"
        );

        Ok(response)
    }
}

#[async_trait]
impl ConversationModel for OpenRouterClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, request: &ModelRequest) -> Result<String, ModelError> {
        let messages = request
            .messages()
            .into_iter()
            .map(|(role, content)| ChatMessage::new(role, content))
            .collect();
        let response = self.chat(messages).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(ModelError::EmptyResponse)
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Temperature for generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A message in the chat conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: String,
    /// Text content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Create a message with the given role.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Unique identifier for this completion.
    #[serde(default)]
    pub id: String,
    /// Completion choices.
    pub choices: Vec<ChatChoice>,
    /// Token usage information.
    pub usage: Option<ChatUsage>,
}

impl ChatResponse {
    /// Non-blank text of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// A choice in the completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// The message for this choice.
    pub message: ResponseMessage,
    /// Finish reason (stop, length, etc.).
    pub finish_reason: Option<String>,
}

/// Message in a completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Text content of the response.
    pub content: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u32,
    /// Tokens in the completion.
    pub completion_tokens: u32,
    /// Total tokens used.
    pub total_tokens: u32,
}
