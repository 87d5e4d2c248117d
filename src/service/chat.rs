//! Chat-completion client, sibling of the text-completion client over the
//! same configuration base.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{AzureConfig, ServiceKind};
use crate::core::{LlmError, SseStream};

use super::{ServiceClient, Streamed, Usage};

#[async_trait]
pub trait ChatCompletion {
    async fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError>;
}

#[derive(Debug)]
pub struct ChatCompletionClient {
    service: ServiceClient,
}

impl ChatCompletionClient {
    /// Fails when the config was built for a different service kind or
    /// carries no resolvable address.
    pub fn new(config: AzureConfig) -> Result<Self, LlmError> {
        Ok(Self {
            service: ServiceClient::new(config, ServiceKind::Chat)?,
        })
    }

    pub fn config(&self) -> &AzureConfig {
        self.service.config()
    }

    pub async fn complete_stream(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<SseStream<ChatCompletionChunk>, LlmError> {
        self.service.post_sse(&Streamed::new(&request)).await
    }
}

#[async_trait]
impl ChatCompletion for ChatCompletionClient {
    async fn complete(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError> {
        self.service.post_json(&request).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatCompletionRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
}

impl ChatCompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub model: String,
    pub created: u64,
    pub choices: Vec<ChatChoice>,
    pub usage: Usage,
}

impl ChatCompletionResponse {
    /// Content of the first choice's message, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub id: Option<String>,
    pub choices: Vec<ChatChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChunkChoice {
    pub index: u32,
    pub delta: ChatDelta,
    pub finish_reason: Option<String>,
}

/// Incremental part of a streamed chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatDelta {
    #[serde(default)]
    pub role: Option<ChatRole>,
    #[serde(default)]
    pub content: Option<String>,
}
