//! Text-completion client for Azure OpenAI deployments.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{AzureConfig, ServiceKind};
use crate::core::{LlmError, SseStream};

use super::{ServiceClient, Streamed, Usage};

/// Text-completion surface of a deployment.
#[async_trait]
pub trait TextCompletion {
    async fn complete(
        &self,
        request: TextCompletionRequest,
    ) -> Result<TextCompletionResponse, LlmError>;
}

/// Client for a deployment configured with
/// [`AzureConfigBuilder::text`](crate::AzureConfigBuilder::text).
#[derive(Debug)]
pub struct TextCompletionClient {
    service: ServiceClient,
}

impl TextCompletionClient {
    /// Fails when the config was built for a different service kind or
    /// carries no resolvable address.
    pub fn new(config: AzureConfig) -> Result<Self, LlmError> {
        Ok(Self {
            service: ServiceClient::new(config, ServiceKind::Text)?,
        })
    }

    pub fn config(&self) -> &AzureConfig {
        self.service.config()
    }

    /// Stream a completion as server-sent events. The stream ends after the
    /// service's `[DONE]` sentinel.
    pub async fn complete_stream(
        &self,
        request: TextCompletionRequest,
    ) -> Result<SseStream<TextCompletionChunk>, LlmError> {
        self.service.post_sse(&Streamed::new(&request)).await
    }
}

#[async_trait]
impl TextCompletion for TextCompletionClient {
    async fn complete(
        &self,
        request: TextCompletionRequest,
    ) -> Result<TextCompletionResponse, LlmError> {
        self.service.post_json(&request).await
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TextCompletionRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Number of completions to generate for the prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<u32>,
    /// Echo the prompt back in front of the completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub echo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_of: Option<u32>,
}

impl TextCompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextCompletionResponse {
    pub id: String,
    pub model: String,
    pub created: u64,
    pub choices: Vec<TextChoice>,
    pub usage: Usage,
}

impl TextCompletionResponse {
    /// Text of the first choice, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.text.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextChoice {
    pub text: String,
    pub index: u32,
    pub finish_reason: Option<String>,
}

/// One streamed event. Same choice shape as the final response, no usage.
#[derive(Debug, Clone, Deserialize)]
pub struct TextCompletionChunk {
    #[serde(default)]
    pub id: Option<String>,
    pub choices: Vec<TextChoice>,
}
