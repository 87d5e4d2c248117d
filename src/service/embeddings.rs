//! Embeddings client, sibling of the completion clients over the same
//! configuration base.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{AzureConfig, ServiceKind};
use crate::core::LlmError;

use super::{ServiceClient, Usage};

#[async_trait]
pub trait Embeddings {
    async fn embed(&self, request: EmbeddingsRequest) -> Result<EmbeddingsResponse, LlmError>;
}

#[derive(Debug)]
pub struct EmbeddingsClient {
    service: ServiceClient,
}

impl EmbeddingsClient {
    /// Fails when the config was built for a different service kind or
    /// carries no resolvable address.
    pub fn new(config: AzureConfig) -> Result<Self, LlmError> {
        Ok(Self {
            service: ServiceClient::new(config, ServiceKind::Embedding)?,
        })
    }

    pub fn config(&self) -> &AzureConfig {
        self.service.config()
    }
}

#[async_trait]
impl Embeddings for EmbeddingsClient {
    async fn embed(&self, request: EmbeddingsRequest) -> Result<EmbeddingsResponse, LlmError> {
        self.service.post_json(&request).await
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EmbeddingsRequest {
    pub input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl EmbeddingsRequest {
    pub fn new(input: Vec<String>) -> Self {
        Self { input, user: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsResponse {
    pub data: Vec<Embedding>,
    pub model: String,
    pub usage: Usage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Embedding {
    pub index: u32,
    pub embedding: Vec<f32>,
}
