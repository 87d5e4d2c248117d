//! Request-issuing clients for the three service kinds.
//!
//! Each client consumes an [`AzureConfig`](crate::AzureConfig) built for its
//! kind. Authentication precedence is resolved here, per request: the token
//! provider first, then the static AD token, then the API key.

pub mod chat;
pub mod embeddings;
pub mod text;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::Instrument;

use crate::config::{AzureConfig, ServiceKind};
use crate::core::{HttpClient, LlmError, SseStream};

pub use chat::{
    ChatChoice, ChatChunkChoice, ChatCompletion, ChatCompletionChunk, ChatCompletionClient,
    ChatCompletionRequest, ChatCompletionResponse, ChatDelta, ChatMessage, ChatRole,
};
pub use embeddings::{Embedding, Embeddings, EmbeddingsClient, EmbeddingsRequest, EmbeddingsResponse};
pub use text::{
    TextChoice, TextCompletion, TextCompletionChunk, TextCompletionClient, TextCompletionRequest,
    TextCompletionResponse,
};

/// Token counts reported by the service. Embeddings responses carry no
/// completion count.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Shared transport behind the typed clients: a kind-checked config, the
/// resolved request URL, and the retrying HTTP client.
pub(crate) struct ServiceClient {
    config: AzureConfig,
    http: HttpClient,
    url: String,
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // AzureConfig's Debug already redacts the credentials.
        f.debug_struct("ServiceClient")
            .field("config", &self.config)
            .field("url", &self.url)
            .finish()
    }
}

impl ServiceClient {
    pub(crate) fn new(config: AzureConfig, expected: ServiceKind) -> Result<Self, LlmError> {
        if config.kind != expected {
            return Err(LlmError::ProviderConfiguration(format!(
                "Config was built for a {} service, expected {expected}",
                config.kind
            )));
        }
        let url = config.request_url()?;
        let http = HttpClient::new(config.http_config.clone(), None)?;
        Ok(Self { config, http, url })
    }

    pub(crate) fn config(&self) -> &AzureConfig {
        &self.config
    }

    /// Pick the authentication header for this request. The provider is
    /// consulted first so short-lived tokens stay fresh.
    async fn auth_header(&self) -> Result<(String, String), LlmError> {
        if let Some(provider) = &self.config.ad_token_provider {
            let token = provider().await?;
            return Ok(("Authorization".to_string(), format!("Bearer {token}")));
        }
        if let Some(token) = &self.config.ad_token {
            return Ok(("Authorization".to_string(), format!("Bearer {token}")));
        }
        if let Some(key) = &self.config.api_key {
            return Ok(("api-key".to_string(), key.clone()));
        }
        Err(LlmError::ProviderConfiguration(
            "No authentication mechanism is configured".to_string(),
        ))
    }

    /// Span for one request, parented under the caller-injected span when
    /// the config carries one.
    fn request_span(&self) -> tracing::Span {
        match &self.config.log {
            Some(parent) => {
                tracing::info_span!(parent: parent, "azure_request", kind = %self.config.kind)
            }
            None => tracing::info_span!("azure_request", kind = %self.config.kind),
        }
    }

    pub(crate) async fn post_json<Req, Res>(&self, body: &Req) -> Result<Res, LlmError>
    where
        Req: Serialize + Sync,
        Res: DeserializeOwned,
    {
        let span = self.request_span();
        async {
            let headers = vec![self.auth_header().await?];
            self.http.post_json(&self.url, &headers, body).await
        }
        .instrument(span)
        .await
    }

    pub(crate) async fn post_sse<Req, Chunk>(&self, body: &Req) -> Result<SseStream<Chunk>, LlmError>
    where
        Req: Serialize + Sync,
        Chunk: DeserializeOwned,
    {
        let span = self.request_span();
        let response = async {
            let headers = vec![self.auth_header().await?];
            self.http.post_stream(&self.url, &headers, body).await
        }
        .instrument(span)
        .await?;
        Ok(SseStream::new(response))
    }
}

/// Wire wrapper that switches a request body into streaming mode.
#[derive(Serialize)]
pub(crate) struct Streamed<'a, Req: Serialize> {
    #[serde(flatten)]
    request: &'a Req,
    stream: bool,
}

impl<'a, Req: Serialize> Streamed<'a, Req> {
    pub(crate) fn new(request: &'a Req) -> Self {
        Self {
            request,
            stream: true,
        }
    }
}
