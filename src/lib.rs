//! # aoai
//!
//! Typed client for Azure OpenAI deployments: text completions, chat
//! completions, and embeddings over one shared configuration base.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aoai::{AzureConfigBuilder, TextCompletion, TextCompletionClient, TextCompletionRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AzureConfigBuilder::text()
//!         .with_endpoint("https://my-resource.openai.azure.com")
//!         .with_deployment_name("my-deployment")
//!         .with_api_key(std::env::var("AZURE_OPENAI_API_KEY")?)
//!         .build()?;
//!
//!     let client = TextCompletionClient::new(config)?;
//!     let response = client
//!         .complete(TextCompletionRequest::new("Say hello."))
//!         .await?;
//!     println!("{}", response.text().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! Configurations can also come from a string-keyed settings map
//! ([`AzureConfigBuilder::from_settings`]) or from the `AZURE_OPENAI_*`
//! environment variables ([`AzureConfigBuilder::from_env`]). Directory-based
//! authentication is supported through a static token
//! (`with_ad_token`) or an async token provider (`with_ad_token_provider`);
//! the clients prefer the provider, then the token, then the API key.

pub mod config;
pub mod core;
pub mod service;

pub use config::{AdTokenProvider, AzureConfig, AzureConfigBuilder, ServiceKind};
pub use crate::core::{HttpClientConfig, LlmError, SseStream};
pub use service::{
    ChatCompletion, ChatCompletionChunk, ChatCompletionClient, ChatCompletionRequest,
    ChatCompletionResponse, ChatMessage, ChatRole, Embeddings, EmbeddingsClient, EmbeddingsRequest,
    EmbeddingsResponse, TextCompletion, TextCompletionChunk, TextCompletionClient,
    TextCompletionRequest, TextCompletionResponse, Usage,
};
