//! Service configuration for Azure OpenAI deployments.
//!
//! One immutable [`AzureConfig`] value addresses a deployment and carries its
//! credentials. The [`AzureConfigBuilder`] entry points (`text`, `chat`,
//! `embedding`) fix the service kind; both addressing shapes (a full base URL,
//! or endpoint plus deployment name) funnel into the same normalizer.

mod builder;
pub mod constants;
mod settings;

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::core::{HttpClientConfig, LlmError};

pub use builder::AzureConfigBuilder;

/// Async callable producing a directory-auth bearer token on demand.
///
/// Called once per request, so short-lived tokens can be refreshed by the
/// identity provider behind it.
pub type AdTokenProvider =
    Arc<dyn Fn() -> BoxFuture<'static, Result<String, LlmError>> + Send + Sync>;

/// Which request shape a configuration is built for. Fixed by the builder
/// entry point, never settable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Text,
    Chat,
    Embedding,
}

impl ServiceKind {
    /// Path appended to the deployment root for this request shape.
    pub(crate) fn path(&self) -> &'static str {
        match self {
            ServiceKind::Text => "/completions",
            ServiceKind::Chat => "/chat/completions",
            ServiceKind::Embedding => "/embeddings",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Text => write!(f, "text completion"),
            ServiceKind::Chat => write!(f, "chat completion"),
            ServiceKind::Embedding => write!(f, "embedding"),
        }
    }
}

/// Immutable configuration for one Azure OpenAI deployment.
///
/// Cheap to clone and safe to share across concurrent requests. All three
/// authentication fields may be present at once; the builder only checks that
/// at least one is usable, and the clients pick one at request time.
#[derive(Clone)]
pub struct AzureConfig {
    pub deployment_name: Option<String>,
    pub endpoint: Option<String>,
    pub base_url: Option<String>,
    /// Never empty; defaults to [`constants::DEFAULT_API_VERSION`].
    pub api_version: String,
    pub api_key: Option<String>,
    pub ad_token: Option<String>,
    pub ad_token_provider: Option<AdTokenProvider>,
    /// Caller-injected span that request spans are parented under.
    pub log: Option<tracing::Span>,
    pub kind: ServiceKind,
    pub http_config: HttpClientConfig,
}

impl AzureConfig {
    /// Root URL of the deployment: `base_url` verbatim when present,
    /// otherwise `{endpoint}/openai/deployments/{deployment_name}`.
    pub fn resource_url(&self) -> Result<String, LlmError> {
        if let Some(base_url) = &self.base_url {
            return Ok(base_url.clone());
        }
        match (&self.endpoint, &self.deployment_name) {
            (Some(endpoint), Some(deployment)) => {
                Ok(format!("{endpoint}/openai/deployments/{deployment}"))
            }
            _ => Err(LlmError::ProviderConfiguration(
                "Either base_url or endpoint and deployment_name must be provided".to_string(),
            )),
        }
    }

    /// Full request URL for this configuration's service kind.
    pub(crate) fn request_url(&self) -> Result<String, LlmError> {
        let root = self.resource_url()?;
        Ok(format!(
            "{}{}?api-version={}",
            root.trim_end_matches('/'),
            self.kind.path(),
            self.api_version
        ))
    }
}

impl fmt::Debug for AzureConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureConfig")
            .field("deployment_name", &self.deployment_name)
            .field("endpoint", &self.endpoint)
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("ad_token", &self.ad_token.as_ref().map(|_| "***"))
            .field(
                "ad_token_provider",
                &self.ad_token_provider.as_ref().map(|_| ".."),
            )
            .field("kind", &self.kind)
            .field("http_config", &self.http_config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_url_prefers_base_url() {
        let config = AzureConfigBuilder::text()
            .with_base_url("https://example.com/openai/deployments/gpt")
            .with_endpoint("https://ignored.example.com")
            .with_deployment_name("ignored")
            .with_api_key("key")
            .build()
            .expect("valid config");

        assert_eq!(
            config.resource_url().expect("resolvable"),
            "https://example.com/openai/deployments/gpt"
        );
    }

    #[test]
    fn resource_url_joins_endpoint_and_deployment() {
        let config = AzureConfigBuilder::text()
            .with_endpoint("https://resource.openai.azure.com")
            .with_deployment_name("gpt-35")
            .with_api_key("key")
            .build()
            .expect("valid config");

        assert_eq!(
            config.resource_url().expect("resolvable"),
            "https://resource.openai.azure.com/openai/deployments/gpt-35"
        );
    }

    #[test]
    fn request_url_appends_kind_path_and_api_version() {
        let config = AzureConfigBuilder::chat()
            .with_endpoint("https://resource.openai.azure.com")
            .with_deployment_name("gpt-35")
            .with_api_key("key")
            .build()
            .expect("valid config");

        assert_eq!(
            config.request_url().expect("resolvable"),
            "https://resource.openai.azure.com/openai/deployments/gpt-35/chat/completions?api-version=2023-05-15"
        );
    }

    #[test]
    fn secrets_are_redacted_in_debug_output() {
        let config = AzureConfigBuilder::text()
            .with_base_url("https://example.com")
            .with_api_key("super-secret")
            .build()
            .expect("valid config");

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("***"));
    }
}
