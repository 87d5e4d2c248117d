use crate::core::{HttpClientConfig, LlmError};

use super::constants;
use super::{AdTokenProvider, AzureConfig, ServiceKind};

/// Builder for [`AzureConfig`]. Both addressing shapes (base URL, or
/// endpoint plus deployment name) go through the same `build` normalizer.
///
/// The service kind is fixed by the entry point:
///
/// ```
/// use aoai::AzureConfigBuilder;
///
/// let config = AzureConfigBuilder::text()
///     .with_endpoint("https://my-resource.openai.azure.com")
///     .with_deployment_name("my-deployment")
///     .with_api_key("...")
///     .build()
///     .unwrap();
/// ```
pub struct AzureConfigBuilder {
    kind: ServiceKind,
    deployment_name: Option<String>,
    endpoint: Option<String>,
    base_url: Option<String>,
    api_version: Option<String>,
    api_key: Option<String>,
    ad_token: Option<String>,
    ad_token_provider: Option<AdTokenProvider>,
    log: Option<tracing::Span>,
    logger: Option<tracing::Span>,
    http_config: HttpClientConfig,
}

impl AzureConfigBuilder {
    pub(super) fn new(kind: ServiceKind) -> Self {
        Self {
            kind,
            deployment_name: None,
            endpoint: None,
            base_url: None,
            api_version: None,
            api_key: None,
            ad_token: None,
            ad_token_provider: None,
            log: None,
            logger: None,
            http_config: HttpClientConfig::default(),
        }
    }

    /// Start a configuration for a text-completion deployment.
    pub fn text() -> Self {
        Self::new(ServiceKind::Text)
    }

    /// Start a configuration for a chat-completion deployment.
    pub fn chat() -> Self {
        Self::new(ServiceKind::Chat)
    }

    /// Start a configuration for an embeddings deployment.
    pub fn embedding() -> Self {
        Self::new(ServiceKind::Embedding)
    }

    pub fn with_deployment_name(mut self, deployment_name: impl Into<String>) -> Self {
        self.deployment_name = Some(deployment_name.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Fully-qualified deployment URL, used verbatim instead of
    /// endpoint + deployment name.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Static bearer token for directory-based authentication.
    pub fn with_ad_token(mut self, ad_token: impl Into<String>) -> Self {
        self.ad_token = Some(ad_token.into());
        self
    }

    /// Callable producing a bearer token per request.
    pub fn with_ad_token_provider(mut self, provider: AdTokenProvider) -> Self {
        self.ad_token_provider = Some(provider);
        self
    }

    /// Span that request spans are parented under.
    pub fn with_log(mut self, span: tracing::Span) -> Self {
        self.log = Some(span);
        self
    }

    /// Deprecated alias for [`with_log`](Self::with_log). The value is used
    /// only when `with_log` was not called; a warning is emitted at build
    /// time. Scheduled for removal with the next breaking release.
    #[deprecated(since = "0.1.0", note = "use `with_log` instead")]
    pub fn with_logger(mut self, span: tracing::Span) -> Self {
        self.logger = Some(span);
        self
    }

    pub fn with_http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Fill fields that are still unset from the `AZURE_OPENAI_*` environment
    /// variables.
    pub fn from_env(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = std::env::var(constants::API_KEY_ENV_VAR).ok();
        }
        if self.endpoint.is_none() {
            self.endpoint = std::env::var(constants::ENDPOINT_ENV_VAR).ok();
        }
        if self.deployment_name.is_none() {
            self.deployment_name = std::env::var(constants::DEPLOYMENT_ENV_VAR).ok();
        }
        if self.api_version.is_none() {
            self.api_version = std::env::var(constants::API_VERSION_ENV_VAR).ok();
        }
        self
    }

    /// Normalize and validate the collected parameters.
    ///
    /// At least one authentication path must be present; mutual exclusivity
    /// among the three is deliberately not enforced, the clients pick one at
    /// request time. Addressing is not checked here so that a config carrying
    /// only credentials remains a legal value; the request-issuing client
    /// validates resolvability when it is constructed.
    pub fn build(self) -> Result<AzureConfig, LlmError> {
        if self.logger.is_some() {
            tracing::warn!("The `logger` option is deprecated, use `log` instead");
        }
        let log = self.log.or(self.logger);

        if self.api_key.is_none() && self.ad_token.is_none() && self.ad_token_provider.is_none() {
            return Err(LlmError::ProviderConfiguration(
                "At least one of api_key, ad_token, or ad_token_provider must be provided"
                    .to_string(),
            ));
        }

        let api_version = self
            .api_version
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| constants::DEFAULT_API_VERSION.to_string());

        Ok(AzureConfig {
            deployment_name: normalize(self.deployment_name),
            endpoint: normalize_url(self.endpoint),
            // Recorded as supplied; trailing slashes are handled when the
            // request URL is assembled.
            base_url: normalize(self.base_url),
            api_version,
            api_key: self.api_key,
            ad_token: self.ad_token,
            ad_token_provider: self.ad_token_provider,
            log,
            kind: self.kind,
            http_config: self.http_config,
        })
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn normalize_url(value: Option<String>) -> Option<String> {
    normalize(value).map(|v| v.trim_end_matches('/').to_string())
}
