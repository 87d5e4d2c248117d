//! Mapping-based construction from a plain string-keyed settings map.

use std::collections::HashMap;

use crate::core::LlmError;

use super::{AzureConfig, AzureConfigBuilder, ServiceKind};

/// Keys that must be present in a settings map.
const REQUIRED_KEYS: &[&str] = &["api_key"];

const OPTIONAL_KEYS: &[&str] = &[
    "deployment_name",
    "endpoint",
    "base_url",
    "api_version",
    "ad_token",
];

impl AzureConfigBuilder {
    /// Build a configuration from a string-keyed settings map.
    ///
    /// Required keys are validated up front: a map without `api_key` fails
    /// with [`LlmError::MissingSettings`] before any other field is read.
    /// Optional keys are `deployment_name`, `endpoint`, `base_url`,
    /// `api_version` (defaulted when absent) and `ad_token`. Unknown keys are
    /// ignored; inputs that are not string-typed (the token provider, the
    /// log span) can only be supplied through the builder methods.
    pub fn from_settings(
        kind: ServiceKind,
        settings: &HashMap<String, String>,
    ) -> Result<AzureConfig, LlmError> {
        let missing: Vec<String> = REQUIRED_KEYS
            .iter()
            .filter(|key| !settings.contains_key(**key))
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LlmError::MissingSettings { keys: missing });
        }

        let mut builder = Self::new(kind);
        for key in REQUIRED_KEYS.iter().chain(OPTIONAL_KEYS) {
            let Some(value) = settings.get(*key) else {
                continue;
            };
            builder = match *key {
                "api_key" => builder.with_api_key(value),
                "deployment_name" => builder.with_deployment_name(value),
                "endpoint" => builder.with_endpoint(value),
                "base_url" => builder.with_base_url(value),
                "api_version" => builder.with_api_version(value),
                "ad_token" => builder.with_ad_token(value),
                _ => builder,
            };
        }

        builder.build()
    }
}
