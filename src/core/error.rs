use thiserror::Error;

/// Errors surfaced by configuration and request paths.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The settings mapping is missing required keys. Raised before any other
    /// field of the mapping is read.
    #[error("Missing required settings keys: {}", keys.join(", "))]
    MissingSettings { keys: Vec<String> },

    /// The configuration is structurally unusable (no authentication path,
    /// no resolvable address, or a client was handed a config built for a
    /// different service kind).
    #[error("Configuration error: {0}")]
    ProviderConfiguration(String),

    /// Transport-level failure after retries were exhausted.
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The service answered with a non-success status. The response body is
    /// carried in `message` unmodified.
    #[error("API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A response body or stream event could not be decoded.
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
