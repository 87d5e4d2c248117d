/// API version sent when the caller does not pick one.
pub const DEFAULT_API_VERSION: &str = "2023-05-15";

pub const API_KEY_ENV_VAR: &str = "AZURE_OPENAI_API_KEY";
pub const ENDPOINT_ENV_VAR: &str = "AZURE_OPENAI_ENDPOINT";
pub const DEPLOYMENT_ENV_VAR: &str = "AZURE_OPENAI_DEPLOYMENT";
pub const API_VERSION_ENV_VAR: &str = "AZURE_OPENAI_API_VERSION";
