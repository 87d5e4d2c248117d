pub mod error;
pub mod http;
pub mod sse;

pub use error::LlmError;
pub use http::{HttpClient, HttpClientConfig};
pub use sse::SseStream;
