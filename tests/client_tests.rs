use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use aoai::{
    AdTokenProvider, AzureConfig, AzureConfigBuilder, ChatCompletion, ChatCompletionClient,
    ChatCompletionRequest, ChatMessage, ChatRole, Embeddings, EmbeddingsClient, EmbeddingsRequest,
    HttpClientConfig, LlmError, TextCompletion, TextCompletionClient, TextCompletionRequest,
};
use futures::FutureExt;
use tokio_stream::StreamExt;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_http_config() -> HttpClientConfig {
    HttpClientConfig {
        timeout: Duration::from_secs(5),
        max_retries: 2,
        initial_retry_delay: Duration::from_millis(10),
        max_retry_delay: Duration::from_millis(50),
    }
}

fn text_config(server: &MockServer) -> AzureConfig {
    AzureConfigBuilder::text()
        .with_endpoint(server.uri())
        .with_deployment_name("gpt")
        .with_api_key("test-key")
        .with_http_config(fast_http_config())
        .build()
        .expect("valid config")
}

fn completion_body(text: &str, finish_reason: &str) -> serde_json::Value {
    json!({
        "id": "cmpl-1",
        "object": "text_completion",
        "created": 1,
        "model": "gpt",
        "choices": [
            { "text": text, "index": 0, "finish_reason": finish_reason, "logprobs": null }
        ],
        "usage": { "prompt_tokens": 2, "completion_tokens": 3, "total_tokens": 5 }
    })
}

#[tokio::test]
async fn text_completion_sends_api_key_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt/completions"))
        .and(query_param("api-version", "2023-05-15"))
        .and(header("api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hello", "stop")))
        .expect(1)
        .mount(&server)
        .await;

    let client = TextCompletionClient::new(text_config(&server)).expect("client");
    let response = client
        .complete(TextCompletionRequest::new("Say hello."))
        .await
        .expect("completion");

    assert_eq!(response.text(), Some("Hello"));
    assert_eq!(response.usage.total_tokens, 5);
}

#[tokio::test]
async fn ad_token_is_sent_as_bearer() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt/completions"))
        .and(header("Authorization", "Bearer my-ad-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok", "stop")))
        .expect(1)
        .mount(&server)
        .await;

    let config = AzureConfigBuilder::text()
        .with_endpoint(server.uri())
        .with_deployment_name("gpt")
        .with_ad_token("my-ad-token")
        .build()
        .expect("valid config");

    let client = TextCompletionClient::new(config).expect("client");
    client
        .complete(TextCompletionRequest::new("hi"))
        .await
        .expect("completion");
}

#[tokio::test]
async fn token_provider_takes_precedence_over_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt/completions"))
        .and(header("Authorization", "Bearer provider-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok", "stop")))
        .expect(1)
        .mount(&server)
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let provider_calls = calls.clone();
    let provider: AdTokenProvider = Arc::new(move || {
        let calls = provider_calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok("provider-token".to_string())
        }
        .boxed()
    });

    let config = AzureConfigBuilder::text()
        .with_endpoint(server.uri())
        .with_deployment_name("gpt")
        .with_api_key("unused-key")
        .with_ad_token_provider(provider)
        .build()
        .expect("valid config");

    let client = TextCompletionClient::new(config).expect("client");
    client
        .complete(TextCompletionRequest::new("hi"))
        .await
        .expect("completion");

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn base_url_addressing_skips_deployment_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/custom/completions"))
        .and(query_param("api-version", "2023-05-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok", "stop")))
        .expect(1)
        .mount(&server)
        .await;

    let config = AzureConfigBuilder::text()
        .with_base_url(format!("{}/custom", server.uri()))
        .with_api_key("test-key")
        .build()
        .expect("valid config");

    let client = TextCompletionClient::new(config).expect("client");
    client
        .complete(TextCompletionRequest::new("hi"))
        .await
        .expect("completion");
}

#[tokio::test]
async fn rate_limited_requests_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt/completions"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("recovered", "stop")))
        .expect(1)
        .mount(&server)
        .await;

    let client = TextCompletionClient::new(text_config(&server)).expect("client");
    let response = client
        .complete(TextCompletionRequest::new("hi"))
        .await
        .expect("completion after retry");

    assert_eq!(response.text(), Some("recovered"));
}

#[tokio::test]
async fn fatal_errors_surface_the_response_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("DeploymentNotFound"))
        .expect(1)
        .mount(&server)
        .await;

    let client = TextCompletionClient::new(text_config(&server)).expect("client");
    let err = client
        .complete(TextCompletionRequest::new("hi"))
        .await
        .expect_err("400 is fatal");

    match err {
        LlmError::Api {
            message,
            status_code,
            ..
        } => {
            assert_eq!(status_code, Some(400));
            assert!(message.contains("DeploymentNotFound"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn text_completion_streams_until_done_sentinel() {
    let server = MockServer::start().await;

    let sse_body = concat!(
        "data: {\"id\":\"cmpl-1\",\"choices\":[{\"text\":\"Hello\",\"index\":0,\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"cmpl-1\",\"choices\":[{\"text\":\" world\",\"index\":0,\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = TextCompletionClient::new(text_config(&server)).expect("client");
    let stream = client
        .complete_stream(TextCompletionRequest::new("hi"))
        .await
        .expect("stream");

    let chunks: Vec<_> = stream.collect().await;
    let texts: Vec<String> = chunks
        .into_iter()
        .map(|chunk| chunk.expect("chunk").choices[0].text.clone())
        .collect();

    assert_eq!(texts, vec!["Hello".to_string(), " world".to_string()]);
}

#[tokio::test]
async fn stream_ending_without_done_sentinel_surfaces_an_error() {
    let server = MockServer::start().await;

    let sse_body = concat!(
        "data: {\"id\":\"cmpl-1\",\"choices\":[{\"text\":\"Hello\",\"index\":0,\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"cmpl-1\",\"choices\":[{\"text\":\" world\",\"index\":0,\"finish_reason\":\"stop\"}]}",
    );

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let client = TextCompletionClient::new(text_config(&server)).expect("client");
    let stream = client
        .complete_stream(TextCompletionRequest::new("hi"))
        .await
        .expect("stream");

    let mut events: Vec<_> = stream.collect().await;

    // Complete events are delivered, then the truncation is reported.
    let last = events.pop().expect("at least the error");
    assert!(matches!(last, Err(LlmError::Parse { .. })));
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].as_ref().expect("complete chunk").choices[0].text,
        "Hello"
    );
}

#[tokio::test]
async fn chat_completion_roundtrip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-chat/chat/completions"))
        .and(query_param("api-version", "2023-05-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1,
            "model": "gpt-chat",
            "choices": [
                {
                    "index": 0,
                    "message": { "role": "assistant", "content": "Hi there" },
                    "finish_reason": "stop"
                }
            ],
            "usage": { "prompt_tokens": 4, "completion_tokens": 2, "total_tokens": 6 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = AzureConfigBuilder::chat()
        .with_endpoint(server.uri())
        .with_deployment_name("gpt-chat")
        .with_api_key("test-key")
        .build()
        .expect("valid config");

    let client = ChatCompletionClient::new(config).expect("client");
    let response = client
        .complete(ChatCompletionRequest::new(vec![ChatMessage {
            role: ChatRole::User,
            content: "Hello".to_string(),
        }]))
        .await
        .expect("chat completion");

    assert_eq!(response.content(), Some("Hi there"));
    assert_eq!(response.choices[0].message.role, ChatRole::Assistant);
}

#[tokio::test]
async fn chat_completion_streams_deltas() {
    let server = MockServer::start().await;

    let sse_body = concat!(
        "data: {\"id\":\"chatcmpl-1\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"chatcmpl-1\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hi\"},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"chatcmpl-1\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );

    Mock::given(method("POST"))
        .and(path("/openai/deployments/gpt-chat/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body, "text/event-stream"))
        .expect(1)
        .mount(&server)
        .await;

    let config = AzureConfigBuilder::chat()
        .with_endpoint(server.uri())
        .with_deployment_name("gpt-chat")
        .with_api_key("test-key")
        .build()
        .expect("valid config");

    let client = ChatCompletionClient::new(config).expect("client");
    let stream = client
        .complete_stream(ChatCompletionRequest::new(vec![ChatMessage {
            role: ChatRole::User,
            content: "Hello".to_string(),
        }]))
        .await
        .expect("stream");

    let chunks: Vec<_> = stream.collect().await;
    assert_eq!(chunks.len(), 3);

    let content: String = chunks
        .into_iter()
        .filter_map(|chunk| chunk.expect("chunk").choices[0].delta.content.clone())
        .collect();
    assert_eq!(content, "Hi");
}

#[tokio::test]
async fn embeddings_roundtrip_without_completion_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/openai/deployments/ada/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "model": "ada",
            "data": [
                { "object": "embedding", "index": 0, "embedding": [0.1, 0.2, 0.3] }
            ],
            "usage": { "prompt_tokens": 3, "total_tokens": 3 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = AzureConfigBuilder::embedding()
        .with_endpoint(server.uri())
        .with_deployment_name("ada")
        .with_api_key("test-key")
        .build()
        .expect("valid config");

    let client = EmbeddingsClient::new(config).expect("client");
    let response = client
        .embed(EmbeddingsRequest::new(vec!["hello".to_string()]))
        .await
        .expect("embeddings");

    assert_eq!(response.data.len(), 1);
    assert_eq!(response.data[0].embedding.len(), 3);
    assert_eq!(response.usage.completion_tokens, 0);
}

#[tokio::test]
async fn client_debug_output_redacts_credentials() {
    let config = AzureConfigBuilder::text()
        .with_base_url("https://example.com")
        .with_api_key("super-secret")
        .build()
        .expect("valid config");

    let client = TextCompletionClient::new(config).expect("client");
    let rendered = format!("{client:?}");

    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("***"));
}

#[tokio::test]
async fn kind_mismatch_is_rejected_at_client_construction() {
    let config = AzureConfigBuilder::chat()
        .with_base_url("https://example.com")
        .with_api_key("key")
        .build()
        .expect("valid config");

    let err = TextCompletionClient::new(config).expect_err("chat config for a text client");
    assert!(matches!(err, LlmError::ProviderConfiguration(_)));
    assert!(err.to_string().contains("chat"));
}

#[tokio::test]
async fn unresolvable_address_is_rejected_at_client_construction() {
    let config = AzureConfigBuilder::text()
        .with_deployment_name("gpt")
        .with_api_key("key")
        .build()
        .expect("credentials-only config is still a legal value");

    let err = TextCompletionClient::new(config).expect_err("no resolvable address");
    assert!(matches!(err, LlmError::ProviderConfiguration(_)));
    assert!(err.to_string().contains("base_url"));
}
