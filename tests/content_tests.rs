//! Integration tests for the content service: request shape, retry schedule
//! and upstream error classification.

use integrations_gemini_mcp::mocks::{MockAuthManager, MockHttpTransport, StubMediaSource};
use integrations_gemini_mcp::transport::HttpMethod;
use integrations_gemini_mcp::types::{Content, GenerateContentRequest, Part};
use integrations_gemini_mcp::{
    GeminiClient, GeminiClientBuilder, GeminiClientImpl, GeminiError, RequestError, RetryConfig,
};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

const SUCCESS: &str = r#"{
    "candidates": [{
        "content": {"role": "model", "parts": [{"text": "Paris"}]},
        "finishReason": "STOP",
        "index": 0
    }],
    "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 1, "totalTokenCount": 8},
    "modelVersion": "gemini-2.5-flash-001"
}"#;

fn create_client(transport: Arc<MockHttpTransport>, retry: RetryConfig) -> GeminiClientImpl {
    GeminiClientBuilder::new()
        .api_key(SecretString::new("test-key".to_string()))
        .transport(transport)
        .auth_manager(Box::new(MockAuthManager::new("test-key")))
        .media_source(Arc::new(StubMediaSource::new()))
        .retry_config(retry)
        .build()
        .unwrap()
}

fn question() -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(vec![Part::text("Capital of France?")])],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_generate_sends_expected_request() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, SUCCESS);
    let client = create_client(transport.clone(), RetryConfig::no_retry());

    let response = client.content().generate("gemini-2.5-flash", question()).await.unwrap();

    assert_eq!(response.model_version.as_deref(), Some("gemini-2.5-flash-001"));
    transport.verify_request_count(1);
    transport.verify_request(0, HttpMethod::Post, "/v1beta/models/gemini-2.5-flash:generateContent");
    transport.verify_header(0, "x-goog-api-key", "test-key");

    let body = transport.request_json(0);
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "Capital of France?");
}

#[tokio::test]
async fn test_model_prefix_is_accepted() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, SUCCESS);
    let client = create_client(transport.clone(), RetryConfig::no_retry());

    client
        .content()
        .generate("models/gemini-2.5-pro", question())
        .await
        .unwrap();

    transport.verify_request(0, HttpMethod::Post, "/models/gemini-2.5-pro:generateContent");
}

#[tokio::test]
async fn test_empty_contents_rejected_without_network_call() {
    let transport = Arc::new(MockHttpTransport::new());
    let client = create_client(transport.clone(), RetryConfig::default());

    let err = client
        .content()
        .generate("gemini-2.5-flash", GenerateContentRequest::default())
        .await
        .unwrap_err();

    assert!(err.is_validation());
    transport.verify_request_count(0);
}

#[tokio::test]
async fn test_model_with_path_segments_rejected() {
    let transport = Arc::new(MockHttpTransport::new());
    let client = create_client(transport.clone(), RetryConfig::default());

    let err = client
        .content()
        .generate("models/../files/abc", question())
        .await
        .unwrap_err();

    assert!(err.is_validation());
    transport.verify_request_count(0);
}

#[tokio::test]
async fn test_bad_request_is_attempted_once() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_api_error(400, "INVALID_ARGUMENT", "Invalid value at 'contents'");
    let client = create_client(transport.clone(), RetryConfig::default());

    let err = client.content().generate("gemini-2.5-flash", question()).await.unwrap_err();

    transport.verify_request_count(1);
    assert_eq!(err.status_code(), Some(400));
    assert!(!err.is_retryable());
    match err {
        GeminiError::Request(RequestError::BadRequest { info, .. }) => {
            assert_eq!(info.status.as_deref(), Some("INVALID_ARGUMENT"));
            assert_eq!(info.message, "Invalid value at 'contents'");
        }
        other => panic!("Expected BadRequest, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_server_errors_retry_with_exponential_backoff() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_api_error(503, "UNAVAILABLE", "overloaded");
    transport.enqueue_api_error(500, "INTERNAL", "oops");
    transport.enqueue_api_error(503, "UNAVAILABLE", "overloaded");
    transport.enqueue_json_response(200, SUCCESS);
    let client = create_client(transport.clone(), RetryConfig::default());

    let started = tokio::time::Instant::now();
    let response = client.content().generate("gemini-2.5-flash", question()).await;

    assert!(response.is_ok());
    transport.verify_request_count(4);
    // 1 s + 2 s + 4 s
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(7), "waited {waited:?}");
    assert!(waited < Duration::from_secs(8), "waited {waited:?}");
}

#[tokio::test(start_paused = true)]
async fn test_retries_exhausted_returns_last_error() {
    let transport = Arc::new(MockHttpTransport::new());
    for _ in 0..4 {
        transport.enqueue_api_error(500, "INTERNAL", "still failing");
    }
    let client = create_client(transport.clone(), RetryConfig::default());

    let err = client.content().generate("gemini-2.5-flash", question()).await.unwrap_err();

    transport.verify_request_count(4);
    assert_eq!(err.status_code(), Some(500));
    assert!(err.to_string().contains("still failing"));
}

#[tokio::test(start_paused = true)]
async fn test_retry_after_header_overrides_backoff() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response_with_headers(
        429,
        r#"{"error": {"code": 429, "message": "quota", "status": "RESOURCE_EXHAUSTED"}}"#,
        &[("retry-after", "5")],
    );
    transport.enqueue_json_response(200, SUCCESS);
    let client = create_client(transport.clone(), RetryConfig::default());

    let started = tokio::time::Instant::now();
    client.content().generate("gemini-2.5-flash", question()).await.unwrap();

    transport.verify_request_count(2);
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(5), "waited {waited:?}");
    assert!(waited < Duration::from_secs(6), "waited {waited:?}");
}

#[tokio::test(start_paused = true)]
async fn test_garbled_success_body_is_retried() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_json_response(200, "{not json");
    transport.enqueue_json_response(200, SUCCESS);
    let client = create_client(transport.clone(), RetryConfig::default());

    client.content().generate("gemini-2.5-flash", question()).await.unwrap();
    transport.verify_request_count(2);
}

#[tokio::test]
async fn test_auth_failure_is_terminal() {
    let transport = Arc::new(MockHttpTransport::new());
    transport.enqueue_api_error(401, "UNAUTHENTICATED", "API key not valid");
    let client = create_client(transport.clone(), RetryConfig::default());

    let err = client.content().generate("gemini-2.5-flash", question()).await.unwrap_err();

    transport.verify_request_count(1);
    assert!(matches!(err, GeminiError::Authentication(_)));
    assert_eq!(err.status_code(), Some(401));
}
