//! End-to-end tool calls through the dispatcher with a mocked Gemini API.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use integrations_gemini_mcp::mocks::{MockAuthManager, MockHttpTransport, StubMediaSource};
use integrations_gemini_mcp::transport::HttpMethod;
use integrations_gemini_mcp::{
    GeminiClientBuilder, InMemoryEventSink, RetryConfig, ToolDispatcher, ToolKind, ToolOutcome,
    ToolResponse,
};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;

const HELLO_SHA256_BASE64: &str = "LPJNul+wow4m6DsqxbninhsWHlwfp0JecwQzYpOLmCQ=";
const HELLO_SHA256_HEX: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

struct Harness {
    transport: Arc<MockHttpTransport>,
    media: StubMediaSource,
    events: Arc<InMemoryEventSink>,
    dispatcher: ToolDispatcher,
}

impl Harness {
    fn new() -> Self {
        Self::with_media(StubMediaSource::new())
    }

    fn with_media(media: StubMediaSource) -> Self {
        let transport = Arc::new(MockHttpTransport::new());
        let events = Arc::new(InMemoryEventSink::new(InMemoryEventSink::DEFAULT_CAPACITY));
        let client = GeminiClientBuilder::new()
            .api_key(SecretString::new("test-key".to_string()))
            .transport(transport.clone())
            .auth_manager(Box::new(MockAuthManager::new("test-key")))
            .media_source(Arc::new(media.clone()))
            .retry_config(RetryConfig::no_retry())
            .build()
            .unwrap();

        Self {
            transport,
            media,
            events: events.clone(),
            dispatcher: ToolDispatcher::new(Arc::new(client), events),
        }
    }

    async fn call(&self, tool: &str, arguments: Value) -> ToolResponse {
        self.dispatcher.call(tool, Some(arguments)).await
    }

    fn last_outcome(&self) -> ToolOutcome {
        self.events.events().last().unwrap().outcome
    }
}

fn structured(response: &ToolResponse) -> &Value {
    response.structured.as_ref().unwrap()
}

fn uploaded_file(expiration: &str) -> String {
    json!({
        "file": {
            "name": "files/new123",
            "mimeType": "text/plain",
            "sizeBytes": "5",
            "createTime": "2024-06-01T10:00:00Z",
            "expirationTime": expiration,
            "sha256Hash": HELLO_SHA256_BASE64,
            "uri": "https://generativelanguage.googleapis.com/v1beta/files/new123",
            "state": "ACTIVE"
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_catalog_has_all_tools() {
    let harness = Harness::new();
    let names: Vec<String> = harness.dispatcher.catalog().into_iter().map(|d| d.name).collect();

    let expected: Vec<String> = ToolKind::ALL.iter().map(|k| k.name().to_string()).collect();
    assert_eq!(names, expected);
    assert!(names.contains(&"gemini_upload_file".to_string()));
}

#[tokio::test]
async fn test_unknown_tool_is_an_error_envelope() {
    let harness = Harness::new();

    let response = harness.call("gemini_teleport", json!({})).await;

    assert!(response.is_error);
    assert_eq!(response.text_content(), "Unknown tool: gemini_teleport");
    harness.transport.verify_request_count(0);
    assert_eq!(harness.last_outcome(), ToolOutcome::Error);
}

#[tokio::test]
async fn test_generate_returns_text_and_usage() {
    let harness = Harness::new();
    harness.transport.enqueue_json_response(
        200,
        r#"{
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Blue, red, green"}]}, "finishReason": "STOP"}],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16}
        }"#,
    );

    let response = harness
        .call(
            "gemini_generate",
            json!({
                "prompt": "List three colors",
                "model": "gemini-2.0-flash",
                "system": "Be brief",
                "generationConfig": {"temperature": 0.5}
            }),
        )
        .await;

    assert!(!response.is_error, "{}", response.text_content());
    assert_eq!(
        response.text_content(),
        "Blue, red, green\n\n[usage: prompt=12 completion=4 total=16]"
    );
    assert_eq!(structured(&response)["usage"]["totalTokens"], 16);

    harness
        .transport
        .verify_request(0, HttpMethod::Post, "models/gemini-2.0-flash:generateContent");
    let body = harness.transport.request_json(0);
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Be brief");
    assert_eq!(body["generationConfig"]["temperature"], 0.5);

    let event = harness.events.events().pop().unwrap();
    assert_eq!(event.tool, "gemini_generate");
    assert_eq!(event.model.as_deref(), Some("gemini-2.0-flash"));
    assert_eq!(event.outcome, ToolOutcome::Success);
    assert_eq!(event.usage.unwrap().total_tokens, 16);
}

#[tokio::test]
async fn test_generate_surfaces_thought_summaries() {
    let harness = Harness::new();
    harness.transport.enqueue_json_response(
        200,
        r#"{"candidates": [{"content": {"role": "model", "parts": [
            {"text": "plan", "thought": true},
            {"text": "answer"}
        ]}, "finishReason": "STOP"}]}"#,
    );

    let response = harness
        .call(
            "gemini_generate",
            json!({"prompt": "think first", "thinking": {"includeThoughts": true}}),
        )
        .await;

    assert!(!response.is_error, "{}", response.text_content());
    assert_eq!(response.text_content(), "Thoughts:\nplan\n\nanswer");
    assert_eq!(structured(&response)["text"], "answer");
    assert_eq!(structured(&response)["thoughts"], "plan");

    let body = harness.transport.request_json(0);
    assert_eq!(body["generationConfig"]["thinkingConfig"]["includeThoughts"], true);
}

#[tokio::test]
async fn test_path_like_model_never_reaches_the_api() {
    let harness = Harness::new();

    let response = harness
        .call("gemini_generate", json!({"prompt": "hi", "model": "../files/secret"}))
        .await;

    assert!(response.is_error);
    assert!(response.text_content().contains("not a valid model name"), "{}", response.text_content());
    harness.transport.verify_request_count(0);
}

#[tokio::test]
async fn test_generate_uses_default_model() {
    let harness = Harness::new();
    harness.transport.enqueue_json_response(
        200,
        r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "hi"}]}, "finishReason": "STOP"}]}"#,
    );

    harness.call("gemini_generate", json!({"prompt": "hello"})).await;

    harness
        .transport
        .verify_request(0, HttpMethod::Post, "models/gemini-2.5-flash:generateContent");
}

#[tokio::test]
async fn test_blocked_prompt_is_reported_not_failed() {
    let harness = Harness::new();
    harness.transport.enqueue_json_response(
        200,
        r#"{"promptFeedback": {"blockReason": "SAFETY"}, "usageMetadata": {"promptTokenCount": 5, "totalTokenCount": 5}}"#,
    );

    let response = harness.call("gemini_generate", json!({"prompt": "something bad"})).await;

    assert!(!response.is_error);
    assert!(response.text_content().starts_with("Response blocked:"));
    assert_eq!(structured(&response)["blocked"], true);
    assert_eq!(harness.last_outcome(), ToolOutcome::Blocked);
}

#[tokio::test]
async fn test_invalid_arguments_never_reach_the_api() {
    let harness = Harness::new();

    let blank = harness.call("gemini_generate", json!({"prompt": "   "})).await;
    assert!(blank.is_error);
    assert!(blank.text_content().contains("prompt"));

    let wrong_type = harness.call("gemini_generate", json!({"prompt": 42})).await;
    assert!(wrong_type.is_error);
    assert!(wrong_type.text_content().contains("invalid arguments for gemini_generate"));

    let missing = harness.dispatcher.call("gemini_embeddings", None).await;
    assert!(missing.is_error);

    harness.transport.verify_request_count(0);
    assert_eq!(harness.events.summary()["gemini_generate"].errors, 2);
}

#[tokio::test]
async fn test_upstream_failure_is_an_error_envelope() {
    let harness = Harness::new();
    harness
        .transport
        .enqueue_api_error(400, "INVALID_ARGUMENT", "Unsupported MIME type");

    let response = harness.call("gemini_generate", json!({"prompt": "hello"})).await;

    assert!(response.is_error);
    let text = response.text_content();
    assert!(text.starts_with("gemini_generate failed:"), "{text}");
    assert!(text.contains("Unsupported MIME type"), "{text}");

    let event = harness.events.events().pop().unwrap();
    assert_eq!(event.outcome, ToolOutcome::Error);
    assert!(event.error.unwrap().contains("HTTP 400"));
}

#[tokio::test]
async fn test_messages_inline_remote_media_and_return_function_calls() {
    let media = StubMediaSource::new().with_media("https://example.com/cat.png", "image/png", "iVBORw0KGgo=");
    let harness = Harness::with_media(media);
    harness.transport.enqueue_json_response(
        200,
        r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "Looking it up."},
                    {"functionCall": {"name": "find_breed", "args": {"animal": "cat"}}}
                ]},
                "finishReason": "STOP"
            }]
        }"#,
    );

    let response = harness
        .call(
            "gemini_messages",
            json!({
                "messages": [
                    {"role": "system", "content": "You identify animals."},
                    {"role": "user", "content": [
                        {"type": "text", "text": "What breed is this?"},
                        {"type": "image", "url": "https://example.com/cat.png"}
                    ]}
                ],
                "tools": [{"functionDeclarations": [{"name": "find_breed", "description": "Look up a breed"}]}]
            }),
        )
        .await;

    assert!(!response.is_error, "{}", response.text_content());
    assert!(response.text_content().contains("Function calls:"));
    assert_eq!(structured(&response)["functionCalls"][0]["name"], "find_breed");
    assert_eq!(harness.media.fetched(), vec!["https://example.com/cat.png".to_string()]);

    let body = harness.transport.request_json(0);
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "You identify animals.");
    assert_eq!(body["contents"].as_array().unwrap().len(), 1);
    assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/png");
    assert_eq!(body["tools"][0]["functionDeclarations"][0]["name"], "find_breed");
}

#[tokio::test]
async fn test_messages_with_unreachable_media_still_sent() {
    let harness = Harness::new();
    harness.transport.enqueue_json_response(
        200,
        r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "I cannot see it."}]}, "finishReason": "STOP"}]}"#,
    );

    let response = harness
        .call(
            "gemini_messages",
            json!({"messages": [{"role": "user", "content": [
                {"type": "image", "url": "https://example.com/missing.png"}
            ]}]}),
        )
        .await;

    assert!(!response.is_error);
    let body = harness.transport.request_json(0);
    let placeholder = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(placeholder.starts_with("[image unavailable: https://example.com/missing.png"));
}

#[tokio::test]
async fn test_upload_with_ttl_reports_requested_expiry() {
    let harness = Harness::new();
    harness.transport.enqueue_json_response(200, &uploaded_file("2099-01-01T00:00:00Z"));

    let before = Utc::now();
    let response = harness
        .call(
            "gemini_upload_file",
            json!({
                "source": "aGVsbG8=",
                "mimeType": "text/plain",
                "dedupe": false,
                "retention": {"type": "temporary", "ttlSeconds": 3600}
            }),
        )
        .await;
    let after = Utc::now();

    assert!(!response.is_error, "{}", response.text_content());
    let record = structured(&response);
    assert_eq!(record["fileId"], "new123");
    assert_eq!(record["sha256"], HELLO_SHA256_HEX);
    assert_eq!(record["deduplicated"], false);

    let expires_at: DateTime<Utc> = record["expiresAt"].as_str().unwrap().parse().unwrap();
    assert!(expires_at >= before + ChronoDuration::seconds(3599));
    assert!(expires_at <= after + ChronoDuration::seconds(3601));

    harness.transport.verify_request_count(1);
    harness.transport.verify_request(0, HttpMethod::Post, "/upload/v1beta/files");
}

#[tokio::test]
async fn test_upload_keeps_earlier_provider_expiry() {
    let harness = Harness::new();
    harness.transport.enqueue_json_response(200, &uploaded_file("2024-06-03T10:00:00Z"));

    let response = harness
        .call(
            "gemini_upload_file",
            json!({
                "source": "data:text/plain;base64,aGVsbG8=",
                "mimeType": "text/plain",
                "dedupe": false,
                "retention": {"type": "temporary", "ttlSeconds": 60}
            }),
        )
        .await;

    assert!(!response.is_error, "{}", response.text_content());
    assert_eq!(structured(&response)["expiresAt"], "2024-06-03T10:00:00Z");
}

#[tokio::test]
async fn test_upload_retention_must_name_exactly_one_limit() {
    let harness = Harness::new();

    let neither = harness
        .call(
            "gemini_upload_file",
            json!({"source": "aGVsbG8=", "mimeType": "text/plain", "retention": {"type": "temporary"}}),
        )
        .await;
    assert!(neither.is_error);
    assert!(neither.text_content().contains("retention"));

    let both = harness
        .call(
            "gemini_upload_file",
            json!({
                "source": "aGVsbG8=",
                "mimeType": "text/plain",
                "retention": {"type": "temporary", "ttlSeconds": 600, "expiresAt": "2099-01-01T00:00:00Z"}
            }),
        )
        .await;
    assert!(both.is_error);

    let too_short = harness
        .call(
            "gemini_upload_file",
            json!({"source": "aGVsbG8=", "mimeType": "text/plain", "retention": {"type": "temporary", "ttlSeconds": 59}}),
        )
        .await;
    assert!(too_short.is_error);
    assert!(too_short.text_content().contains("retention.ttlSeconds"));

    harness.transport.verify_request_count(0);
}

#[tokio::test]
async fn test_upload_reuses_identical_file() {
    let harness = Harness::new();
    harness.transport.enqueue_json_response(
        200,
        &json!({
            "files": [
                {"name": "files/other", "mimeType": "text/plain", "sha256Hash": "AAAA", "state": "ACTIVE"},
                {
                    "name": "files/existing",
                    "mimeType": "text/plain",
                    "sizeBytes": "5",
                    "sha256Hash": HELLO_SHA256_BASE64,
                    "state": "ACTIVE"
                }
            ]
        })
        .to_string(),
    );

    let response = harness
        .call("gemini_upload_file", json!({"source": "aGVsbG8=", "mimeType": "text/plain"}))
        .await;

    assert!(!response.is_error, "{}", response.text_content());
    let record = structured(&response);
    assert_eq!(record["fileId"], "existing");
    assert_eq!(record["deduplicated"], true);
    assert_eq!(record["sha256"], HELLO_SHA256_HEX);

    harness.transport.verify_request_count(1);
    harness.transport.verify_request(0, HttpMethod::Get, "/v1beta/files?pageSize=100");
}

#[tokio::test]
async fn test_upload_proceeds_when_duplicate_scan_fails() {
    let harness = Harness::new();
    harness.transport.enqueue_api_error(500, "INTERNAL", "list unavailable");
    harness.transport.enqueue_json_response(200, &uploaded_file("2099-01-01T00:00:00Z"));

    let response = harness
        .call("gemini_upload_file", json!({"source": "aGVsbG8=", "mimeType": "text/plain"}))
        .await;

    assert!(!response.is_error, "{}", response.text_content());
    assert_eq!(structured(&response)["fileId"], "new123");
    harness.transport.verify_request_count(2);
}

#[tokio::test]
async fn test_upload_rejects_malformed_base64() {
    let harness = Harness::new();

    let response = harness
        .call("gemini_upload_file", json!({"source": "%%%not-base64", "mimeType": "text/plain"}))
        .await;

    assert!(response.is_error);
    harness.transport.verify_request_count(0);
}

#[tokio::test]
async fn test_list_files_applies_filter() {
    let harness = Harness::new();
    harness.transport.enqueue_json_response(
        200,
        r#"{
            "files": [
                {"name": "files/img", "displayName": "Holiday photo", "mimeType": "image/png", "createTime": "2024-06-01T00:00:00Z"},
                {"name": "files/doc", "displayName": "Report", "mimeType": "application/pdf", "createTime": "2024-06-02T00:00:00Z"},
                {"name": "files/old", "displayName": "Old photo", "mimeType": "image/png", "createTime": "2023-01-01T00:00:00Z"}
            ],
            "nextPageToken": "next"
        }"#,
    );

    let response = harness
        .call(
            "gemini_list_files",
            json!({
                "pageSize": 500,
                "filter": {"mimeTypes": ["IMAGE/PNG"], "createdAfter": "2024-01-01T00:00:00Z"}
            }),
        )
        .await;

    assert!(!response.is_error, "{}", response.text_content());
    let result = structured(&response);
    assert_eq!(result["count"], 1);
    assert_eq!(result["files"][0]["fileId"], "img");
    assert_eq!(result["nextPageToken"], "next");

    let url = harness.transport.last_request().unwrap().url;
    assert!(url.contains("pageSize=100"), "{url}");
}

#[tokio::test]
async fn test_delete_file_force_tolerates_missing_file() {
    let harness = Harness::new();
    harness.transport.enqueue_api_error(404, "NOT_FOUND", "File not found");

    let response = harness
        .call("gemini_delete_file", json!({"fileId": "files/gone", "force": true}))
        .await;

    assert!(!response.is_error);
    assert_eq!(response.text_content(), "File gone was already deleted");
    assert_eq!(structured(&response)["alreadyDeleted"], true);
}

#[tokio::test]
async fn test_delete_file_without_force_reports_missing_file() {
    let harness = Harness::new();
    harness.transport.enqueue_api_error(404, "NOT_FOUND", "File not found");

    let response = harness.call("gemini_delete_file", json!({"fileId": "gone"})).await;

    assert!(response.is_error);
    assert!(response.text_content().starts_with("gemini_delete_file failed:"));
    harness.transport.verify_request_count(1);
}

#[tokio::test]
async fn test_delete_file_success() {
    let harness = Harness::new();
    harness.transport.enqueue_json_response(200, "{}");

    let response = harness.call("gemini_delete_file", json!({"fileId": "abc"})).await;

    assert!(!response.is_error);
    assert_eq!(response.text_content(), "Deleted file abc");
    harness.transport.verify_request(0, HttpMethod::Delete, "/v1beta/files/abc");
}

#[tokio::test]
async fn test_embeddings_returns_vectors_in_order() {
    let harness = Harness::new();
    harness.transport.enqueue_json_response(
        200,
        r#"{"embeddings": [{"values": [0.1, 0.2]}, {"values": [0.3, 0.4]}]}"#,
    );

    let response = harness
        .call(
            "gemini_embeddings",
            json!({"texts": ["first", "second"], "taskType": "SEMANTIC_SIMILARITY"}),
        )
        .await;

    assert!(!response.is_error, "{}", response.text_content());
    let result = structured(&response);
    assert_eq!(result["model"], "text-embedding-004");
    assert_eq!(result["count"], 2);
    assert_eq!(result["dimensions"], 2);
    let second = result["embeddings"][1].as_array().unwrap();
    assert!((second[0].as_f64().unwrap() - 0.3).abs() < 1e-6);

    let event = harness.events.events().pop().unwrap();
    assert_eq!(event.model.as_deref(), Some("text-embedding-004"));
}

#[tokio::test]
async fn test_embeddings_truncation_is_applied_before_sending() {
    let harness = Harness::new();
    harness
        .transport
        .enqueue_json_response(200, r#"{"embeddings": [{"values": [1.0]}]}"#);
    let long = "x".repeat(100_005);

    let rejected = harness.call("gemini_embeddings", json!({"texts": [long.clone()]})).await;
    assert!(rejected.is_error);
    harness.transport.verify_request_count(0);

    let accepted = harness
        .call("gemini_embeddings", json!({"texts": [long], "truncate": "start"}))
        .await;
    assert!(!accepted.is_error, "{}", accepted.text_content());

    let body = harness.transport.request_json(0);
    let sent = body["requests"][0]["content"]["parts"][0]["text"].as_str().unwrap();
    assert_eq!(sent.chars().count(), 100_000);
}

#[tokio::test]
async fn test_get_docs_describes_every_tool() {
    let harness = Harness::new();

    let response = harness.dispatcher.call("gemini_get_docs", None).await;

    assert!(!response.is_error);
    let text = response.text_content();
    for kind in ToolKind::ALL {
        assert!(text.contains(kind.name()), "docs missing {}", kind.name());
    }
}

#[tokio::test]
async fn test_event_summary_counts_outcomes() {
    let harness = Harness::new();
    harness
        .transport
        .enqueue_json_response(200, r#"{"promptFeedback": {"blockReason": "OTHER"}}"#);
    harness.transport.enqueue_json_response(
        200,
        r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "ok"}]}, "finishReason": "STOP"}],
            "usageMetadata": {"promptTokenCount": 2, "candidatesTokenCount": 1, "totalTokenCount": 3}}"#,
    );

    harness.call("gemini_generate", json!({"prompt": "a"})).await;
    harness.call("gemini_generate", json!({"prompt": "b"})).await;
    harness.call("gemini_generate", json!({})).await;

    let summary = harness.events.summary();
    let generate = &summary["gemini_generate"];
    assert_eq!(generate.calls, 3);
    assert_eq!(generate.blocked, 1);
    assert_eq!(generate.errors, 1);
    assert_eq!(generate.total_tokens, 3);
}
