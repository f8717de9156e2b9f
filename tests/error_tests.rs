//! Integration tests for status classification of upstream responses.

use bytes::Bytes;
use integrations_gemini_mcp::error::{
    map_http_status_with_body, AuthenticationError, GeminiError, MediaError, RateLimitError,
    RequestError, ResourceError, ResponseError, ServerError,
};
use integrations_gemini_mcp::transport::{HttpResponse, ResponseParser, TransportError};
use std::collections::HashMap;
use std::time::Duration;

fn google_error(code: u16, status: &str, message: &str) -> Vec<u8> {
    serde_json::json!({"error": {"code": code, "message": message, "status": status}})
        .to_string()
        .into_bytes()
}

fn category(error: &GeminiError) -> &'static str {
    match error {
        GeminiError::Request(RequestError::BadRequest { .. }) => "bad_request",
        GeminiError::Request(RequestError::Rejected { .. }) => "rejected",
        GeminiError::Authentication(AuthenticationError::InvalidApiKey { .. }) => "invalid_key",
        GeminiError::Authentication(AuthenticationError::PermissionDenied { .. }) => "permission",
        GeminiError::Resource(ResourceError::NotFound { .. }) => "not_found",
        GeminiError::RateLimit(RateLimitError::TooManyRequests { .. }) => "rate_limit",
        GeminiError::Server(ServerError::InternalError { .. }) => "internal",
        GeminiError::Server(ServerError::ServiceUnavailable { .. }) => "unavailable",
        GeminiError::Response(ResponseError::UnexpectedStatus { .. }) => "unexpected",
        _ => "other",
    }
}

#[test]
fn test_status_decides_category() {
    let cases = [
        (400, "bad_request"),
        (401, "invalid_key"),
        (403, "permission"),
        (404, "not_found"),
        (409, "rejected"),
        (413, "rejected"),
        (429, "rate_limit"),
        (500, "internal"),
        (502, "internal"),
        (503, "unavailable"),
        (302, "unexpected"),
    ];

    for (status, expected) in cases {
        let error = map_http_status_with_body(status, &google_error(status, "X", "boom"));
        assert_eq!(category(&error), expected, "status {status}");
        assert_eq!(error.status_code(), Some(status));
    }
}

#[test]
fn test_only_transient_statuses_are_retryable() {
    for status in [429, 500, 502, 503, 504] {
        assert!(map_http_status_with_body(status, b"").is_retryable(), "{status}");
    }
    for status in [400, 401, 403, 404, 409, 413] {
        assert!(!map_http_status_with_body(status, b"").is_retryable(), "{status}");
    }
}

#[test]
fn test_message_falls_back_to_body_then_reason() {
    let plain = map_http_status_with_body(500, b"upstream exploded");
    assert_eq!(plain.api_info().unwrap().message, "upstream exploded");

    let empty = map_http_status_with_body(404, b"");
    assert_eq!(empty.api_info().unwrap().message, "Not Found");
    assert!(empty.api_info().unwrap().status.is_none());
}

#[test]
fn test_display_includes_upstream_details() {
    let error = map_http_status_with_body(403, &google_error(403, "PERMISSION_DENIED", "API not enabled"));
    assert_eq!(
        error.to_string(),
        "Authentication error: Permission denied (HTTP 403 PERMISSION_DENIED: API not enabled)"
    );
}

#[test]
fn test_field_violations_become_details() {
    let body = br#"{"error": {"code": 400, "message": "bad", "status": "INVALID_ARGUMENT", "details": [
        {"@type": "type.googleapis.com/google.rpc.BadRequest", "fieldViolations": [
            {"field": "generation_config.temperature", "description": "must be <= 2"},
            {"field": "contents", "description": "required"}
        ]}
    ]}}"#;

    match map_http_status_with_body(400, body) {
        GeminiError::Request(RequestError::BadRequest { details, .. }) => {
            let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
            assert_eq!(fields, vec!["generation_config.temperature", "contents"]);
        }
        other => panic!("Expected BadRequest, got {other:?}"),
    }
}

#[test]
fn test_retry_after_read_from_headers() {
    let mut headers = HashMap::new();
    headers.insert("Retry-After".to_string(), "17".to_string());
    let response = HttpResponse {
        status: 503,
        headers,
        body: Bytes::from(google_error(503, "UNAVAILABLE", "busy")),
    };

    let error = ResponseParser::parse_error_response(&response);
    assert_eq!(error.retry_after(), Some(Duration::from_secs(17)));
    assert!(error.is_retryable());

    let mut headers = HashMap::new();
    headers.insert("retry-after".to_string(), "Wed, 21 Oct 2015 07:28:00 GMT".to_string());
    assert_eq!(ResponseParser::parse_retry_after(&headers), None);
}

#[test]
fn test_transport_failures_are_network_errors() {
    let error: GeminiError = TransportError::Connection("connection reset".into()).into();
    assert!(error.is_retryable());
    assert_eq!(error.status_code(), None);

    let timeout: GeminiError = TransportError::Timeout.into();
    assert!(timeout.is_retryable());
}

#[test]
fn test_media_errors_are_terminal() {
    let error: GeminiError = MediaError::DisallowedDestination {
        host: "169.254.169.254".into(),
    }
    .into();
    assert!(!error.is_retryable());
    assert!(error.to_string().contains("169.254.169.254"));

    let status: GeminiError = MediaError::HttpStatus {
        status: 403,
        reason: "Forbidden".into(),
    }
    .into();
    assert_eq!(status.status_code(), Some(403));
    assert!(!status.is_retryable());
}
