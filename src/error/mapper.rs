//! Error mapping utilities for HTTP status codes and API responses.

use std::time::Duration;
use serde::Deserialize;
use super::categories::*;
use super::types::GeminiError;

/// Structured API error response from Gemini.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    /// The error payload.
    pub error: ApiErrorDetail,
}

/// Detailed error information from API.
#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    /// Numeric HTTP code echoed in the body.
    #[serde(default)]
    pub code: Option<i32>,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// RPC status, e.g. `INVALID_ARGUMENT`.
    #[serde(default)]
    pub status: Option<String>,
    /// Typed detail objects such as `google.rpc.BadRequest`.
    #[serde(default)]
    pub details: Vec<serde_json::Value>,
}

/// Maps an HTTP status code and error body to a `GeminiError`.
///
/// The status integer alone decides the category; the body only contributes
/// the message, the RPC status string and field violations.
pub fn map_http_status_with_body(status: u16, body: &[u8]) -> GeminiError {
    map_http_status_with_retry_after(status, body, None)
}

/// Same as [`map_http_status_with_body`], attaching a `Retry-After` hint to
/// 429 and 503 errors.
pub fn map_http_status_with_retry_after(
    status: u16,
    body: &[u8],
    retry_after: Option<Duration>,
) -> GeminiError {
    let (info, raw_details) = parse_error_body(status, body);

    match status {
        400 => GeminiError::Request(RequestError::BadRequest {
            details: parse_validation_details(&raw_details),
            info,
        }),
        401 => GeminiError::Authentication(AuthenticationError::InvalidApiKey { info }),
        403 => GeminiError::Authentication(AuthenticationError::PermissionDenied { info }),
        404 => GeminiError::Resource(ResourceError::NotFound { info }),
        429 => GeminiError::RateLimit(RateLimitError::TooManyRequests { retry_after, info }),
        503 => GeminiError::Server(ServerError::ServiceUnavailable { retry_after, info }),
        500..=599 => GeminiError::Server(ServerError::InternalError { info }),
        400..=499 => GeminiError::Request(RequestError::Rejected { info }),
        _ => GeminiError::Response(ResponseError::UnexpectedStatus { info }),
    }
}

fn parse_error_body(status: u16, body: &[u8]) -> (ApiErrorInfo, Vec<serde_json::Value>) {
    if let Ok(parsed) = serde_json::from_slice::<ApiErrorResponse>(body) {
        let message = if parsed.error.message.is_empty() {
            default_message(status)
        } else {
            parsed.error.message
        };
        return (
            ApiErrorInfo::new(status, parsed.error.status, message),
            parsed.error.details,
        );
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    let message = if text.is_empty() { default_message(status) } else { text };
    (ApiErrorInfo::new(status, None, message), Vec::new())
}

fn default_message(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown error")
        .to_string()
}

/// Parses field violations from a Google RPC error `details` array.
///
/// Accepts both the `google.rpc.BadRequest` shape (`fieldViolations`) and a
/// flat `{field, description}` object.
fn parse_validation_details(details: &[serde_json::Value]) -> Vec<ValidationDetail> {
    let mut result = Vec::new();

    for detail in details {
        if let Some(violations) = detail.get("fieldViolations").and_then(|v| v.as_array()) {
            for violation in violations {
                if let Some(parsed) = parse_violation(violation) {
                    result.push(parsed);
                }
            }
        } else if let Some(parsed) = parse_violation(detail) {
            result.push(parsed);
        }
    }

    result
}

fn parse_violation(value: &serde_json::Value) -> Option<ValidationDetail> {
    let obj = value.as_object()?;
    let field = obj
        .get("field")
        .or_else(|| obj.get("fieldPath"))
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    let description = obj
        .get("description")
        .or_else(|| obj.get("message"))
        .and_then(|v| v.as_str())
        .filter(|d| !d.is_empty())?;

    Some(ValidationDetail::new(field, description))
}
