//! HTTP response parser for the Gemini API.

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{map_http_status_with_retry_after, GeminiError};
use super::http::HttpResponse;

/// Parser for HTTP responses from the Gemini API.
pub struct ResponseParser;

impl ResponseParser {
    /// Parses a successful HTTP response into the expected type, or maps the
    /// error status.
    pub fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T, GeminiError> {
        if response.is_success() {
            let parsed: T = serde_json::from_slice(&response.body)?;
            Ok(parsed)
        } else {
            Err(Self::parse_error_response(&response))
        }
    }

    /// Accepts any 2xx response and discards its body.
    pub fn parse_empty(response: HttpResponse) -> Result<(), GeminiError> {
        if response.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error_response(&response))
        }
    }

    /// Maps an error response to a `GeminiError` carrying status, RPC status
    /// string, message and any `Retry-After` hint.
    pub fn parse_error_response(response: &HttpResponse) -> GeminiError {
        let retry_after = Self::parse_retry_after(&response.headers);
        let error = map_http_status_with_retry_after(response.status, &response.body, retry_after);

        if let Some(id) = Self::extract_request_id(&response.headers) {
            tracing::debug!(
                request_id = %id,
                status = response.status,
                error = %error,
                "API error occurred"
            );
        }

        error
    }

    /// Parses a `Retry-After` header expressed in seconds.
    pub fn parse_retry_after(headers: &HashMap<String, String>) -> Option<Duration> {
        headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case("retry-after"))
            .and_then(|(_, value)| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Finds a request identifier header for debugging.
    pub fn extract_request_id(headers: &HashMap<String, String>) -> Option<String> {
        let possible_headers = ["x-request-id", "x-goog-request-id", "request-id"];

        headers
            .iter()
            .find(|(key, _)| possible_headers.contains(&key.to_ascii_lowercase().as_str()))
            .map(|(_, value)| value.clone())
    }
}
