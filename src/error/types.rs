//! Main error type for the Gemini bridge.

use std::time::Duration;
use thiserror::Error;
use super::categories::*;

/// Result type alias for Gemini operations.
pub type GeminiResult<T> = Result<T, GeminiError>;

/// Top-level error type for the Gemini bridge.
#[derive(Error, Debug, Clone)]
pub enum GeminiError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    #[error("Rate limit error: {0}")]
    RateLimit(#[from] RateLimitError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),
}

impl GeminiError {
    /// Builds a validation error from accumulated field details.
    pub fn validation(message: impl Into<String>, details: Vec<ValidationDetail>) -> Self {
        GeminiError::Request(RequestError::ValidationError {
            message: message.into(),
            details,
        })
    }

    /// Returns true if this error is retryable.
    ///
    /// Rate limits, 5xx responses, transport failures (including per-attempt
    /// timeouts) and unparseable response bodies are transient. Every other
    /// upstream status is terminal. Media failures are never retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeminiError::RateLimit(_)
                | GeminiError::Server(_)
                | GeminiError::Network(_)
                | GeminiError::Response(ResponseError::DeserializationError { .. })
        )
    }

    /// Returns the retry-after duration if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GeminiError::RateLimit(e) => e.retry_after(),
            GeminiError::Server(ServerError::ServiceUnavailable { retry_after, .. }) => *retry_after,
            _ => None,
        }
    }

    /// Upstream failure details, if this error was mapped from an API response.
    pub fn api_info(&self) -> Option<&ApiErrorInfo> {
        match self {
            GeminiError::Authentication(
                AuthenticationError::InvalidApiKey { info }
                | AuthenticationError::PermissionDenied { info },
            )
            | GeminiError::Request(
                RequestError::BadRequest { info, .. } | RequestError::Rejected { info },
            )
            | GeminiError::RateLimit(RateLimitError::TooManyRequests { info, .. })
            | GeminiError::Server(
                ServerError::InternalError { info } | ServerError::ServiceUnavailable { info, .. },
            )
            | GeminiError::Response(ResponseError::UnexpectedStatus { info })
            | GeminiError::Resource(ResourceError::NotFound { info }) => Some(info),
            _ => None,
        }
    }

    /// HTTP status code of the upstream response that produced this error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GeminiError::Media(MediaError::HttpStatus { status, .. }) => Some(*status),
            _ => self.api_info().map(|info| info.http_status),
        }
    }

    /// Returns true for argument problems detected before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GeminiError::Request(
                RequestError::ValidationError { .. }
                    | RequestError::InvalidParameter { .. }
                    | RequestError::PayloadTooLarge { .. }
            )
        )
    }
}

impl From<reqwest::Error> for GeminiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GeminiError::Network(NetworkError::Timeout {
                duration: Duration::from_secs(0),
            })
        } else if err.is_decode() {
            GeminiError::Response(ResponseError::DeserializationError {
                message: err.to_string(),
            })
        } else {
            GeminiError::Network(NetworkError::ConnectionFailed {
                message: err.to_string(),
            })
        }
    }
}

impl From<serde_json::Error> for GeminiError {
    fn from(err: serde_json::Error) -> Self {
        GeminiError::Response(ResponseError::DeserializationError {
            message: err.to_string(),
        })
    }
}

impl From<url::ParseError> for GeminiError {
    fn from(err: url::ParseError) -> Self {
        GeminiError::Configuration(ConfigurationError::InvalidBaseUrl {
            url: err.to_string(),
        })
    }
}
