//! Error category types for granular error handling.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Upstream failure details attached to every error mapped from a non-2xx
/// Gemini response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorInfo {
    /// HTTP status code returned by the API.
    pub http_status: u16,
    /// Google RPC status string (e.g. `INVALID_ARGUMENT`), when present.
    pub status: Option<String>,
    /// Human-readable message from the error body.
    pub message: String,
}

impl ApiErrorInfo {
    /// Creates error info from its parts.
    pub fn new(http_status: u16, status: Option<String>, message: impl Into<String>) -> Self {
        Self {
            http_status,
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Some(status) => write!(f, "HTTP {} {}: {}", self.http_status, status, self.message),
            None => write!(f, "HTTP {}: {}", self.http_status, self.message),
        }
    }
}

/// Configuration-related errors.
#[derive(Error, Debug, Clone)]
pub enum ConfigurationError {
    #[error("Missing API key (set GEMINI_API_KEY or GOOGLE_API_KEY)")]
    MissingApiKey,

    #[error("Invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Authentication-related errors.
#[derive(Error, Debug, Clone)]
pub enum AuthenticationError {
    #[error("Invalid API key ({info})")]
    InvalidApiKey { info: ApiErrorInfo },

    #[error("Permission denied ({info})")]
    PermissionDenied { info: ApiErrorInfo },
}

/// Request errors, both local validation and upstream rejections.
#[derive(Error, Debug, Clone)]
pub enum RequestError {
    #[error("Validation error: {message}{}", format_details(.details))]
    ValidationError { message: String, details: Vec<ValidationDetail> },

    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    #[error("Payload too large: {size} bytes (max: {max_size})")]
    PayloadTooLarge { size: usize, max_size: usize },

    #[error("Bad request ({info}){}", format_details(.details))]
    BadRequest { info: ApiErrorInfo, details: Vec<ValidationDetail> },

    #[error("Request rejected ({info})")]
    Rejected { info: ApiErrorInfo },
}

/// Validation detail for field-level errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetail {
    /// Field path, e.g. `contents[0].parts`.
    pub field: String,
    /// What is wrong with the field.
    pub description: String,
}

impl ValidationDetail {
    /// Creates a detail for the given field.
    pub fn new(field: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            description: description.into(),
        }
    }
}

fn format_details(details: &[ValidationDetail]) -> String {
    if details.is_empty() {
        return String::new();
    }
    let joined = details
        .iter()
        .map(|d| format!("{}: {}", d.field, d.description))
        .collect::<Vec<_>>()
        .join("; ");
    format!(" [{joined}]")
}

/// Rate limiting errors.
#[derive(Error, Debug, Clone)]
pub enum RateLimitError {
    #[error("Too many requests ({info})")]
    TooManyRequests {
        retry_after: Option<Duration>,
        info: ApiErrorInfo,
    },
}

impl RateLimitError {
    /// Server-suggested wait before retrying.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            RateLimitError::TooManyRequests { retry_after, .. } => *retry_after,
        }
    }
}

/// Network-related errors.
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("DNS resolution failed: {host}")]
    DnsResolutionFailed { host: String },

    #[error("TLS error: {message}")]
    TlsError { message: String },
}

/// Server-side errors.
#[derive(Error, Debug, Clone)]
pub enum ServerError {
    #[error("Internal server error ({info})")]
    InternalError { info: ApiErrorInfo },

    #[error("Service unavailable ({info})")]
    ServiceUnavailable {
        retry_after: Option<Duration>,
        info: ApiErrorInfo,
    },
}

/// Response parsing errors.
#[derive(Error, Debug, Clone)]
pub enum ResponseError {
    #[error("Failed to deserialize response: {message}")]
    DeserializationError { message: String },

    #[error("Unexpected response format: {message}")]
    UnexpectedFormat { message: String },

    #[error("Unexpected response status ({info})")]
    UnexpectedStatus { info: ApiErrorInfo },
}

/// Resource-related errors.
#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    #[error("Resource not found ({info})")]
    NotFound { info: ApiErrorInfo },
}

/// Failures while retrieving externally referenced media.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("Invalid media URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Unsupported URL scheme '{scheme}' (only http and https are allowed)")]
    UnsupportedScheme { scheme: String },

    #[error("Destination not allowed: {host}")]
    DisallowedDestination { host: String },

    #[error("Invalid data URI: {reason}")]
    InvalidDataUri { reason: String },

    #[error("Media too large: {size} bytes (max: {max_size})")]
    TooLarge { size: u64, max_size: u64 },

    #[error("Media request failed with HTTP {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("Media request timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Media request failed: {message}")]
    FetchFailed { message: String },
}
