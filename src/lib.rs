//! # Gemini MCP tool bridge
//!
//! Exposes the Google Gemini API (text generation, multimodal conversation,
//! file management and embeddings) as Model Context Protocol tools.
//!
//! ## Features
//!
//! - Seven tools behind one [`ToolDispatcher`] that never fails a call:
//!   errors come back as error envelopes
//! - Multimodal messages: remote images, audio and video are fetched behind a
//!   destination guard and inlined
//! - One retry policy for every upstream call (429, 5xx and network failures;
//!   1 s / 2 s / 4 s with `Retry-After` honoured) plus a per-attempt timeout
//! - Structured error classification carrying the upstream HTTP status
//! - Blocked-content detection and usage reporting
//! - Per-call [`ToolEvent`]s delivered to an injected [`EventSink`]
//! - Mock transport and media source for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_gemini_mcp::{create_client_from_env, ToolDispatcher, TracingEventSink};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = create_client_from_env()?;
//!     let dispatcher = ToolDispatcher::new(client, Arc::new(TracingEventSink));
//!
//!     let response = dispatcher
//!         .call("gemini_generate", Some(json!({"prompt": "Say hello"})))
//!         .await;
//!     println!("{}", response.text_content());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `tools` - Tool catalog, argument validation and dispatch
//! - `client` - Client interface, builder and factory functions
//! - `services` - Content (with the message mapper), files and embeddings
//! - `media` - Media fetching, `data:` URIs, MIME handling and SSRF guard
//! - `normalizer` - Text, usage, function-call and block extraction
//! - `transport` - HTTP transport, request building and execution
//! - `resilience` - Retry with exponential backoff
//! - `observability` - Structured logging and tool events
//! - `config`, `auth`, `error`, `types` - Supporting definitions

#![warn(clippy::all)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod media;
pub mod normalizer;
pub mod observability;
pub mod resilience;
pub mod services;
pub mod tools;
pub mod transport;
pub mod types;

// Always compiled so integration tests can use the test doubles.
pub mod mocks;

pub use auth::{ApiKeyAuthManager, AuthManager};
pub use client::{
    create_client, create_client_from_env, GeminiClient, GeminiClientBuilder, GeminiClientImpl,
};
pub use config::{
    GeminiConfig, GeminiConfigBuilder, LogLevel, MediaConfig, DEFAULT_API_VERSION,
    DEFAULT_BASE_URL, DEFAULT_EMBEDDING_MODEL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS,
};
pub use error::{
    ApiErrorInfo, AuthenticationError, ConfigurationError, GeminiError, GeminiResult,
    MediaError, NetworkError, RateLimitError, RequestError, ResourceError, ResponseError,
    ServerError, ValidationDetail,
};
pub use media::{FetchedMedia, MediaFetcher, MediaSource};
pub use normalizer::UsageMetrics;
pub use observability::{
    EventSink, InMemoryEventSink, NoopEventSink, ToolEvent, ToolOutcome, TracingEventSink,
};
pub use resilience::{RetryConfig, RetryExecutor};
pub use services::{
    ContentMapper, ContentPart, ContentService, EmbeddingsService, FilesService, Message,
    MessageContent, MessageRole,
};
pub use tools::{FileRecord, ToolContent, ToolDefinition, ToolDispatcher, ToolKind, ToolRequest, ToolResponse};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

pub use types::{
    Content, File, FunctionCall, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, Part, Role, TaskType,
};
