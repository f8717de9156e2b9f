//! Observability for the Gemini bridge.
//!
//! Two concerns live here:
//! - **Logging**: [`StructuredLogger`] emits `tracing` events with secret
//!   redaction, used by the services for request/response logs.
//! - **Tool events**: every tool call produces one [`ToolEvent`] handed to
//!   an injected [`EventSink`].
//!
//! # Example
//!
//! ```rust
//! use integrations_gemini_mcp::observability::{EventSink, InMemoryEventSink, ToolEvent, ToolOutcome};
//!
//! let sink = InMemoryEventSink::new(100);
//! sink.record_event(&ToolEvent {
//!     tool: "gemini_generate".to_string(),
//!     model: Some("gemini-2.5-flash".to_string()),
//!     outcome: ToolOutcome::Success,
//!     duration_ms: 420,
//!     usage: None,
//!     error: None,
//!     timestamp: chrono::Utc::now(),
//! });
//!
//! assert_eq!(sink.summary()["gemini_generate"].calls, 1);
//! ```

pub mod events;
pub mod logging;

pub use events::{
    EventSink, InMemoryEventSink, NoopEventSink, ToolEvent, ToolOutcome, ToolSummary,
    TracingEventSink,
};
pub use logging::{redact, Logger, StructuredLogger};
