//! Resilience layer for upstream calls.
//!
//! Every outbound Gemini operation goes through the same [`RetryExecutor`];
//! the per-attempt timeout lives in [`crate::transport::ApiExecutor`].

mod retry;

pub use retry::{RetryConfig, RetryExecutor};
