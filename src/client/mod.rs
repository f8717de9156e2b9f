//! Client interface and factory for the Gemini API.
//!
//! [`GeminiClientImpl`] owns the transport, the API key and the media source,
//! and hands out lazily created services.

mod builder;
mod client;
mod traits;

pub use builder::GeminiClientBuilder;
pub use client::{create_client, create_client_from_env, GeminiClientImpl};
pub use traits::GeminiClient;
