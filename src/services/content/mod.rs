//! Content generation service and the tool-content mapper.

mod mapper;
mod service;
mod validation;

use async_trait::async_trait;

use crate::error::GeminiError;
use crate::types::{GenerateContentRequest, GenerateContentResponse};

pub use mapper::{ContentMapper, ContentPart, MappedConversation, Message, MessageContent, MessageRole};
pub use service::ContentServiceImpl;
pub use validation::validate_generate_request;

/// Service for content generation with Gemini models.
#[async_trait]
pub trait ContentService: Send + Sync {
    /// Runs `models/{model}:generateContent`.
    ///
    /// `model` may be given with or without the `models/` prefix.
    async fn generate(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError>;
}
