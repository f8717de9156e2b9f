//! Client trait definitions for the Gemini bridge.

use std::sync::Arc;

use crate::config::GeminiConfig;
use crate::media::MediaSource;
use crate::services::{ContentService, EmbeddingsService, FilesService};

/// Entry point to every upstream Gemini operation.
pub trait GeminiClient: Send + Sync {
    /// Content generation service.
    fn content(&self) -> &dyn ContentService;

    /// File upload and management service.
    fn files(&self) -> &dyn FilesService;

    /// Embeddings service.
    fn embeddings(&self) -> &dyn EmbeddingsService;

    /// Source used to resolve media references in tool input.
    fn media(&self) -> Arc<dyn MediaSource>;

    /// The shared configuration.
    fn config(&self) -> &GeminiConfig;
}
