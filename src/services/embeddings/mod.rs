//! Embeddings service for Gemini API.

mod service;
mod validation;

use async_trait::async_trait;

use crate::error::GeminiError;
use crate::types::TaskType;

pub use service::EmbeddingsServiceImpl;
pub use validation::{validate_embed_texts, MAX_BATCH_SIZE};

/// Service for generating embeddings.
#[async_trait]
pub trait EmbeddingsService: Send + Sync {
    /// Embeds each text, returning one vector per input in input order.
    ///
    /// Inputs above [`MAX_BATCH_SIZE`] are split into concurrent batches.
    async fn embed_texts(
        &self,
        model: &str,
        texts: &[String],
        task_type: Option<TaskType>,
        output_dimensionality: Option<u32>,
    ) -> Result<Vec<Vec<f32>>, GeminiError>;
}
