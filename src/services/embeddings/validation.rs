//! Validation functions for embeddings requests.

use crate::error::{GeminiError, GeminiResult, ValidationDetail};
use crate::transport::endpoints;

/// Gemini's ceiling on entries per `batchEmbedContents` call.
pub const MAX_BATCH_SIZE: usize = 100;

/// Validates the inputs of an embedding call; runs before any request.
pub fn validate_embed_texts(
    model: &str,
    texts: &[String],
    output_dimensionality: Option<u32>,
) -> GeminiResult<()> {
    let mut details = Vec::new();

    if model.trim().is_empty() {
        details.push(ValidationDetail::new("model", "Model must not be empty"));
    } else if !endpoints::is_valid_model_id(model) {
        details.push(ValidationDetail::new("model", format!("'{model}' is not a valid model name")));
    }
    if texts.is_empty() {
        details.push(ValidationDetail::new("texts", "At least one text is required"));
    }
    if output_dimensionality == Some(0) {
        details.push(ValidationDetail::new(
            "outputDimensionality",
            "Output dimensionality must be positive",
        ));
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(GeminiError::validation("Invalid embeddings request", details))
    }
}
