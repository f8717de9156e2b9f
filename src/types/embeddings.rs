//! Embedding-related types for the Gemini API.

use serde::{Deserialize, Serialize};

use super::content::Content;

/// One entry of a `batchEmbedContents` request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmbedContentRequest {
    /// Fully qualified model name, `models/{model}`.
    pub model: String,
    /// The text to embed.
    pub content: Content,
    /// Intended downstream use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_type: Option<TaskType>,
    /// Only valid with `RETRIEVAL_DOCUMENT`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Truncates the vector to this many dimensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dimensionality: Option<u32>,
}

/// Request body for `models/{model}:batchEmbedContents`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchEmbedContentsRequest {
    /// One entry per text.
    pub requests: Vec<EmbedContentRequest>,
}

/// Task types for embeddings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    /// Default value, unused.
    #[default]
    TaskTypeUnspecified,
    /// Query for search or retrieval.
    RetrievalQuery,
    /// Document from the searched corpus.
    RetrievalDocument,
    /// Semantic textual similarity.
    SemanticSimilarity,
    /// Classification.
    Classification,
    /// Clustering.
    Clustering,
    /// Question answering.
    QuestionAnswering,
    /// Fact verification.
    FactVerification,
    /// Code retrieval query.
    CodeRetrievalQuery,
}

/// An embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embedding {
    /// The vector components.
    #[serde(default)]
    pub values: Vec<f32>,
}

/// Response from batch embedding, one embedding per request entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BatchEmbedContentsResponse {
    /// Embeddings in request order.
    #[serde(default)]
    pub embeddings: Vec<Embedding>,
}
