//! Wire types for the Gemini API.
//!
//! Request types serialize to the camelCase JSON the API expects. Response
//! types deserialize leniently: unknown enum values and part shapes map to
//! catch-all variants instead of failing.

pub mod content;
pub mod embeddings;
pub mod files;
pub mod generation;
pub mod safety;
pub mod tools;

pub use content::{
    Blob, CodeExecutionResult, Content, ExecutableCode, FileData, FunctionCall, FunctionResponse,
    Part, Role,
};

pub use embeddings::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, EmbedContentRequest, Embedding,
    TaskType,
};

pub use files::{File, FileState, ListFilesResponse, UploadFileResponse};

pub use generation::{
    BlockReason, Candidate, FinishReason, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, PromptFeedback, ThinkingConfig, UsageMetadata,
};

pub use safety::{HarmBlockThreshold, HarmCategory, HarmProbability, SafetyRating, SafetySetting};

pub use tools::{
    EmptyToolConfig, FunctionCallingConfig, FunctionCallingMode, FunctionDeclaration, Tool,
    ToolConfig,
};
