//! Tool surface exposed to MCP clients.
//!
//! A call arrives as a tool name plus JSON arguments. [`ToolRequest::parse`]
//! turns that into a validated, typed request; [`ToolDispatcher`] runs it
//! against a [`GeminiClient`](crate::GeminiClient) and always answers with a
//! [`ToolResponse`], failures included.

mod args;
mod catalog;
mod dispatcher;
mod records;
mod response;
mod upload;

use serde::Serialize;
use std::fmt;

pub use args::{
    DeleteFileArgs, EmbeddingsArgs, FileFilter, GenerateArgs, GenerationOptions, ListFilesArgs,
    MessagesArgs, Retention, ToolRequest, Truncate, UploadFileArgs, MAX_EMBEDDING_TEXTS,
    MAX_EMBEDDING_TEXT_CHARS, MAX_LIST_PAGE_SIZE, MAX_TTL_SECONDS, MIN_TTL_SECONDS,
};
pub use dispatcher::ToolDispatcher;
pub use records::{normalize_sha256, FileRecord};
pub use response::{ToolContent, ToolResponse};
pub use upload::MAX_UPLOAD_BYTES;

/// Documentation returned by `gemini_get_docs`.
pub const TOOL_DOCS: &str = include_str!("../../docs/tools.md");

/// Every tool the bridge exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// `gemini_generate`: one prompt, one answer.
    Generate,
    /// `gemini_messages`: a multimodal conversation.
    Messages,
    /// `gemini_upload_file`: upload to the Files API.
    UploadFile,
    /// `gemini_list_files`: one filtered page of files.
    ListFiles,
    /// `gemini_delete_file`: delete an uploaded file.
    DeleteFile,
    /// `gemini_embeddings`: batch text embeddings.
    Embeddings,
    /// `gemini_get_docs`: usage documentation.
    GetDocs,
}

impl ToolKind {
    /// All tools in catalog order.
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Generate,
        ToolKind::Messages,
        ToolKind::UploadFile,
        ToolKind::ListFiles,
        ToolKind::DeleteFile,
        ToolKind::Embeddings,
        ToolKind::GetDocs,
    ];

    /// The MCP tool name.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Generate => "gemini_generate",
            ToolKind::Messages => "gemini_messages",
            ToolKind::UploadFile => "gemini_upload_file",
            ToolKind::ListFiles => "gemini_list_files",
            ToolKind::DeleteFile => "gemini_delete_file",
            ToolKind::Embeddings => "gemini_embeddings",
            ToolKind::GetDocs => "gemini_get_docs",
        }
    }

    /// Looks a tool up by its MCP name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Catalog entry: name, description and JSON Schema of the arguments.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// MCP tool name.
    pub name: String,
    /// What the tool does.
    pub description: String,
    /// JSON Schema of the arguments.
    pub input_schema: serde_json::Value,
}
