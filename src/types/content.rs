//! Content-related types for the Gemini API.
//!
//! This module contains types for representing content, messages, and their parts.

use serde::{Deserialize, Serialize};

/// A part of a content message.
///
/// Variants are matched structurally by their single key. Shapes this crate
/// does not model are kept verbatim in [`Part::Other`] so a new part kind in a
/// response never fails deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Part {
    /// Text content.
    Text {
        /// The text content.
        text: String,
        /// Set on thought summaries when thinking output is requested.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thought: Option<bool>,
    },
    /// Inline binary data.
    InlineData {
        /// The inline data blob.
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    /// Reference to file data.
    FileData {
        /// The file data reference.
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
    /// A function call.
    FunctionCall {
        /// The function call details.
        #[serde(rename = "functionCall")]
        function_call: FunctionCall,
    },
    /// A function response.
    FunctionResponse {
        /// The function response details.
        #[serde(rename = "functionResponse")]
        function_response: FunctionResponse,
    },
    /// Executable code produced by the code execution tool.
    ExecutableCode {
        /// The executable code details.
        #[serde(rename = "executableCode")]
        executable_code: ExecutableCode,
    },
    /// Result of running executable code.
    CodeExecutionResult {
        /// The code execution result details.
        #[serde(rename = "codeExecutionResult")]
        code_execution_result: CodeExecutionResult,
    },
    /// Any other part shape, preserved as-is.
    Other(serde_json::Map<String, serde_json::Value>),
}

impl Part {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text {
            text: text.into(),
            thought: None,
        }
    }

    /// Creates an inline data part from base64 data.
    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Part::InlineData {
            inline_data: Blob {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }

    /// Creates a file reference part.
    pub fn file_data(file_uri: impl Into<String>, mime_type: Option<String>) -> Self {
        Part::FileData {
            file_data: FileData {
                mime_type,
                file_uri: file_uri.into(),
            },
        }
    }

    /// Returns the text of a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Binary data blob with MIME type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    /// The MIME type of the data.
    pub mime_type: String,
    /// Base64-encoded binary data.
    pub data: String,
}

/// Reference to file data stored in Gemini's file service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    /// The MIME type of the file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// The URI of the file.
    pub file_uri: String,
}

/// A function call request from the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    /// The name of the function to call.
    pub name: String,
    /// The arguments to pass to the function.
    #[serde(default)]
    pub args: serde_json::Value,
}

/// A function response to send back to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionResponse {
    /// The name of the function that was called.
    pub name: String,
    /// The response data from the function.
    pub response: serde_json::Value,
}

/// Executable code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutableCode {
    /// Language of the code, e.g. `PYTHON`.
    pub language: String,
    /// The code to run.
    pub code: String,
}

/// The result of code execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeExecutionResult {
    /// Execution outcome, e.g. `OUTCOME_OK`.
    pub outcome: String,
    /// Stdout on success, error text otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// A content message with a role and parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// The role of the content author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// The parts of the content.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// A user turn.
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some(Role::User),
            parts,
        }
    }

    /// A role-less content holding one text part, used for system instructions.
    pub fn system_text(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }
}

/// The role of a content author on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User role.
    User,
    /// Model role.
    Model,
}
