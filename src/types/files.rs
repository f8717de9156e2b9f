//! File-related types for the Gemini API.

use serde::{Deserialize, Serialize};

/// A file stored in Gemini's file service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct File {
    /// Resource name, `files/{id}`.
    pub name: String,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// MIME type of the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// int64 encoded as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<String>,
    /// Creation time, RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    /// Last update time, RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    /// When the provider deletes the file, RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<String>,
    /// Base64 of the SHA-256 digest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256_hash: Option<String>,
    /// URI usable in `fileData` parts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Processing state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<FileState>,
}

impl File {
    /// The bare id without the `files/` prefix.
    pub fn id(&self) -> &str {
        self.name.strip_prefix("files/").unwrap_or(&self.name)
    }

    /// Parsed size, when the API reported one.
    pub fn size(&self) -> Option<u64> {
        self.size_bytes.as_deref().and_then(|s| s.parse().ok())
    }
}

/// The processing state of a file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    /// Default value, unused.
    StateUnspecified,
    /// File is being processed.
    Processing,
    /// File is active and ready to use.
    Active,
    /// File processing failed.
    Failed,
    /// A value introduced after this crate was written.
    #[serde(other)]
    Unknown,
}

/// Envelope returned by the upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadFileResponse {
    /// The uploaded file.
    pub file: File,
}

/// One page of files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesResponse {
    /// Files on this page.
    #[serde(default)]
    pub files: Vec<File>,
    /// Token for the next page, absent on the last one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_helpers() {
        let file: File = serde_json::from_value(json!({
            "name": "files/abc-123",
            "sizeBytes": "2048",
            "state": "ACTIVE"
        }))
        .unwrap();

        assert_eq!(file.id(), "abc-123");
        assert_eq!(file.size(), Some(2048));
        assert_eq!(file.state, Some(FileState::Active));
    }

    #[test]
    fn test_empty_list_response() {
        let page: ListFilesResponse = serde_json::from_str("{}").unwrap();
        assert!(page.files.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
