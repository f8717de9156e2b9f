//! Tool-facing view of an uploaded file.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use super::args::parse_time;
use crate::types::{File, FileState};

/// File metadata as returned by the upload and list tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Bare id without the `files/` prefix.
    pub file_id: String,
    /// Resource name, `files/{id}`.
    pub name: String,
    /// URI usable in `fileData` parts.
    pub uri: String,
    /// MIME type of the content.
    pub mime_type: String,
    /// Size in bytes, 0 when unknown.
    pub size_bytes: u64,
    /// Lowercase hex SHA-256, empty when the API did not report one.
    pub sha256: String,
    /// Creation time, RFC 3339.
    pub create_time: String,
    /// Earliest of the provider expiry and the requested retention.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    /// Human-readable name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Processing state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<FileState>,
    /// True when an existing file was reused instead of uploading.
    pub deduplicated: bool,
}

impl FileRecord {
    /// Maps API metadata; `expires_at` is the API's expiration time.
    pub fn from_file(file: &File) -> Self {
        Self {
            file_id: file.id().to_string(),
            name: file.name.clone(),
            uri: file.uri.clone().unwrap_or_default(),
            mime_type: file.mime_type.clone().unwrap_or_default(),
            size_bytes: file.size().unwrap_or(0),
            sha256: file.sha256_hash.as_deref().map(normalize_sha256).unwrap_or_default(),
            create_time: file.create_time.clone().unwrap_or_default(),
            expires_at: file.expiration_time.clone(),
            display_name: file.display_name.clone(),
            state: file.state.clone(),
            deduplicated: false,
        }
    }

    /// Caps the reported expiry at `requested`, keeping whichever comes first.
    pub fn with_requested_expiry(mut self, requested: Option<DateTime<Utc>>) -> Self {
        let Some(requested) = requested else {
            return self;
        };
        let earliest = match parse_time(self.expires_at.as_deref()) {
            Some(provider) if provider < requested => provider,
            _ => requested,
        };
        self.expires_at = Some(earliest.to_rfc3339_opts(SecondsFormat::Secs, true));
        self
    }

    /// Marks the record as a reused upload.
    pub fn deduplicated(mut self) -> Self {
        self.deduplicated = true;
        self
    }
}

/// Normalizes a reported SHA-256 to lowercase hex.
///
/// The Files API has returned the digest as hex, as base64 of the raw
/// 32 bytes, and as base64 of the hex string; all three map to the same
/// value. Anything else comes back unchanged.
pub fn normalize_sha256(reported: &str) -> String {
    let reported = reported.trim();
    if is_hex_digest(reported) {
        return reported.to_ascii_lowercase();
    }
    match STANDARD.decode(reported) {
        Ok(bytes) if bytes.len() == 32 => hex::encode(bytes),
        Ok(bytes) if bytes.len() == 64 => match std::str::from_utf8(&bytes) {
            Ok(text) if is_hex_digest(text) => text.to_ascii_lowercase(),
            _ => reported.to_string(),
        },
        _ => reported.to_string(),
    }
}

fn is_hex_digest(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}
