//! Validation functions for file operations.

use crate::error::{GeminiError, GeminiResult, ValidationDetail};
use crate::media::mime::is_valid_mime_type;
use crate::transport::endpoints;

/// Maximum file size accepted by the Files API (2 GiB).
pub const MAX_FILE_SIZE: usize = 2 * 1024 * 1024 * 1024;

/// Maximum display name length.
const MAX_DISPLAY_NAME_LENGTH: usize = 512;

/// Maximum page size the Files API honours.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Validates an upload before the multipart body is built.
pub fn validate_upload(data: &[u8], mime_type: &str, display_name: Option<&str>) -> GeminiResult<()> {
    let mut details = Vec::new();

    if data.is_empty() {
        details.push(ValidationDetail::new("data", "File data must not be empty"));
    }
    if data.len() > MAX_FILE_SIZE {
        details.push(ValidationDetail::new(
            "data",
            format!("File size {} bytes exceeds maximum of {MAX_FILE_SIZE} bytes", data.len()),
        ));
    }
    if !is_valid_mime_type(mime_type) {
        details.push(ValidationDetail::new(
            "mimeType",
            format!("'{mime_type}' is not a valid MIME type"),
        ));
    }
    if let Some(name) = display_name {
        if name.trim().is_empty() {
            details.push(ValidationDetail::new("displayName", "Display name must not be blank"));
        }
        if name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
            details.push(ValidationDetail::new(
                "displayName",
                format!("Display name exceeds maximum of {MAX_DISPLAY_NAME_LENGTH} characters"),
            ));
        }
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(GeminiError::validation("Invalid upload request", details))
    }
}

/// Validates a file id given as `abc` or `files/abc`.
pub fn validate_file_id(file_id: &str) -> GeminiResult<()> {
    let id = endpoints::file_id(file_id.trim());
    let mut details = Vec::new();

    if id.is_empty() {
        details.push(ValidationDetail::new("fileId", "File id must not be empty"));
    } else if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        details.push(ValidationDetail::new(
            "fileId",
            format!("'{file_id}' is not a valid file id"),
        ));
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(GeminiError::validation("Invalid file id", details))
    }
}

/// Validates a list page size.
pub fn validate_page_size(page_size: u32) -> GeminiResult<()> {
    if (1..=MAX_PAGE_SIZE).contains(&page_size) {
        Ok(())
    } else {
        Err(GeminiError::validation(
            "Invalid list request",
            vec![ValidationDetail::new(
                "pageSize",
                format!("Page size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"),
            )],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_validation() {
        assert!(validate_upload(b"abc", "text/plain", Some("notes.txt")).is_ok());
        assert!(validate_upload(b"abc", "text/plain", None).is_ok());

        let err = validate_upload(b"", "not a mime", Some(" ")).unwrap_err().to_string();
        assert!(err.contains("data"));
        assert!(err.contains("mimeType"));
        assert!(err.contains("displayName"));
    }

    #[test]
    fn test_file_id_forms() {
        assert!(validate_file_id("abc-123").is_ok());
        assert!(validate_file_id("files/abc-123").is_ok());
        assert!(validate_file_id("files/").is_err());
        assert!(validate_file_id("../etc").is_err());
    }

    #[test]
    fn test_page_size_bounds() {
        assert!(validate_page_size(1).is_ok());
        assert!(validate_page_size(100).is_ok());
        assert!(validate_page_size(0).is_err());
        assert!(validate_page_size(101).is_err());
    }
}
