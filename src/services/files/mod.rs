//! Files service for Gemini API.

mod service;
mod validation;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::GeminiError;
use crate::types::{File, ListFilesResponse};

pub use service::FilesServiceImpl;
pub use validation::{validate_file_id, validate_page_size, validate_upload, MAX_FILE_SIZE, MAX_PAGE_SIZE};

/// Service for file upload and management.
///
/// File ids are accepted as `abc` or `files/abc`.
#[async_trait]
pub trait FilesService: Send + Sync {
    /// Uploads bytes through the multipart upload endpoint.
    async fn upload(
        &self,
        data: Bytes,
        mime_type: &str,
        display_name: Option<&str>,
    ) -> Result<File, GeminiError>;

    /// Lists one page of files.
    async fn list(
        &self,
        page_size: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<ListFilesResponse, GeminiError>;

    /// Gets file metadata.
    async fn get(&self, file_id: &str) -> Result<File, GeminiError>;

    /// Deletes a file.
    async fn delete(&self, file_id: &str) -> Result<(), GeminiError>;
}
