//! Files service implementation for Gemini API.

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use serde_json::json;
use std::collections::HashMap;

use super::validation::{validate_file_id, validate_page_size, validate_upload};
use super::FilesService;
use crate::error::GeminiResult;
use crate::observability::{Logger, StructuredLogger};
use crate::transport::{endpoints, ApiExecutor, HttpMethod, RequestBuilder};
use crate::types::{File, ListFilesResponse, UploadFileResponse};

/// [`FilesService`] over the shared request builder and executor.
pub struct FilesServiceImpl {
    requests: RequestBuilder,
    executor: ApiExecutor,
    logger: StructuredLogger,
}

impl FilesServiceImpl {
    /// Creates the service over a shared request builder and executor.
    pub fn new(requests: RequestBuilder, executor: ApiExecutor, logger: StructuredLogger) -> Self {
        Self {
            requests,
            executor,
            logger,
        }
    }
}

/// Builds a `multipart/related` body: JSON metadata, then the raw bytes.
fn multipart_body(boundary: &str, metadata: &serde_json::Value, mime_type: &str, data: &[u8]) -> Bytes {
    let metadata = metadata.to_string();
    let mut body = BytesMut::with_capacity(data.len() + metadata.len() + 256);

    body.put_slice(format!("--{boundary}\r\n").as_bytes());
    body.put_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.put_slice(metadata.as_bytes());
    body.put_slice(b"\r\n");

    body.put_slice(format!("--{boundary}\r\n").as_bytes());
    body.put_slice(format!("Content-Type: {mime_type}\r\n\r\n").as_bytes());
    body.put_slice(data);
    body.put_slice(b"\r\n");

    body.put_slice(format!("--{boundary}--\r\n").as_bytes());
    body.freeze()
}

#[async_trait]
impl FilesService for FilesServiceImpl {
    async fn upload(&self, data: Bytes, mime_type: &str, display_name: Option<&str>) -> GeminiResult<File> {
        validate_upload(&data, mime_type, display_name)?;

        let boundary = format!("----gemini_boundary_{}", uuid::Uuid::new_v4().simple());
        let mut file_meta = serde_json::Map::new();
        file_meta.insert("mimeType".to_string(), json!(mime_type));
        if let Some(name) = display_name {
            file_meta.insert("displayName".to_string(), json!(name));
        }
        let metadata = json!({ "file": file_meta });

        let url = self.requests.build_upload_url(endpoints::FILES)?;
        let mut extra = HashMap::new();
        extra.insert("X-Goog-Upload-Protocol".to_string(), "multipart".to_string());
        let request = self.requests.build_raw_request(
            url,
            &format!("multipart/related; boundary={boundary}"),
            extra,
            multipart_body(&boundary, &metadata, mime_type, &data),
        );

        self.logger.debug(
            "Uploading file",
            json!({ "mime_type": mime_type, "size_bytes": data.len(), "display_name": display_name }),
        );

        let response: UploadFileResponse = self.executor.execute_json("files.upload", request).await?;

        self.logger.info(
            "File uploaded",
            json!({ "name": response.file.name, "size_bytes": response.file.size_bytes }),
        );
        Ok(response.file)
    }

    async fn list(&self, page_size: Option<u32>, page_token: Option<&str>) -> GeminiResult<ListFilesResponse> {
        let mut query = Vec::new();
        if let Some(size) = page_size {
            validate_page_size(size)?;
            query.push(("pageSize", size.to_string()));
        }
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            query.push(("pageToken", token.to_string()));
        }

        let request = self
            .requests
            .build_request::<()>(HttpMethod::Get, endpoints::FILES, &query, None)?;
        let page: ListFilesResponse = self.executor.execute_json("files.list", request).await?;

        self.logger.debug(
            "Listed files",
            json!({ "count": page.files.len(), "has_more": page.next_page_token.is_some() }),
        );
        Ok(page)
    }

    async fn get(&self, file_id: &str) -> GeminiResult<File> {
        validate_file_id(file_id)?;
        let request = self.requests.build_request::<()>(
            HttpMethod::Get,
            &endpoints::file(file_id.trim()),
            &[],
            None,
        )?;
        self.executor.execute_json("files.get", request).await
    }

    async fn delete(&self, file_id: &str) -> GeminiResult<()> {
        validate_file_id(file_id)?;
        let request = self.requests.build_request::<()>(
            HttpMethod::Delete,
            &endpoints::file(file_id.trim()),
            &[],
            None,
        )?;
        self.executor.execute_empty("files.delete", request).await?;

        self.logger.info("File deleted", json!({ "file_id": endpoints::file_id(file_id.trim()) }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_layout() {
        let body = multipart_body("b0", &json!({"file": {"mimeType": "text/plain"}}), "text/plain", b"hi");
        let text = String::from_utf8(body.to_vec()).unwrap();

        assert_eq!(
            text,
            "--b0\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n\
             {\"file\":{\"mimeType\":\"text/plain\"}}\r\n\
             --b0\r\nContent-Type: text/plain\r\n\r\nhi\r\n--b0--\r\n"
        );
    }
}
