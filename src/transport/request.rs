//! HTTP request builder for the Gemini API.
//!
//! Joins endpoint paths onto the configured base URL and API version and
//! attaches the authentication header.

use bytes::Bytes;
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

use crate::auth::AuthManager;
use crate::config::with_trailing_slash;
use crate::error::GeminiError;
use super::http::{HttpRequest, HttpMethod};

/// Builder for constructing HTTP requests to the Gemini API.
pub struct RequestBuilder {
    base_url: Url,
    api_version: String,
    auth_manager: Box<dyn AuthManager>,
}

impl Clone for RequestBuilder {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            api_version: self.api_version.clone(),
            auth_manager: self.auth_manager.clone_box(),
        }
    }
}

impl RequestBuilder {
    /// Creates a new request builder.
    ///
    /// A base URL without a trailing slash is treated as a directory.
    pub fn new(
        base_url: Url,
        api_version: String,
        auth_manager: Box<dyn AuthManager>,
    ) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            api_version,
            auth_manager,
        }
    }

    /// Builds `<base>/<version>/<path>` with optional query parameters.
    pub fn build_url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, GeminiError> {
        let full_path = format!("{}/{}", self.api_version, path.trim_start_matches('/'));
        self.finish_url(&full_path, query)
    }

    /// Builds the media upload URL, `<base>/upload/<version>/<path>`.
    pub fn build_upload_url(&self, path: &str) -> Result<Url, GeminiError> {
        let full_path = format!("upload/{}/{}", self.api_version, path.trim_start_matches('/'));
        self.finish_url(&full_path, &[])
    }

    fn finish_url(&self, full_path: &str, query: &[(&str, String)]) -> Result<Url, GeminiError> {
        let mut url = self.base_url.join(full_path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn base_headers(&self) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        if let Some((key, value)) = self.auth_manager.get_auth_header() {
            headers.insert(key, value);
        }
        headers
    }

    /// Builds a request with an optional JSON body.
    pub fn build_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        query: &[(&str, String)],
        body: Option<&T>,
    ) -> Result<HttpRequest, GeminiError> {
        let url = self.build_url(path, query)?;
        let mut headers = self.base_headers();

        let body_bytes = match body {
            Some(body) => {
                headers.insert("Content-Type".to_string(), "application/json".to_string());
                Some(Bytes::from(serde_json::to_vec(body)?))
            }
            None => None,
        };

        Ok(HttpRequest {
            method,
            url: url.to_string(),
            headers,
            body: body_bytes,
        })
    }

    /// Builds a raw-body POST to an already resolved URL.
    pub fn build_raw_request(
        &self,
        url: Url,
        content_type: &str,
        extra_headers: HashMap<String, String>,
        body: Bytes,
    ) -> HttpRequest {
        let mut headers = self.base_headers();
        headers.insert("Content-Type".to_string(), content_type.to_string());
        headers.extend(extra_headers);

        HttpRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            headers,
            body: Some(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ApiKeyAuthManager;
    use secrecy::SecretString;

    fn create_test_builder(base_url: &str) -> RequestBuilder {
        RequestBuilder::new(
            Url::parse(base_url).unwrap(),
            "v1beta".to_string(),
            Box::new(ApiKeyAuthManager::new(SecretString::new("test-api-key".into()))),
        )
    }

    #[test]
    fn test_build_url_with_version() {
        let builder = create_test_builder("https://generativelanguage.googleapis.com/");
        let url = builder.build_url("/models/gemini-pro:generateContent", &[]).unwrap();

        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_build_url_with_query_and_prefix() {
        let builder = create_test_builder("http://localhost:9000/proxy/");
        let url = builder
            .build_url("files", &[("pageSize", "10".to_string()), ("pageToken", "a b".to_string())])
            .unwrap();

        assert_eq!(url.path(), "/proxy/v1beta/files");
        assert_eq!(url.query(), Some("pageSize=10&pageToken=a+b"));
    }

    #[test]
    fn test_base_path_without_trailing_slash_is_kept() {
        let builder = create_test_builder("https://proxy.internal/gemini");

        let url = builder.build_url("models/gemini-2.5-flash:generateContent", &[]).unwrap();
        assert_eq!(url.path(), "/gemini/v1beta/models/gemini-2.5-flash:generateContent");

        let upload = builder.build_upload_url("files").unwrap();
        assert_eq!(upload.path(), "/gemini/upload/v1beta/files");
    }

    #[test]
    fn test_build_upload_url() {
        let builder = create_test_builder("https://generativelanguage.googleapis.com/");
        let url = builder.build_upload_url("files").unwrap();

        assert_eq!(url.as_str(), "https://generativelanguage.googleapis.com/upload/v1beta/files");
    }

    #[test]
    fn test_build_request_with_body_sets_headers() {
        let builder = create_test_builder("https://generativelanguage.googleapis.com/");
        let body = serde_json::json!({"contents": []});

        let request = builder
            .build_request(HttpMethod::Post, "models/m:generateContent", &[], Some(&body))
            .unwrap();

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.headers.get("Content-Type").unwrap(), "application/json");
        assert_eq!(request.headers.get("x-goog-api-key").unwrap(), "test-api-key");
        assert!(request.body.is_some());
    }

    #[test]
    fn test_build_request_without_body() {
        let builder = create_test_builder("https://generativelanguage.googleapis.com/");
        let request = builder
            .build_request::<()>(HttpMethod::Delete, "files/abc", &[], None)
            .unwrap();

        assert!(!request.headers.contains_key("Content-Type"));
        assert!(request.body.is_none());
    }
}
