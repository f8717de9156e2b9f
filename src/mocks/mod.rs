//! Test doubles for the transport, auth and media seams.
//!
//! Always compiled so integration tests under `tests/` can use them.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::auth::{AuthManager, API_KEY_HEADER};
use crate::error::{GeminiResult, MediaError};
use crate::media::{FetchedMedia, MediaSource};
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Mock HTTP transport that replays queued responses and records requests.
///
/// # Example
///
/// ```
/// use integrations_gemini_mcp::mocks::MockHttpTransport;
/// use integrations_gemini_mcp::transport::{HttpMethod, HttpRequest, HttpTransport};
/// use std::collections::HashMap;
///
/// # tokio_test_block_on(async {
/// let transport = MockHttpTransport::new();
/// transport.enqueue_json_response(200, r#"{"files": []}"#);
///
/// let response = transport
///     .send(HttpRequest {
///         method: HttpMethod::Get,
///         url: "https://example.com/v1beta/files".to_string(),
///         headers: HashMap::new(),
///         body: None,
///     })
///     .await
///     .unwrap();
///
/// assert_eq!(response.status, 200);
/// transport.verify_request_count(1);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone, Default)]
pub struct MockHttpTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockHttpTransport {
    /// Creates an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a raw result for the next request.
    pub fn enqueue_response(&self, response: Result<HttpResponse, TransportError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Queues a JSON response.
    pub fn enqueue_json_response(&self, status: u16, body: &str) {
        self.enqueue_json_response_with_headers(status, body, &[]);
    }

    /// Queues a JSON response with extra headers (e.g. `retry-after`).
    pub fn enqueue_json_response_with_headers(&self, status: u16, body: &str, extra: &[(&str, &str)]) {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        for (name, value) in extra {
            headers.insert((*name).to_string(), (*value).to_string());
        }

        self.enqueue_response(Ok(HttpResponse {
            status,
            headers,
            body: Bytes::from(body.to_string()),
        }));
    }

    /// Queues a Google-style error body for the given status.
    pub fn enqueue_api_error(&self, status: u16, google_status: &str, message: &str) {
        let body = serde_json::json!({
            "error": {"code": status, "message": message, "status": google_status}
        });
        self.enqueue_json_response(status, &body.to_string());
    }

    /// Queues a transport-level failure.
    pub fn enqueue_error(&self, error: TransportError) {
        self.enqueue_response(Err(error));
    }

    /// All recorded requests, oldest first.
    pub fn get_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Parses the JSON body of request `index`.
    pub fn request_json(&self, index: usize) -> serde_json::Value {
        let requests = self.requests.lock().unwrap();
        let body = requests[index].body.clone().unwrap_or_default();
        serde_json::from_slice(&body).unwrap()
    }

    /// Asserts the number of requests made.
    pub fn verify_request_count(&self, expected: usize) {
        let actual = self.requests.lock().unwrap().len();
        assert_eq!(actual, expected, "Expected {expected} requests, got {actual}");
    }

    /// Asserts method and URL fragment of request `index`.
    pub fn verify_request(&self, index: usize, method: HttpMethod, url_contains: &str) {
        let requests = self.requests.lock().unwrap();
        assert!(index < requests.len(), "No request at index {index}");

        let request = &requests[index];
        assert_eq!(request.method, method, "Expected method {method:?}, got {:?}", request.method);
        assert!(
            request.url.contains(url_contains),
            "Expected URL to contain '{url_contains}', got '{}'",
            request.url
        );
    }

    /// Asserts a header value on request `index`.
    pub fn verify_header(&self, index: usize, header_name: &str, header_value: &str) {
        let requests = self.requests.lock().unwrap();
        assert!(index < requests.len(), "No request at index {index}");

        let actual = requests[index].headers.get(header_name);
        assert_eq!(
            actual.map(String::as_str),
            Some(header_value),
            "Expected header '{header_name}' to be '{header_value}', got {actual:?}"
        );
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("No response queued in MockHttpTransport".into())))
    }
}

/// Auth manager with a fixed key.
#[derive(Clone)]
pub struct MockAuthManager {
    api_key: String,
}

impl MockAuthManager {
    /// Creates an auth manager that sends `api_key`.
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
        }
    }
}

impl AuthManager for MockAuthManager {
    fn get_auth_header(&self) -> Option<(String, String)> {
        Some((API_KEY_HEADER.to_string(), self.api_key.clone()))
    }

    fn clone_box(&self) -> Box<dyn AuthManager> {
        Box::new(self.clone())
    }
}

/// [`MediaSource`] answering from a fixed table keyed by reference.
///
/// Unknown references fail with [`MediaError::HttpStatus`] 404.
#[derive(Clone, Default)]
pub struct StubMediaSource {
    entries: Arc<Mutex<HashMap<String, Result<FetchedMedia, MediaError>>>>,
    fetched: Arc<Mutex<Vec<String>>>,
}

impl StubMediaSource {
    /// Creates a source with no media registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `data` (base64) as `mime_type` for `reference`.
    pub fn with_media(self, reference: &str, mime_type: &str, data: &str) -> Self {
        self.entries.lock().unwrap().insert(
            reference.to_string(),
            Ok(FetchedMedia {
                data: data.to_string(),
                mime_type: mime_type.to_string(),
            }),
        );
        self
    }

    /// Fails `reference` with `error`.
    pub fn with_error(self, reference: &str, error: MediaError) -> Self {
        self.entries.lock().unwrap().insert(reference.to_string(), Err(error));
        self
    }

    /// References fetched so far.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaSource for StubMediaSource {
    async fn fetch(&self, reference: &str, mime_hint: Option<&str>) -> GeminiResult<FetchedMedia> {
        self.fetched.lock().unwrap().push(reference.to_string());
        let entry = self.entries.lock().unwrap().get(reference).cloned();
        match entry {
            Some(Ok(mut media)) => {
                if let Some(hint) = mime_hint {
                    media.mime_type = hint.to_string();
                }
                Ok(media)
            }
            Some(Err(err)) => Err(err.into()),
            None => Err(MediaError::HttpStatus {
                status: 404,
                reason: "Not Found".to_string(),
            }
            .into()),
        }
    }
}
