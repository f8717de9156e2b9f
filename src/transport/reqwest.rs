//! Reqwest-based HTTP transport implementation.

use super::http::{HttpTransport, HttpRequest, HttpResponse, HttpMethod};
use super::error::TransportError;
use crate::config::GeminiConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// Reqwest-based HTTP transport.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new reqwest transport with the given timeouts.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(concat!("integrations-gemini-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Connection(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Create a transport using the timeouts from the configuration.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, TransportError> {
        Self::new(config.timeout, config.connect_timeout)
    }

    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }

    fn convert_headers(headers: HashMap<String, String>) -> reqwest::header::HeaderMap {
        let mut header_map = reqwest::header::HeaderMap::new();
        for (key, value) in headers {
            if let (Ok(name), Ok(val)) = (
                reqwest::header::HeaderName::from_bytes(key.as_bytes()),
                reqwest::header::HeaderValue::from_str(&value),
            ) {
                header_map.insert(name, val);
            }
        }
        header_map
    }

    fn extract_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut req_builder = self.client
            .request(Self::convert_method(request.method), &request.url)
            .headers(Self::convert_headers(request.headers));

        if let Some(body) = request.body {
            req_builder = req_builder.body(body);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Connection(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let headers = Self::extract_headers(response.headers());
        let body = response.bytes().await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Request(format!("Failed to read response body: {e}"))
                }
            })?;

        Ok(HttpResponse { status, headers, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_reqwest_transport_creation() {
        let transport = ReqwestTransport::new(
            Duration::from_secs(30),
            Duration::from_secs(10),
        );
        assert!(transport.is_ok());
    }

    #[tokio::test]
    async fn test_send_round_trips_headers_and_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/m:generateContent"))
            .and(header("x-goog-api-key", "k"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5), Duration::from_secs(5)).unwrap();
        let mut headers = HashMap::new();
        headers.insert("x-goog-api-key".to_string(), "k".to_string());

        let response = transport
            .send(HttpRequest {
                method: HttpMethod::Post,
                url: format!("{}/v1beta/models/m:generateContent", server.uri()),
                headers,
                body: Some(bytes::Bytes::from_static(b"{}")),
            })
            .await
            .unwrap();

        assert_eq!(response.status, 429);
        assert_eq!(response.headers.get("retry-after").map(String::as_str), Some("3"));
    }
}
