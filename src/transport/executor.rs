//! Request execution with retry and per-attempt timeout.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{GeminiError, GeminiResult, NetworkError};
use crate::resilience::RetryExecutor;
use super::http::{HttpRequest, HttpResponse, HttpTransport};
use super::response::ResponseParser;

/// Sends prepared requests through the shared retry policy.
///
/// Each attempt is bounded by `attempt_timeout`; an elapsed attempt is a
/// retryable [`NetworkError::Timeout`]. Response bodies are parsed inside the
/// attempt so a truncated or malformed body is retried like a network fault.
#[derive(Clone)]
pub struct ApiExecutor {
    transport: Arc<dyn HttpTransport>,
    retry: RetryExecutor,
    attempt_timeout: Duration,
}

impl ApiExecutor {
    /// Creates an executor over the given transport.
    pub fn new(transport: Arc<dyn HttpTransport>, retry: RetryExecutor, attempt_timeout: Duration) -> Self {
        Self {
            transport,
            retry,
            attempt_timeout,
        }
    }

    /// Executes the request and deserializes a 2xx JSON body.
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: HttpRequest,
    ) -> GeminiResult<T> {
        self.retry
            .execute(operation, || {
                let request = request.clone();
                async move {
                    let response = self.attempt(request).await?;
                    ResponseParser::parse_response(response)
                }
            })
            .await
    }

    /// Executes the request and accepts any 2xx response.
    pub async fn execute_empty(&self, operation: &str, request: HttpRequest) -> GeminiResult<()> {
        self.retry
            .execute(operation, || {
                let request = request.clone();
                async move {
                    let response = self.attempt(request).await?;
                    ResponseParser::parse_empty(response)
                }
            })
            .await
    }

    async fn attempt(&self, request: HttpRequest) -> GeminiResult<HttpResponse> {
        match tokio::time::timeout(self.attempt_timeout, self.transport.send(request)).await {
            Ok(result) => result.map_err(GeminiError::from),
            Err(_) => Err(GeminiError::Network(NetworkError::Timeout {
                duration: self.attempt_timeout,
            })),
        }
    }
}
