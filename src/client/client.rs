//! Main client implementation for the Gemini bridge.

use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::GeminiConfig;
use crate::error::GeminiError;
use crate::media::MediaSource;
use crate::observability::StructuredLogger;
use crate::resilience::RetryExecutor;
use crate::services::{
    ContentService, ContentServiceImpl, EmbeddingsService, EmbeddingsServiceImpl, FilesService,
    FilesServiceImpl,
};
use crate::transport::{ApiExecutor, HttpTransport, RequestBuilder};

use super::builder::GeminiClientBuilder;
use super::traits::GeminiClient;

/// Implementation of [`GeminiClient`].
///
/// Services share one transport and auth manager and are created on first
/// access.
///
/// # Example
///
/// ```no_run
/// use integrations_gemini_mcp::{GeminiClient, GeminiClientImpl};
/// use secrecy::SecretString;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiClientImpl::builder()
///     .api_key(SecretString::new("your-api-key".into()))
///     .build()?;
///
/// let _files = client.files();
/// # Ok(())
/// # }
/// ```
pub struct GeminiClientImpl {
    config: Arc<GeminiConfig>,
    transport: Arc<dyn HttpTransport>,
    auth_manager: Box<dyn AuthManager>,
    media: Arc<dyn MediaSource>,

    content_service: OnceCell<ContentServiceImpl>,
    files_service: OnceCell<FilesServiceImpl>,
    embeddings_service: OnceCell<EmbeddingsServiceImpl>,
}

impl GeminiClientImpl {
    /// Creates a new client builder.
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    /// Creates a client from configuration.
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        GeminiClientBuilder::from_config(config).build()
    }

    /// Creates a client from environment variables (see [`GeminiConfig::from_env`]).
    pub fn from_env() -> Result<Self, GeminiError> {
        Self::new(GeminiConfig::from_env()?)
    }

    pub(super) fn from_parts(
        config: GeminiConfig,
        transport: Arc<dyn HttpTransport>,
        auth_manager: Box<dyn AuthManager>,
        media: Arc<dyn MediaSource>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            auth_manager,
            media,
            content_service: OnceCell::new(),
            files_service: OnceCell::new(),
            embeddings_service: OnceCell::new(),
        }
    }

    fn request_builder(&self) -> RequestBuilder {
        RequestBuilder::new(
            self.config.base_url.clone(),
            self.config.api_version.clone(),
            self.auth_manager.clone_box(),
        )
    }

    fn executor(&self) -> ApiExecutor {
        ApiExecutor::new(
            Arc::clone(&self.transport),
            RetryExecutor::new(self.config.retry_config.clone()),
            self.config.timeout,
        )
    }

    fn logger(&self, component: &str) -> StructuredLogger {
        StructuredLogger::new(component).with_level(self.config.log_level)
    }
}

impl GeminiClient for GeminiClientImpl {
    fn content(&self) -> &dyn ContentService {
        self.content_service.get_or_init(|| {
            ContentServiceImpl::new(self.request_builder(), self.executor(), self.logger("gemini.content"))
        })
    }

    fn files(&self) -> &dyn FilesService {
        self.files_service.get_or_init(|| {
            FilesServiceImpl::new(self.request_builder(), self.executor(), self.logger("gemini.files"))
        })
    }

    fn embeddings(&self) -> &dyn EmbeddingsService {
        self.embeddings_service.get_or_init(|| {
            EmbeddingsServiceImpl::new(
                self.request_builder(),
                self.executor(),
                self.logger("gemini.embeddings"),
            )
        })
    }

    fn media(&self) -> Arc<dyn MediaSource> {
        Arc::clone(&self.media)
    }

    fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

impl std::fmt::Debug for GeminiClientImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClientImpl")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Creates a shareable client from configuration.
pub fn create_client(config: GeminiConfig) -> Result<Arc<dyn GeminiClient>, GeminiError> {
    Ok(Arc::new(GeminiClientImpl::new(config)?))
}

/// Creates a shareable client from environment variables.
pub fn create_client_from_env() -> Result<Arc<dyn GeminiClient>, GeminiError> {
    create_client(GeminiConfig::from_env()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{MockHttpTransport, StubMediaSource};
    use crate::transport::HttpMethod;
    use crate::types::GenerateContentRequest;
    use crate::Content;
    use crate::Part;
    use secrecy::SecretString;

    fn client_with(transport: &MockHttpTransport) -> GeminiClientImpl {
        GeminiClientBuilder::new()
            .api_key(SecretString::new("test-key".into()))
            .transport(Arc::new(transport.clone()))
            .media_source(Arc::new(StubMediaSource::new()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_from_config() {
        let config = GeminiConfig::builder()
            .api_key(SecretString::new("test-key".into()))
            .api_version("v1")
            .build()
            .unwrap();

        let client = GeminiClientImpl::new(config).unwrap();
        assert_eq!(client.config().api_version, "v1");
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let transport = MockHttpTransport::new();
        let client = client_with(&transport);
        assert!(!format!("{client:?}").contains("test-key"));
    }

    #[tokio::test]
    async fn test_services_share_transport_and_key() {
        let transport = MockHttpTransport::new();
        transport.enqueue_json_response(
            200,
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"hi"}]},"finishReason":"STOP"}]}"#,
        );
        transport.enqueue_json_response(200, r#"{"files":[]}"#);
        let client = client_with(&transport);

        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text("hello")])],
            ..Default::default()
        };
        client.content().generate("gemini-2.5-flash", request).await.unwrap();
        client.files().list(None, None).await.unwrap();

        transport.verify_request(0, HttpMethod::Post, "models/gemini-2.5-flash:generateContent");
        transport.verify_request(1, HttpMethod::Get, "/v1beta/files");
        transport.verify_header(0, "x-goog-api-key", "test-key");
        transport.verify_header(1, "x-goog-api-key", "test-key");
    }
}
