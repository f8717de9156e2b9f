//! Builder for creating Gemini client instances.

use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{ApiKeyAuthManager, AuthManager};
use crate::config::{GeminiConfig, MediaConfig};
use crate::error::{ConfigurationError, GeminiError};
use crate::media::{MediaFetcher, MediaSource};
use crate::observability::{Logger, StructuredLogger};
use crate::resilience::RetryConfig;
use crate::transport::{HttpTransport, ReqwestTransport};

use super::client::GeminiClientImpl;

/// Builder for [`GeminiClientImpl`].
///
/// Either start from a complete [`GeminiConfig`] with
/// [`from_config`](Self::from_config) or set individual values; missing keys
/// fall back to `GEMINI_API_KEY` / `GOOGLE_API_KEY`.
///
/// # Example
///
/// ```no_run
/// use integrations_gemini_mcp::GeminiClientBuilder;
/// use secrecy::SecretString;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiClientBuilder::new()
///     .api_key(SecretString::new("your-api-key".into()))
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct GeminiClientBuilder {
    config: Option<GeminiConfig>,
    api_key: Option<SecretString>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    retry_config: Option<RetryConfig>,
    media_config: Option<MediaConfig>,

    // Injectable seams for tests
    transport: Option<Arc<dyn HttpTransport>>,
    auth_manager: Option<Box<dyn AuthManager>>,
    media_source: Option<Arc<dyn MediaSource>>,
}

impl GeminiClientBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder around an existing configuration.
    pub fn from_config(config: GeminiConfig) -> Self {
        Self {
            config: Some(config),
            ..Self::default()
        }
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: SecretString) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    /// Sets the per-attempt timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the retry policy.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = Some(config);
        self
    }

    /// Sets the media fetch settings.
    pub fn media_config(mut self, config: MediaConfig) -> Self {
        self.media_config = Some(config);
        self
    }

    /// Sets a custom HTTP transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets a custom auth manager.
    pub fn auth_manager(mut self, auth_manager: Box<dyn AuthManager>) -> Self {
        self.auth_manager = Some(auth_manager);
        self
    }

    /// Sets a custom media source in place of the network fetcher.
    pub fn media_source(mut self, media: Arc<dyn MediaSource>) -> Self {
        self.media_source = Some(media);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Fails when no API key is available, a value is invalid, or the HTTP
    /// client cannot be created.
    pub fn build(self) -> Result<GeminiClientImpl, GeminiError> {
        let config = self.resolve_config()?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::from_config(&config)?),
        };
        let auth_manager = self
            .auth_manager
            .unwrap_or_else(|| Box::new(ApiKeyAuthManager::from_config(&config)));
        let media: Arc<dyn MediaSource> = match self.media_source {
            Some(media) => media,
            None => Arc::new(MediaFetcher::new(config.media.clone())?),
        };

        StructuredLogger::new("gemini.client").with_level(config.log_level).info(
            "Gemini client initialized",
            serde_json::json!({
                "base_url": config.base_url.as_str(),
                "api_version": config.api_version,
                "max_retries": config.retry_config.max_retries,
                "timeout_secs": config.timeout.as_secs(),
            }),
        );

        Ok(GeminiClientImpl::from_parts(config, transport, auth_manager, media))
    }

    fn resolve_config(&self) -> Result<GeminiConfig, GeminiError> {
        let mut config = match &self.config {
            Some(config) => config.clone(),
            None => {
                let api_key = self
                    .api_key
                    .clone()
                    .or_else(|| {
                        std::env::var("GEMINI_API_KEY")
                            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                            .ok()
                            .filter(|key| !key.trim().is_empty())
                            .map(SecretString::new)
                    })
                    .ok_or(ConfigurationError::MissingApiKey)?;
                GeminiConfig::builder().api_key(api_key).build()?
            }
        };

        if let Some(key) = &self.api_key {
            config.api_key = key.clone();
        }
        if let Some(url) = &self.base_url {
            config = rebuild_with_base_url(config, url)?;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(retry) = &self.retry_config {
            config.retry_config = retry.clone();
        }
        if let Some(media) = &self.media_config {
            config.media = media.clone();
        }
        Ok(config)
    }
}

fn rebuild_with_base_url(config: GeminiConfig, url: &str) -> Result<GeminiConfig, GeminiError> {
    GeminiConfig::builder()
        .api_key(config.api_key)
        .base_url(url)?
        .api_version(&config.api_version)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .retry_config(config.retry_config)
        .media(config.media)
        .default_model(&config.default_model)
        .default_embedding_model(&config.default_embedding_model)
        .log_level(config.log_level)
        .build()
}
