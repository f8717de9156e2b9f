//! Configuration types for the Gemini bridge.

use secrecy::SecretString;
use std::time::Duration;
use url::Url;
use crate::error::{GeminiError, ConfigurationError};
use crate::resilience::RetryConfig;

/// Default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default API version.
pub const DEFAULT_API_VERSION: &str = "v1beta";

/// Default per-attempt request timeout (60 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default connect timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default generation model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

/// Default media fetch timeout (30 seconds).
pub const DEFAULT_MEDIA_TIMEOUT_SECS: u64 = 30;

/// Default cap on fetched or inlined media (20 MiB).
pub const DEFAULT_MEDIA_MAX_BYTES: u64 = 20 * 1024 * 1024;

/// Log level for the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Error level - only errors.
    Error,
    /// Warning level - errors and warnings.
    Warn,
    /// Info level - general information.
    #[default]
    Info,
    /// Debug level - detailed information.
    Debug,
    /// Trace level - very detailed information.
    Trace,
}

/// Settings for retrieving externally referenced media.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaConfig {
    /// Upper bound on a single fetch, connect to last byte.
    pub timeout: Duration,
    /// Hard cap on downloaded bytes.
    pub max_bytes: u64,
    /// Ceiling on decoded inline data inside a message.
    pub inline_max_bytes: u64,
    /// Maximum redirect hops followed by the fetcher.
    pub max_redirects: usize,
    /// Skip the loopback/private/link-local destination guard.
    ///
    /// Only meant for local development and tests against a loopback server.
    pub allow_private_networks: bool,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_MEDIA_TIMEOUT_SECS),
            max_bytes: DEFAULT_MEDIA_MAX_BYTES,
            inline_max_bytes: DEFAULT_MEDIA_MAX_BYTES,
            max_redirects: 10,
            allow_private_networks: false,
        }
    }
}

/// Configuration for the Gemini client and tool bridge.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key (required).
    pub api_key: SecretString,
    /// Base URL for the API.
    pub base_url: Url,
    /// API version.
    pub api_version: String,
    /// Timeout applied to every individual attempt.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// Retry policy shared by every upstream operation.
    pub retry_config: RetryConfig,
    /// Media fetch settings.
    pub media: MediaConfig,
    /// Model used when a tool call does not name one.
    pub default_model: String,
    /// Embedding model used when a tool call does not name one.
    pub default_embedding_model: String,
    /// Log level.
    pub log_level: LogLevel,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"***REDACTED***")
            .field("base_url", &self.base_url.as_str())
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .field("retry_config", &self.retry_config)
            .field("media", &self.media)
            .field("default_model", &self.default_model)
            .field("default_embedding_model", &self.default_embedding_model)
            .finish_non_exhaustive()
    }
}

impl GeminiConfig {
    /// Create a new configuration builder.
    pub fn builder() -> GeminiConfigBuilder {
        GeminiConfigBuilder::default()
    }

    /// Create configuration from environment variables.
    ///
    /// `GEMINI_API_KEY` (or `GOOGLE_API_KEY`) is mandatory. Optional:
    /// `GEMINI_BASE_URL`, `GEMINI_API_VERSION`, `GEMINI_TIMEOUT_SECS`,
    /// `GEMINI_MAX_RETRIES`, `GEMINI_MODEL`, `GEMINI_EMBEDDING_MODEL`,
    /// `GEMINI_MEDIA_MAX_BYTES`, `GEMINI_ALLOW_PRIVATE_NETWORKS`.
    pub fn from_env() -> Result<Self, GeminiError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigurationError::MissingApiKey)?;

        let mut builder = Self::builder().api_key(SecretString::new(api_key));

        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            builder = builder.base_url(&base_url)?;
        }
        if let Ok(version) = std::env::var("GEMINI_API_VERSION") {
            builder = builder.api_version(&version);
        }
        if let Some(secs) = env_parse::<u64>("GEMINI_TIMEOUT_SECS") {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            builder = builder.default_model(&model);
        }
        if let Ok(model) = std::env::var("GEMINI_EMBEDDING_MODEL") {
            builder = builder.default_embedding_model(&model);
        }

        let mut retry_config = RetryConfig::default();
        if let Some(max_retries) = env_parse::<u32>("GEMINI_MAX_RETRIES") {
            retry_config.max_retries = max_retries;
        }

        let mut media = MediaConfig::default();
        if let Some(max_bytes) = env_parse::<u64>("GEMINI_MEDIA_MAX_BYTES") {
            media.max_bytes = max_bytes;
            media.inline_max_bytes = max_bytes;
        }
        if let Ok(value) = std::env::var("GEMINI_ALLOW_PRIVATE_NETWORKS") {
            media.allow_private_networks = parse_flag(&value);
        }

        builder.retry_config(retry_config).media(media).build()
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Builder for GeminiConfig.
#[derive(Default)]
pub struct GeminiConfigBuilder {
    api_key: Option<SecretString>,
    base_url: Option<Url>,
    api_version: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry_config: Option<RetryConfig>,
    media: Option<MediaConfig>,
    default_model: Option<String>,
    default_embedding_model: Option<String>,
    log_level: Option<LogLevel>,
}

impl GeminiConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Set the base URL.
    pub fn base_url(mut self, base_url: &str) -> Result<Self, GeminiError> {
        let url = Url::parse(base_url).map_err(|_| ConfigurationError::InvalidBaseUrl {
            url: base_url.to_string(),
        })?;
        self.base_url = Some(url);
        Ok(self)
    }

    /// Set the API version.
    pub fn api_version(mut self, version: &str) -> Self {
        self.api_version = Some(version.to_string());
        self
    }

    /// Set the per-attempt request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the retry configuration.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = Some(config);
        self
    }

    /// Set the media fetch configuration.
    pub fn media(mut self, media: MediaConfig) -> Self {
        self.media = Some(media);
        self
    }

    /// Set the default generation model.
    pub fn default_model(mut self, model: &str) -> Self {
        self.default_model = Some(model.to_string());
        self
    }

    /// Set the default embedding model.
    pub fn default_embedding_model(mut self, model: &str) -> Self {
        self.default_embedding_model = Some(model.to_string());
        self
    }

    /// Set the log level.
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<GeminiConfig, GeminiError> {
        let api_key = self.api_key
            .ok_or(ConfigurationError::MissingApiKey)?;

        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigurationError::InvalidBaseUrl {
                url: base_url.to_string(),
            }
            .into());
        }

        let timeout = self.timeout.unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidConfiguration {
                message: "timeout must be greater than zero".to_string(),
            }
            .into());
        }

        Ok(GeminiConfig {
            api_key,
            base_url: with_trailing_slash(base_url),
            api_version: self.api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            timeout,
            connect_timeout: self.connect_timeout.unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)),
            retry_config: self.retry_config.unwrap_or_default(),
            media: self.media.unwrap_or_default(),
            default_model: self.default_model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            default_embedding_model: self
                .default_embedding_model
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            log_level: self.log_level.unwrap_or_default(),
        })
    }
}

/// Relative joins against a base URL drop the last path segment unless the
/// path ends with a slash.
/// Appends `/` to the path so relative joins keep the last segment.
pub(crate) fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
