//! Reqwest-backed media fetcher.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::redirect::{Attempt, Policy};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::{data_uri, guard, mime, FetchedMedia, MediaSource};
use crate::config::MediaConfig;
use crate::error::{ConfigurationError, GeminiResult, MediaError};

/// Fetches `data:` URIs locally and `http(s)` URLs over the network.
///
/// Every destination, including each redirect hop, goes through the
/// destination guard unless `allow_private_networks` is set: the host is
/// checked textually and every address it resolves to is checked before the
/// connection is opened.
#[derive(Clone)]
pub struct MediaFetcher {
    client: Client,
    config: MediaConfig,
}

impl MediaFetcher {
    /// Creates a fetcher with its own HTTP client.
    pub fn new(config: MediaConfig) -> GeminiResult<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .redirect(redirect_policy(config.max_redirects, config.allow_private_networks))
            .user_agent(concat!("integrations-gemini-mcp/", env!("CARGO_PKG_VERSION")));
        if !config.allow_private_networks {
            builder = builder.dns_resolver(Arc::new(guard::GuardedResolver));
        }

        let client = builder
            .build()
            .map_err(|e| ConfigurationError::InvalidConfiguration {
                message: format!("Failed to create media HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    /// The settings this fetcher enforces.
    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    fn from_data_uri(&self, reference: &str, mime_hint: Option<&str>) -> Result<FetchedMedia, MediaError> {
        let parsed = data_uri::parse(reference)?;
        if parsed.decoded_len as u64 > self.config.max_bytes {
            return Err(MediaError::TooLarge {
                size: parsed.decoded_len as u64,
                max_size: self.config.max_bytes,
            });
        }

        let mime_type = if parsed.mime_type.is_empty() {
            mime_hint
                .map(str::to_string)
                .unwrap_or_else(|| mime::OCTET_STREAM.to_string())
        } else {
            parsed.mime_type
        };

        Ok(FetchedMedia {
            data: parsed.data,
            mime_type,
        })
    }

    async fn from_remote(&self, reference: &str, mime_hint: Option<&str>) -> Result<FetchedMedia, MediaError> {
        let url = Url::parse(reference).map_err(|e| MediaError::InvalidUrl {
            url: reference.to_string(),
            message: e.to_string(),
        })?;
        guard::check_scheme(&url)?;
        if !self.config.allow_private_networks {
            guard::check_host(&url)?;
        }

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let max = self.config.max_bytes;
        if let Some(declared) = response.content_length() {
            if declared > max {
                return Err(MediaError::TooLarge {
                    size: declared,
                    max_size: max,
                });
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify(e))? {
            let size = (body.len() + chunk.len()) as u64;
            if size > max {
                return Err(MediaError::TooLarge { size, max_size: max });
            }
            body.extend_from_slice(&chunk);
        }

        let mime_type = mime::resolve(mime_hint, content_type.as_deref(), &body);
        tracing::debug!(url = %url, bytes = body.len(), mime_type = %mime_type, "Fetched media");

        Ok(FetchedMedia {
            data: STANDARD.encode(&body),
            mime_type,
        })
    }

    fn classify(&self, err: reqwest::Error) -> MediaError {
        if err.is_timeout() {
            return MediaError::Timeout {
                duration: self.config.timeout,
            };
        }
        // Errors raised by the redirect policy travel in the source chain.
        let mut source = std::error::Error::source(&err);
        while let Some(inner) = source {
            if let Some(media) = inner.downcast_ref::<MediaError>() {
                return media.clone();
            }
            source = inner.source();
        }
        MediaError::FetchFailed {
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl MediaSource for MediaFetcher {
    async fn fetch(&self, reference: &str, mime_hint: Option<&str>) -> GeminiResult<FetchedMedia> {
        let reference = reference.trim();
        if data_uri::is_data_uri(reference) {
            return Ok(self.from_data_uri(reference, mime_hint)?);
        }

        // The client timeout covers the exchange; this also bounds DNS resolution.
        let budget = self.config.timeout + Duration::from_secs(1);
        match tokio::time::timeout(budget, self.from_remote(reference, mime_hint)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(MediaError::Timeout {
                duration: self.config.timeout,
            }
            .into()),
        }
    }
}

fn redirect_policy(max_redirects: usize, allow_private_networks: bool) -> Policy {
    Policy::custom(move |attempt: Attempt<'_>| {
        if attempt.previous().len() >= max_redirects {
            return attempt.error(MediaError::FetchFailed {
                message: format!("too many redirects (max {max_redirects})"),
            });
        }
        if let Err(err) = guard::check_scheme(attempt.url()) {
            return attempt.error(err);
        }
        if !allow_private_networks {
            if let Err(err) = guard::check_host(attempt.url()) {
                tracing::warn!(target_url = %attempt.url(), "Blocked media redirect");
                return attempt.error(err);
            }
        }
        attempt.follow()
    })
}
