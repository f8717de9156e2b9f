//! Retrieval of externally referenced media.
//!
//! [`MediaSource`] is the seam the content mapper depends on; [`MediaFetcher`]
//! is the network-backed implementation with destination and size guards.

mod data_uri;
mod fetcher;
pub mod guard;
pub mod mime;

use async_trait::async_trait;

use crate::error::GeminiResult;

pub use data_uri::{is_data_uri, parse as parse_data_uri, DataUri};
pub use fetcher::MediaFetcher;
pub use mime::MediaKind;

/// Media payload ready to be inlined into a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    /// Standard base64 of the bytes.
    pub data: String,
    /// Resolved MIME type.
    pub mime_type: String,
}

/// Resolves a URL or `data:` URI into a MIME-tagged base64 payload.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Fetches `reference`, using `mime_hint` when it is given.
    async fn fetch(&self, reference: &str, mime_hint: Option<&str>) -> GeminiResult<FetchedMedia>;
}
