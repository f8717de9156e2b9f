//! `data:` URI parsing.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::MediaError;

/// A parsed `data:<mime>[;params];base64,<payload>` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Declared media type without parameters; empty if none was declared.
    pub mime_type: String,
    /// The base64 payload, unchanged.
    pub data: String,
    /// Length of the decoded payload.
    pub decoded_len: usize,
}

/// True when `reference` starts with the `data:` scheme.
pub fn is_data_uri(reference: &str) -> bool {
    reference
        .get(..5)
        .map(|prefix| prefix.eq_ignore_ascii_case("data:"))
        .unwrap_or(false)
}

/// Parses a base64 `data:` URI.
///
/// Percent-encoded (non-base64) data URIs are rejected.
pub fn parse(reference: &str) -> Result<DataUri, MediaError> {
    let invalid = |reason: &str| MediaError::InvalidDataUri {
        reason: reason.to_string(),
    };

    if !is_data_uri(reference) {
        return Err(invalid("missing data: prefix"));
    }
    let rest = &reference[5..];
    let (meta, payload) = rest.split_once(',').ok_or_else(|| invalid("missing ',' separator"))?;

    let mut segments = meta.split(';');
    let mime_type = segments.next().unwrap_or_default().trim().to_ascii_lowercase();
    if !segments.any(|s| s.trim().eq_ignore_ascii_case("base64")) {
        return Err(invalid("only base64 data URIs are supported"));
    }

    let decoded = STANDARD
        .decode(payload.trim())
        .map_err(|e| invalid(&format!("invalid base64 payload: {e}")))?;

    Ok(DataUri {
        mime_type,
        data: payload.trim().to_string(),
        decoded_len: decoded.len(),
    })
}
