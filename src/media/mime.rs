//! MIME type helpers shared by the fetcher, the content mapper and upload
//! validation.

use once_cell::sync::Lazy;
use regex::Regex;

/// Fallback when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

static IANA_MIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9!#$&^_.+-]{0,126}/[a-zA-Z0-9][a-zA-Z0-9!#$&^_.+-]{0,126}$").unwrap()
});

/// True when `value` has the `type/subtype` shape of an IANA media type.
pub fn is_valid_mime_type(value: &str) -> bool {
    IANA_MIME.is_match(value)
}

/// Strips parameters and normalizes case, e.g. `Image/PNG; q=1` → `image/png`.
pub fn essence(value: &str) -> Option<String> {
    value
        .parse::<mime::Mime>()
        .ok()
        .map(|m| m.essence_str().to_ascii_lowercase())
}

/// Sniffs a MIME type from magic bytes.
pub fn sniff(bytes: &[u8]) -> Option<String> {
    infer::get(bytes).map(|kind| kind.mime_type().to_string())
}

/// Picks the MIME type for downloaded bytes.
///
/// Priority: explicit hint, then the `Content-Type` header, then magic bytes,
/// then [`OCTET_STREAM`].
pub fn resolve(hint: Option<&str>, content_type: Option<&str>, bytes: &[u8]) -> String {
    if let Some(hint) = hint.map(str::trim).filter(|h| !h.is_empty()) {
        return hint.to_string();
    }
    if let Some(declared) = content_type.and_then(essence) {
        return declared;
    }
    sniff(bytes).unwrap_or_else(|| OCTET_STREAM.to_string())
}

/// Media category of a remote reference part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// `image/*` content.
    Image,
    /// `audio/*` content.
    Audio,
    /// `video/*` content.
    Video,
}

impl MediaKind {
    /// Lowercase label, used in placeholders and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }

    /// MIME types Gemini accepts for this category.
    pub fn supported_types(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => &[
                "image/png",
                "image/jpeg",
                "image/webp",
                "image/heic",
                "image/heif",
                "image/gif",
            ],
            MediaKind::Audio => &[
                "audio/wav",
                "audio/x-wav",
                "audio/mp3",
                "audio/mpeg",
                "audio/aiff",
                "audio/aac",
                "audio/ogg",
                "audio/flac",
            ],
            MediaKind::Video => &[
                "video/mp4",
                "video/mpeg",
                "video/mov",
                "video/quicktime",
                "video/avi",
                "video/x-flv",
                "video/mpg",
                "video/webm",
                "video/wmv",
                "video/3gpp",
            ],
        }
    }

    /// True when `mime_type` is in this category's allow-list.
    pub fn accepts(&self, mime_type: &str) -> bool {
        let normalized = essence(mime_type).unwrap_or_else(|| mime_type.to_ascii_lowercase());
        self.supported_types().contains(&normalized.as_str())
    }
}

/// Decoded size of a base64 payload, without decoding it.
pub fn estimated_decoded_len(base64: &str) -> u64 {
    let trimmed = base64.trim();
    let padding = trimmed.bytes().rev().take_while(|b| *b == b'=').count().min(2) as u64;
    ((trimmed.len() as u64) * 3 / 4).saturating_sub(padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_shape() {
        assert!(is_valid_mime_type("image/png"));
        assert!(is_valid_mime_type("application/vnd.openxmlformats-officedocument.wordprocessingml.document"));
        assert!(!is_valid_mime_type("image"));
        assert!(!is_valid_mime_type("image/png; charset=utf-8"));
        assert!(!is_valid_mime_type("/png"));
    }

    #[test]
    fn test_resolve_priority() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

        assert_eq!(resolve(Some("image/webp"), Some("image/jpeg"), &png), "image/webp");
        assert_eq!(resolve(None, Some("Image/JPEG; charset=binary"), &png), "image/jpeg");
        assert_eq!(resolve(None, None, &png), "image/png");
        assert_eq!(resolve(Some("  "), None, b"plain"), OCTET_STREAM);
    }

    #[test]
    fn test_category_allow_list() {
        assert!(MediaKind::Image.accepts("image/png"));
        assert!(MediaKind::Audio.accepts("audio/mpeg"));
        assert!(!MediaKind::Image.accepts("application/pdf"));
        assert!(!MediaKind::Video.accepts("image/png"));
    }

    #[test]
    fn test_estimated_decoded_len() {
        assert_eq!(estimated_decoded_len("aGVsbG8="), 5);
        assert_eq!(estimated_decoded_len("aGk="), 2);
        assert_eq!(estimated_decoded_len("YWJj"), 3);
        assert_eq!(estimated_decoded_len(""), 0);
    }
}
