//! Conversion of tool-level message content into Gemini parts.
//!
//! Remote media references are fetched and inlined. A failed fetch degrades to
//! a placeholder text part so one bad reference does not sink the message;
//! malformed inline data fails the whole request.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{GeminiError, GeminiResult, ValidationDetail};
use crate::media::{mime, MediaKind, MediaSource};
use crate::types::{Content, Part, Role};

/// One typed part of tool-level message content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// Image fetched from a URL or `data:` URI.
    Image {
        /// `http(s)` URL or `data:` URI.
        #[serde(alias = "source")]
        url: String,
        /// MIME type hint; detected when absent.
        #[serde(default, rename = "mimeType", alias = "mime_type", skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
    /// Audio fetched from a URL or `data:` URI.
    Audio {
        /// `http(s)` URL or `data:` URI.
        #[serde(alias = "source")]
        url: String,
        /// MIME type hint; detected when absent.
        #[serde(default, rename = "mimeType", alias = "mime_type", skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
    /// Video fetched from a URL or `data:` URI.
    Video {
        /// `http(s)` URL or `data:` URI.
        #[serde(alias = "source")]
        url: String,
        /// MIME type hint; detected when absent.
        #[serde(default, rename = "mimeType", alias = "mime_type", skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
    /// Base64 bytes; the MIME type is mandatory.
    InlineData {
        /// Standard base64.
        data: String,
        /// MIME type of the bytes.
        #[serde(rename = "mimeType", alias = "mime_type")]
        mime_type: String,
    },
    /// Reference to a file already uploaded to the Files API.
    File {
        /// URI returned by the Files API.
        #[serde(alias = "fileUri")]
        uri: String,
        /// MIME type of the file, passed through.
        #[serde(default, rename = "mimeType", alias = "mime_type", skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
    /// Any other `type` tag; skipped during mapping.
    #[serde(other)]
    Unsupported,
}

/// Message content: a bare string or an ordered list of parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// A single text part.
    Text(String),
    /// Ordered typed parts.
    Parts(Vec<ContentPart>),
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

/// Role of a tool-level message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The end user.
    User,
    /// The model; alias of `model`.
    Assistant,
    /// The model.
    Model,
    /// System instruction, merged into one.
    System,
}

/// A tool-level conversation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent the message.
    pub role: MessageRole,
    /// What the message says.
    pub content: MessageContent,
}

impl Message {
    /// Creates a message from a role and anything convertible to content.
    pub fn new(role: MessageRole, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        MessageContent::Parts(parts)
    }
}

/// Conversation turns plus the merged system instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedConversation {
    /// Turns with `user` or `model` roles.
    pub contents: Vec<Content>,
    /// System messages joined by blank lines.
    pub system_instruction: Option<String>,
}

/// Maps tool-level content to Gemini parts.
#[derive(Clone)]
pub struct ContentMapper {
    media: Arc<dyn MediaSource>,
    inline_max_bytes: u64,
}

impl ContentMapper {
    /// Creates a mapper that fetches remote media through `media`.
    pub fn new(media: Arc<dyn MediaSource>, inline_max_bytes: u64) -> Self {
        Self {
            media,
            inline_max_bytes,
        }
    }

    /// Maps content to parts, one output part per recognized input part.
    ///
    /// Remote references are fetched concurrently; output order follows input
    /// order.
    pub async fn map_content(&self, content: &MessageContent) -> GeminiResult<Vec<Part>> {
        let parts = match content {
            MessageContent::Text(text) => return Ok(vec![Part::text(text.clone())]),
            MessageContent::Parts(parts) => parts,
        };

        let mapped = try_join_all(
            parts
                .iter()
                .enumerate()
                .map(|(idx, part)| self.map_part(idx, part)),
        )
        .await?;

        Ok(mapped.into_iter().flatten().collect())
    }

    /// Splits system messages out of a conversation and maps the other turns.
    pub async fn map_messages(
        &self,
        messages: &[Message],
        system_instruction: Option<&str>,
    ) -> GeminiResult<MappedConversation> {
        let mut fragments: Vec<String> = system_instruction
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| vec![s.to_string()])
            .unwrap_or_default();
        let mut contents = Vec::new();

        for message in messages {
            let role = match message.role {
                MessageRole::System => {
                    if let Some(text) = system_text(&message.content) {
                        fragments.push(text);
                    }
                    continue;
                }
                MessageRole::User => Role::User,
                MessageRole::Assistant | MessageRole::Model => Role::Model,
            };

            let parts = self.map_content(&message.content).await?;
            if parts.is_empty() {
                tracing::debug!(role = ?message.role, "Dropping message with no mappable parts");
                continue;
            }
            contents.push(Content {
                role: Some(role),
                parts,
            });
        }

        Ok(MappedConversation {
            contents,
            system_instruction: if fragments.is_empty() {
                None
            } else {
                Some(fragments.join("\n\n"))
            },
        })
    }

    async fn map_part(&self, idx: usize, part: &ContentPart) -> GeminiResult<Option<Part>> {
        match part {
            ContentPart::Text { text } => Ok(Some(Part::text(text.clone()))),
            ContentPart::Image { url, mime_type } => {
                Ok(Some(self.fetch_media(MediaKind::Image, url, mime_type.as_deref()).await))
            }
            ContentPart::Audio { url, mime_type } => {
                Ok(Some(self.fetch_media(MediaKind::Audio, url, mime_type.as_deref()).await))
            }
            ContentPart::Video { url, mime_type } => {
                Ok(Some(self.fetch_media(MediaKind::Video, url, mime_type.as_deref()).await))
            }
            ContentPart::InlineData { data, mime_type } => {
                self.check_inline(idx, data, mime_type)?;
                Ok(Some(Part::inline_data(mime_type.clone(), data.trim())))
            }
            ContentPart::File { uri, mime_type } => {
                Ok(Some(Part::file_data(uri.clone(), mime_type.clone())))
            }
            ContentPart::Unsupported => {
                tracing::warn!(index = idx, "Skipping content part with unsupported type");
                Ok(None)
            }
        }
    }

    async fn fetch_media(&self, kind: MediaKind, url: &str, hint: Option<&str>) -> Part {
        match self.media.fetch(url, hint).await {
            Ok(media) => {
                if !kind.accepts(&media.mime_type) {
                    tracing::warn!(
                        kind = kind.as_str(),
                        mime_type = %media.mime_type,
                        url = %url,
                        "Fetched media has a MIME type outside the supported list"
                    );
                }
                Part::inline_data(media.mime_type, media.data)
            }
            Err(err) => {
                let reason = match &err {
                    GeminiError::Media(media) => media.to_string(),
                    other => other.to_string(),
                };
                tracing::warn!(kind = kind.as_str(), url = %url, error = %reason, "Media fetch failed");
                Part::text(format!("[{} unavailable: {} ({})]", kind.as_str(), url, reason))
            }
        }
    }

    fn check_inline(&self, idx: usize, data: &str, mime_type: &str) -> GeminiResult<()> {
        let mut details = Vec::new();

        if !mime::is_valid_mime_type(mime_type) {
            details.push(ValidationDetail::new(
                format!("parts[{idx}].mimeType"),
                format!("'{mime_type}' is not a valid MIME type"),
            ));
        }
        let size = mime::estimated_decoded_len(data);
        if size > self.inline_max_bytes {
            details.push(ValidationDetail::new(
                format!("parts[{idx}].data"),
                format!("Inline data is {size} bytes, above the {} byte limit", self.inline_max_bytes),
            ));
        }

        if details.is_empty() {
            Ok(())
        } else {
            Err(GeminiError::validation("Invalid inline data", details))
        }
    }
}

/// Text a system message contributes, trimmed; `None` when empty.
fn system_text(content: &MessageContent) -> Option<String> {
    let text = match content {
        MessageContent::Text(text) => text.as_str(),
        MessageContent::Parts(parts) => parts.iter().find_map(|part| match part {
            ContentPart::Text { text } => Some(text.as_str()),
            _ => None,
        })?,
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::FetchedMedia;
    use async_trait::async_trait;
    use serde_json::json;

    struct StaticMedia;

    #[async_trait]
    impl MediaSource for StaticMedia {
        async fn fetch(&self, reference: &str, mime_hint: Option<&str>) -> GeminiResult<FetchedMedia> {
            if reference.contains("broken") {
                return Err(crate::error::MediaError::HttpStatus {
                    status: 404,
                    reason: "Not Found".to_string(),
                }
                .into());
            }
            Ok(FetchedMedia {
                data: "AAAA".to_string(),
                mime_type: mime_hint.unwrap_or("image/png").to_string(),
            })
        }
    }

    fn mapper() -> ContentMapper {
        ContentMapper::new(Arc::new(StaticMedia), 1024)
    }

    #[test]
    fn test_part_json_shapes() {
        let parts: Vec<ContentPart> = serde_json::from_value(json!([
            {"type": "text", "text": "hi"},
            {"type": "image", "url": "https://x/a.png"},
            {"type": "audio", "source": "https://x/a.mp3", "mimeType": "audio/mpeg"},
            {"type": "inline_data", "data": "AAAA", "mimeType": "image/png"},
            {"type": "file", "uri": "https://x/files/1"},
            {"type": "hologram", "payload": 1}
        ]))
        .unwrap();

        assert_eq!(parts.len(), 6);
        assert_eq!(
            parts[2],
            ContentPart::Audio {
                url: "https://x/a.mp3".into(),
                mime_type: Some("audio/mpeg".into())
            }
        );
        assert_eq!(parts[5], ContentPart::Unsupported);
    }

    #[test]
    fn test_inline_data_requires_mime_type() {
        let result: Result<ContentPart, _> =
            serde_json::from_value(json!({"type": "inline_data", "data": "AAAA"}));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_string_maps_to_one_text_part() {
        let parts = mapper().map_content(&"  keep me  ".into()).await.unwrap();
        assert_eq!(parts, vec![Part::text("  keep me  ")]);
    }

    #[tokio::test]
    async fn test_failed_fetch_becomes_placeholder() {
        let content = MessageContent::Parts(vec![
            ContentPart::Text { text: "look".into() },
            ContentPart::Image {
                url: "https://x/broken.png".into(),
                mime_type: None,
            },
            ContentPart::Unsupported,
            ContentPart::Image {
                url: "https://x/ok.png".into(),
                mime_type: None,
            },
        ]);

        let parts = mapper().map_content(&content).await.unwrap();

        assert_eq!(parts.len(), 3);
        assert_eq!(
            parts[1].as_text(),
            Some("[image unavailable: https://x/broken.png (Media request failed with HTTP 404 Not Found)]")
        );
        assert_eq!(parts[2], Part::inline_data("image/png", "AAAA"));
    }

    #[tokio::test]
    async fn test_oversized_inline_data_fails() {
        let content = MessageContent::Parts(vec![ContentPart::InlineData {
            data: "A".repeat(2000),
            mime_type: "image/png".into(),
        }]);

        let err = mapper().map_content(&content).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_system_messages_are_merged() {
        let messages = vec![
            Message::new(MessageRole::System, "Be brief."),
            Message::new(MessageRole::User, "Hello"),
            Message::new(
                MessageRole::System,
                vec![ContentPart::Text { text: "  Use English.  ".into() }],
            ),
            Message::new(MessageRole::System, "   "),
            Message::new(MessageRole::Assistant, "Hi"),
        ];

        let mapped = mapper().map_messages(&messages, Some("You are helpful.")).await.unwrap();

        assert_eq!(
            mapped.system_instruction.as_deref(),
            Some("You are helpful.\n\nBe brief.\n\nUse English.")
        );
        assert_eq!(mapped.contents.len(), 2);
        assert_eq!(mapped.contents[1].role, Some(Role::Model));
    }

    #[tokio::test]
    async fn test_unrecognized_only_message_adds_no_turn() {
        let messages = vec![
            Message::new(MessageRole::User, vec![ContentPart::Unsupported]),
            Message::new(MessageRole::User, "real"),
        ];

        let mapped = mapper().map_messages(&messages, None).await.unwrap();

        assert_eq!(mapped.contents.len(), 1);
        assert_eq!(mapped.system_instruction, None);
    }
}
