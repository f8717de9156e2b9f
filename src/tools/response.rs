//! The uniform envelope every tool call returns.

use serde::Serialize;
use serde_json::Value;

/// One content block of a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolContent {
    /// A text block.
    Text {
        /// The text.
        text: String,
    },
}

impl ToolContent {
    /// The block's text.
    pub fn as_text(&self) -> &str {
        match self {
            ToolContent::Text { text } => text,
        }
    }
}

/// Result of a tool call, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    /// Content blocks, in order.
    pub content: Vec<ToolContent>,
    /// True when the call failed.
    pub is_error: bool,
    /// Machine-readable copy of the result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured: Option<Value>,
}

impl ToolResponse {
    /// A successful text result.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
            structured: None,
        }
    }

    /// A failed call.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::text(message)
        }
    }

    /// A successful result whose text is `value` pretty-printed.
    pub fn json(value: Value) -> Self {
        let text = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
        Self::text(text).with_structured(value)
    }

    /// Attaches a machine-readable result.
    pub fn with_structured(mut self, value: Value) -> Self {
        self.structured = Some(value);
        self
    }

    /// All text blocks joined by newlines.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(ToolContent::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shapes() {
        let ok = ToolResponse::json(json!({"deleted": true}));
        assert!(!ok.is_error);
        assert_eq!(ok.structured, Some(json!({"deleted": true})));
        assert!(ok.text_content().contains("\"deleted\": true"));

        let failed = ToolResponse::error("boom");
        assert!(failed.is_error);
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"content": [{"type": "text", "text": "boom"}], "isError": true})
        );
    }
}
