//! Typed tool arguments and their validation.
//!
//! Arguments are camelCase JSON. Parsing checks shape; validation collects
//! every field problem into one [`RequestError::ValidationError`] so the
//! caller sees them together, before any request is made.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;

use super::ToolKind;
use crate::error::{GeminiError, GeminiResult, RequestError, ValidationDetail};
use crate::media::{is_data_uri, mime};
use crate::services::{validate_file_id, Message};
use crate::transport::endpoints;
use crate::types::{
    File, GenerationConfig, SafetySetting, TaskType, ThinkingConfig, Tool, ToolConfig,
};

/// Upper bound on texts per embeddings call.
pub const MAX_EMBEDDING_TEXTS: usize = 2048;

/// Upper bound on characters per embedded text.
pub const MAX_EMBEDDING_TEXT_CHARS: usize = 100_000;

const MIN_OUTPUT_DIMENSIONALITY: u32 = 8;
const MAX_OUTPUT_DIMENSIONALITY: u32 = 3072;

/// Largest `pageSize` accepted by `gemini_list_files`.
pub const MAX_LIST_PAGE_SIZE: u32 = 1000;
const DEFAULT_LIST_PAGE_SIZE: u32 = 100;

/// Bounds on `retention.ttlSeconds`: one minute to thirty days.
pub const MIN_TTL_SECONDS: u64 = 60;
/// Upper bound on `retention.ttlSeconds`.
pub const MAX_TTL_SECONDS: u64 = 2_592_000;

/// Generation settings shared by `gemini_generate` and `gemini_messages`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Model id; the configured default when absent.
    pub model: Option<String>,
    /// System instruction.
    pub system: Option<String>,
    /// Sampling and output settings, passed through.
    pub generation_config: Option<GenerationConfig>,
    /// JSON Schema for structured output.
    pub response_schema: Option<Value>,
    /// MIME type of the answer.
    pub response_mime_type: Option<String>,
    /// Per-category safety thresholds.
    pub safety_settings: Option<Vec<SafetySetting>>,
    /// Thinking budget and thought summaries.
    pub thinking: Option<ThinkingConfig>,
}

impl GenerationOptions {
    /// Folds schema, response MIME type and thinking settings into one
    /// generation config; `None` when nothing was set.
    pub fn generation_config(&self) -> Option<GenerationConfig> {
        let mut config = self.generation_config.clone().unwrap_or_default();

        if let Some(schema) = &self.response_schema {
            config.response_schema = Some(schema.clone());
            if config.response_mime_type.is_none() {
                config.response_mime_type = Some("application/json".to_string());
            }
        }
        if let Some(mime_type) = &self.response_mime_type {
            config.response_mime_type = Some(mime_type.clone());
        }
        if let Some(thinking) = &self.thinking {
            config.thinking_config = Some(thinking.clone());
        }

        (config != GenerationConfig::default()).then_some(config)
    }

    /// The system instruction, if non-blank.
    pub fn system_instruction(&self) -> Option<&str> {
        self.system.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    fn validate(&self, details: &mut Vec<ValidationDetail>) {
        validate_model(self.model.as_deref(), details);
        if let Some(mime_type) = &self.response_mime_type {
            if !mime::is_valid_mime_type(mime_type) {
                details.push(ValidationDetail::new(
                    "responseMimeType",
                    format!("'{mime_type}' is not a valid MIME type"),
                ));
            }
        }
        if self.response_schema.as_ref().is_some_and(|s| !s.is_object()) {
            details.push(ValidationDetail::new("responseSchema", "Response schema must be a JSON object"));
        }
    }
}

/// Arguments of `gemini_generate`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateArgs {
    /// The user prompt.
    pub prompt: String,
    /// Shared generation settings.
    #[serde(flatten)]
    pub options: GenerationOptions,
}

/// Arguments of `gemini_messages`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesArgs {
    /// Conversation, oldest first.
    pub messages: Vec<Message>,
    /// Shared generation settings.
    #[serde(flatten)]
    pub options: GenerationOptions,
    /// Function declarations, passed through.
    pub tools: Option<Vec<Tool>>,
    /// Function calling settings, passed through.
    pub tool_config: Option<ToolConfig>,
}

/// How long an uploaded file should be kept.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Retention {
    /// Keep the file until the provider expires it.
    #[default]
    Persistent,
    /// Exactly one of the two fields must be set.
    Temporary {
        /// Keep for this many seconds from now.
        #[serde(default, rename = "ttlSeconds")]
        ttl_seconds: Option<u64>,
        /// Keep until this instant.
        #[serde(default, rename = "expiresAt")]
        expires_at: Option<DateTime<Utc>>,
    },
}

impl Retention {
    /// Requested expiry, measured from `now` for a TTL.
    pub fn expiry(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Retention::Persistent => None,
            Retention::Temporary {
                ttl_seconds: Some(ttl),
                ..
            } => i64::try_from(*ttl)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .map(|ttl| now + ttl),
            Retention::Temporary { expires_at, .. } => *expires_at,
        }
    }

    fn validate(&self, now: DateTime<Utc>, details: &mut Vec<ValidationDetail>) {
        let Retention::Temporary {
            ttl_seconds,
            expires_at,
        } = self
        else {
            return;
        };

        match (ttl_seconds, expires_at) {
            (None, None) | (Some(_), Some(_)) => details.push(ValidationDetail::new(
                "retention",
                "Temporary retention requires exactly one of ttlSeconds or expiresAt",
            )),
            (Some(ttl), None) if !(MIN_TTL_SECONDS..=MAX_TTL_SECONDS).contains(ttl) => {
                details.push(ValidationDetail::new(
                    "retention.ttlSeconds",
                    format!("ttlSeconds must be between {MIN_TTL_SECONDS} and {MAX_TTL_SECONDS}"),
                ));
            }
            (None, Some(at)) if *at <= now => details.push(ValidationDetail::new(
                "retention.expiresAt",
                "expiresAt must be in the future",
            )),
            _ => {}
        }
    }
}

fn default_true() -> bool {
    true
}

/// Arguments of `gemini_upload_file`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFileArgs {
    /// `http(s)` URL, `data:` URI or raw base64.
    pub source: String,
    /// MIME type of the content.
    pub mime_type: String,
    /// Human-readable name stored with the file.
    pub display_name: Option<String>,
    /// Reuse an existing file with the same hash and MIME type.
    #[serde(default = "default_true")]
    pub dedupe: bool,
    /// How long the file should be kept.
    #[serde(default)]
    pub retention: Retention,
}

impl UploadFileArgs {
    fn validate(&self, now: DateTime<Utc>, details: &mut Vec<ValidationDetail>) {
        let source = self.source.trim();
        if source.is_empty() {
            details.push(ValidationDetail::new("source", "Source must not be empty"));
        } else if let Some((scheme, _)) = source.split_once("://") {
            if !matches!(scheme.to_ascii_lowercase().as_str(), "http" | "https") {
                details.push(ValidationDetail::new(
                    "source",
                    format!("Unsupported URL scheme '{scheme}' (only http and https are allowed)"),
                ));
            }
        } else if !is_data_uri(source) && source.contains(':') {
            details.push(ValidationDetail::new(
                "source",
                "Source must be an http(s) URL, a data: URI or base64",
            ));
        }

        if !mime::is_valid_mime_type(&self.mime_type) {
            details.push(ValidationDetail::new(
                "mimeType",
                format!("'{}' is not a valid MIME type", self.mime_type),
            ));
        }
        if self.display_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            details.push(ValidationDetail::new("displayName", "Display name must not be blank"));
        }
        self.retention.validate(now, details);
    }
}

/// Client-side filter applied to one page of `gemini_list_files`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFilter {
    /// Accepted MIME types, case-insensitive.
    pub mime_types: Option<Vec<String>>,
    /// Case-insensitive substring of the display name.
    pub display_name_contains: Option<String>,
    /// Only files created after this instant.
    pub created_after: Option<DateTime<Utc>>,
    /// Only files created before this instant.
    pub created_before: Option<DateTime<Utc>>,
    /// Only files that have, or have not, expired.
    pub expired: Option<bool>,
}

impl FileFilter {
    /// True when `file` passes every set criterion.
    ///
    /// Files with an unparseable `createTime` fail any date criterion.
    pub fn matches(&self, file: &File, now: DateTime<Utc>) -> bool {
        if let Some(types) = self.mime_types.as_ref().filter(|t| !t.is_empty()) {
            let Some(file_type) = file.mime_type.as_deref() else {
                return false;
            };
            if !types.iter().any(|t| t.eq_ignore_ascii_case(file_type)) {
                return false;
            }
        }

        if let Some(needle) = self.display_name_contains.as_deref().filter(|n| !n.is_empty()) {
            let found = file
                .display_name
                .as_deref()
                .is_some_and(|name| name.to_lowercase().contains(&needle.to_lowercase()));
            if !found {
                return false;
            }
        }

        if self.created_after.is_some() || self.created_before.is_some() {
            let Some(created) = parse_time(file.create_time.as_deref()) else {
                return false;
            };
            if self.created_after.is_some_and(|after| created < after)
                || self.created_before.is_some_and(|before| created > before)
            {
                return false;
            }
        }

        if let Some(expired) = self.expired {
            let is_expired = parse_time(file.expiration_time.as_deref()).is_some_and(|at| at <= now);
            if is_expired != expired {
                return false;
            }
        }

        true
    }

    fn validate(&self, details: &mut Vec<ValidationDetail>) {
        if let (Some(after), Some(before)) = (self.created_after, self.created_before) {
            if after > before {
                details.push(ValidationDetail::new(
                    "filter.createdAfter",
                    "createdAfter must not be later than createdBefore",
                ));
            }
        }
        for mime_type in self.mime_types.iter().flatten() {
            if !mime::is_valid_mime_type(mime_type) {
                details.push(ValidationDetail::new(
                    "filter.mimeTypes",
                    format!("'{mime_type}' is not a valid MIME type"),
                ));
            }
        }
    }
}

pub(crate) fn parse_time(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|t| t.with_timezone(&Utc))
}

fn default_page_size() -> u32 {
    DEFAULT_LIST_PAGE_SIZE
}

/// Arguments of `gemini_list_files`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesArgs {
    /// Files requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Token from a previous page.
    pub page_token: Option<String>,
    /// Client-side filter.
    #[serde(default)]
    pub filter: FileFilter,
}

/// Arguments of `gemini_delete_file`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileArgs {
    /// File id, with or without the `files/` prefix.
    pub file_id: String,
    /// Report a missing file as already deleted.
    #[serde(default)]
    pub force: bool,
}

/// What to do with texts over [`MAX_EMBEDDING_TEXT_CHARS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Truncate {
    /// Reject the call.
    #[default]
    None,
    /// Keep the first characters.
    Start,
    /// Keep the last characters.
    End,
}

impl Truncate {
    /// Clips `text` to the character limit according to the mode.
    pub fn apply(self, text: &str) -> Cow<'_, str> {
        let count = text.chars().count();
        if count <= MAX_EMBEDDING_TEXT_CHARS {
            return Cow::Borrowed(text);
        }
        match self {
            Truncate::None => Cow::Borrowed(text),
            Truncate::Start => Cow::Owned(text.chars().take(MAX_EMBEDDING_TEXT_CHARS).collect()),
            Truncate::End => Cow::Owned(text.chars().skip(count - MAX_EMBEDDING_TEXT_CHARS).collect()),
        }
    }
}

/// Arguments of `gemini_embeddings`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingsArgs {
    /// Texts to embed, in order.
    pub texts: Vec<String>,
    /// Model id; the configured default when absent.
    pub model: Option<String>,
    /// Intended downstream use.
    pub task_type: Option<TaskType>,
    /// Handling of over-long texts.
    #[serde(default)]
    pub truncate: Truncate,
    /// Truncates vectors to this many dimensions.
    pub output_dimensionality: Option<u32>,
}

impl EmbeddingsArgs {
    /// The texts to send, clipped according to `truncate`.
    pub fn prepared_texts(&self) -> Vec<String> {
        self.texts
            .iter()
            .map(|text| self.truncate.apply(text).into_owned())
            .collect()
    }

    fn validate(&self, details: &mut Vec<ValidationDetail>) {
        if self.texts.is_empty() {
            details.push(ValidationDetail::new("texts", "At least one text is required"));
        }
        if self.texts.len() > MAX_EMBEDDING_TEXTS {
            details.push(ValidationDetail::new(
                "texts",
                format!("At most {MAX_EMBEDDING_TEXTS} texts are allowed, got {}", self.texts.len()),
            ));
        }
        for (idx, text) in self.texts.iter().enumerate() {
            if text.trim().is_empty() {
                details.push(ValidationDetail::new(format!("texts[{idx}]"), "Text must not be blank"));
            } else if self.truncate == Truncate::None
                && text.chars().count() > MAX_EMBEDDING_TEXT_CHARS
            {
                details.push(ValidationDetail::new(
                    format!("texts[{idx}]"),
                    format!(
                        "Text exceeds {MAX_EMBEDDING_TEXT_CHARS} characters; set truncate to start or end to clip it"
                    ),
                ));
            }
        }
        validate_model(self.model.as_deref(), details);
        if let Some(dims) = self.output_dimensionality {
            if !(MIN_OUTPUT_DIMENSIONALITY..=MAX_OUTPUT_DIMENSIONALITY).contains(&dims) {
                details.push(ValidationDetail::new(
                    "outputDimensionality",
                    format!(
                        "outputDimensionality must be between {MIN_OUTPUT_DIMENSIONALITY} and {MAX_OUTPUT_DIMENSIONALITY}"
                    ),
                ));
            }
        }
    }
}

/// A parsed and validated tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    /// `gemini_generate`.
    Generate(GenerateArgs),
    /// `gemini_messages`.
    Messages(MessagesArgs),
    /// `gemini_upload_file`.
    UploadFile(UploadFileArgs),
    /// `gemini_list_files`.
    ListFiles(ListFilesArgs),
    /// `gemini_delete_file`.
    DeleteFile(DeleteFileArgs),
    /// `gemini_embeddings`.
    Embeddings(EmbeddingsArgs),
    /// `gemini_get_docs`.
    GetDocs,
}

impl ToolRequest {
    /// Parses and validates the arguments of a `kind` call.
    ///
    /// Missing or `null` arguments are treated as an empty object.
    pub fn parse(kind: ToolKind, arguments: Option<Value>) -> GeminiResult<Self> {
        let arguments = match arguments {
            None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
            Some(value) => value,
        };

        let request = match kind {
            ToolKind::Generate => ToolRequest::Generate(from_arguments(kind, arguments)?),
            ToolKind::Messages => ToolRequest::Messages(from_arguments(kind, arguments)?),
            ToolKind::UploadFile => ToolRequest::UploadFile(from_arguments(kind, arguments)?),
            ToolKind::ListFiles => ToolRequest::ListFiles(from_arguments(kind, arguments)?),
            ToolKind::DeleteFile => ToolRequest::DeleteFile(from_arguments(kind, arguments)?),
            ToolKind::Embeddings => ToolRequest::Embeddings(from_arguments(kind, arguments)?),
            ToolKind::GetDocs => ToolRequest::GetDocs,
        };

        request.validate(Utc::now())?;
        Ok(request)
    }

    /// The tool this request belongs to.
    pub fn kind(&self) -> ToolKind {
        match self {
            ToolRequest::Generate(_) => ToolKind::Generate,
            ToolRequest::Messages(_) => ToolKind::Messages,
            ToolRequest::UploadFile(_) => ToolKind::UploadFile,
            ToolRequest::ListFiles(_) => ToolKind::ListFiles,
            ToolRequest::DeleteFile(_) => ToolKind::DeleteFile,
            ToolRequest::Embeddings(_) => ToolKind::Embeddings,
            ToolRequest::GetDocs => ToolKind::GetDocs,
        }
    }

    /// Checks every argument constraint, relative to `now` for dates.
    pub fn validate(&self, now: DateTime<Utc>) -> GeminiResult<()> {
        let mut details = Vec::new();

        match self {
            ToolRequest::Generate(args) => {
                if args.prompt.trim().is_empty() {
                    details.push(ValidationDetail::new("prompt", "Prompt must not be empty"));
                }
                args.options.validate(&mut details);
            }
            ToolRequest::Messages(args) => {
                if args.messages.is_empty() {
                    details.push(ValidationDetail::new("messages", "At least one message is required"));
                }
                args.options.validate(&mut details);
            }
            ToolRequest::UploadFile(args) => args.validate(now, &mut details),
            ToolRequest::ListFiles(args) => {
                if !(1..=MAX_LIST_PAGE_SIZE).contains(&args.page_size) {
                    details.push(ValidationDetail::new(
                        "pageSize",
                        format!("pageSize must be between 1 and {MAX_LIST_PAGE_SIZE}"),
                    ));
                }
                args.filter.validate(&mut details);
            }
            ToolRequest::DeleteFile(args) => validate_file_id(&args.file_id)?,
            ToolRequest::Embeddings(args) => args.validate(&mut details),
            ToolRequest::GetDocs => {}
        }

        if details.is_empty() {
            Ok(())
        } else {
            Err(GeminiError::validation(
                format!("Invalid arguments for {}", self.kind()),
                details,
            ))
        }
    }
}

fn validate_model(model: Option<&str>, details: &mut Vec<ValidationDetail>) {
    let Some(model) = model else { return };
    if model.trim().is_empty() {
        details.push(ValidationDetail::new("model", "Model must not be blank"));
    } else if !endpoints::is_valid_model_id(model) {
        details.push(ValidationDetail::new("model", format!("'{model}' is not a valid model name")));
    }
}

fn from_arguments<T: DeserializeOwned>(kind: ToolKind, arguments: Value) -> GeminiResult<T> {
    serde_json::from_value(arguments).map_err(|err| {
        GeminiError::Request(RequestError::InvalidParameter {
            parameter: "arguments".to_string(),
            message: format!("invalid arguments for {kind}: {err}"),
        })
    })
}
