//! Routes tool calls to the Gemini services and shapes the results.

use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use super::args::{
    DeleteFileArgs, EmbeddingsArgs, GenerateArgs, GenerationOptions, ListFilesArgs, MessagesArgs,
    ToolRequest,
};
use super::records::FileRecord;
use super::response::ToolResponse;
use super::upload::upload_file;
use super::{catalog, ToolDefinition, ToolKind, TOOL_DOCS};
use crate::client::GeminiClient;
use crate::error::{GeminiError, GeminiResult, ValidationDetail};
use crate::normalizer::{
    block_reason, extract_function_calls, extract_text, extract_thoughts, extract_usage,
    finish_reason, is_blocked, UsageMetrics,
};
use crate::observability::{EventSink, ToolEvent, ToolOutcome};
use crate::services::{ContentMapper, MAX_PAGE_SIZE};
use crate::transport::endpoints;
use crate::types::{Content, GenerateContentRequest, GenerateContentResponse, Part};

/// What a successful call produced, before it becomes an event.
struct CallOutput {
    response: ToolResponse,
    usage: Option<UsageMetrics>,
    blocked: bool,
}

impl CallOutput {
    fn plain(response: ToolResponse) -> Self {
        Self {
            response,
            usage: None,
            blocked: false,
        }
    }
}

/// Executes tool calls against a [`GeminiClient`].
///
/// Every call yields a [`ToolResponse`]; errors of any kind become error
/// envelopes, and each call is reported once to the event sink.
pub struct ToolDispatcher {
    client: Arc<dyn GeminiClient>,
    mapper: ContentMapper,
    events: Arc<dyn EventSink>,
}

impl ToolDispatcher {
    /// Creates a dispatcher over `client`.
    ///
    /// The content mapper shares the client's media source; every call is
    /// recorded to `events`.
    pub fn new(client: Arc<dyn GeminiClient>, events: Arc<dyn EventSink>) -> Self {
        let mapper = ContentMapper::new(client.media(), client.config().media.inline_max_bytes);
        Self {
            client,
            mapper,
            events,
        }
    }

    /// Definitions for `tools/list`.
    pub fn catalog(&self) -> Vec<ToolDefinition> {
        catalog::definitions()
    }

    /// Runs the tool `name` with `arguments`.
    pub async fn call(&self, name: &str, arguments: Option<Value>) -> ToolResponse {
        let started = Instant::now();

        let Some(kind) = ToolKind::from_name(name) else {
            let message = format!("Unknown tool: {name}");
            self.record(name, None, ToolOutcome::Error, started, None, Some(&message));
            return ToolResponse::error(message);
        };

        tracing::debug!(tool = %kind, "Tool call started");
        let request = match ToolRequest::parse(kind, arguments) {
            Ok(request) => request,
            Err(err) => {
                let message = err.to_string();
                self.record(name, None, ToolOutcome::Error, started, None, Some(&message));
                return ToolResponse::error(message);
            }
        };

        let model = self.model_for(&request);
        match self.execute(&request).await {
            Ok(output) => {
                let outcome = if output.blocked {
                    ToolOutcome::Blocked
                } else {
                    ToolOutcome::Success
                };
                self.record(name, model, outcome, started, output.usage, None);
                output.response
            }
            Err(err) => {
                let message = format!("{kind} failed: {err}");
                self.record(name, model, ToolOutcome::Error, started, None, Some(&message));
                ToolResponse::error(message)
            }
        }
    }

    async fn execute(&self, request: &ToolRequest) -> GeminiResult<CallOutput> {
        match request {
            ToolRequest::Generate(args) => self.generate(args).await,
            ToolRequest::Messages(args) => self.messages(args).await,
            ToolRequest::UploadFile(args) => {
                let record = upload_file(self.client.as_ref(), args, Utc::now()).await?;
                Ok(CallOutput::plain(ToolResponse::json(serde_json::to_value(record)?)))
            }
            ToolRequest::ListFiles(args) => self.list_files(args).await,
            ToolRequest::DeleteFile(args) => self.delete_file(args).await,
            ToolRequest::Embeddings(args) => self.embeddings(args).await,
            ToolRequest::GetDocs => Ok(CallOutput::plain(ToolResponse::text(TOOL_DOCS))),
        }
    }

    async fn generate(&self, args: &GenerateArgs) -> GeminiResult<CallOutput> {
        let request = build_request(
            vec![Content::user(vec![Part::text(args.prompt.clone())])],
            args.options.system_instruction().map(str::to_string),
            &args.options,
        );
        let response = self
            .client
            .content()
            .generate(&self.generation_model(&args.options), request)
            .await?;
        render_generation(&response, false)
    }

    async fn messages(&self, args: &MessagesArgs) -> GeminiResult<CallOutput> {
        let mapped = self
            .mapper
            .map_messages(&args.messages, args.options.system_instruction())
            .await?;
        if mapped.contents.is_empty() {
            return Err(GeminiError::validation(
                "Invalid arguments for gemini_messages",
                vec![ValidationDetail::new(
                    "messages",
                    "No message contains content that can be sent",
                )],
            ));
        }

        let mut request = build_request(mapped.contents, mapped.system_instruction, &args.options);
        request.tools.clone_from(&args.tools);
        request.tool_config.clone_from(&args.tool_config);

        let response = self
            .client
            .content()
            .generate(&self.generation_model(&args.options), request)
            .await?;
        render_generation(&response, true)
    }

    async fn list_files(&self, args: &ListFilesArgs) -> GeminiResult<CallOutput> {
        let page = self
            .client
            .files()
            .list(Some(args.page_size.min(MAX_PAGE_SIZE)), args.page_token.as_deref())
            .await?;

        let now = Utc::now();
        let records: Vec<FileRecord> = page
            .files
            .iter()
            .filter(|file| args.filter.matches(file, now))
            .map(FileRecord::from_file)
            .collect();

        Ok(CallOutput::plain(ToolResponse::json(json!({
            "files": records,
            "count": records.len(),
            "nextPageToken": page.next_page_token,
        }))))
    }

    async fn delete_file(&self, args: &DeleteFileArgs) -> GeminiResult<CallOutput> {
        let file_id = endpoints::file_id(args.file_id.trim());
        let already_deleted = match self.client.files().delete(file_id).await {
            Ok(()) => false,
            Err(err) if args.force && err.status_code() == Some(404) => true,
            Err(err) => return Err(err),
        };

        let text = if already_deleted {
            format!("File {file_id} was already deleted")
        } else {
            format!("Deleted file {file_id}")
        };
        Ok(CallOutput::plain(ToolResponse::text(text).with_structured(json!({
            "fileId": file_id,
            "deleted": true,
            "alreadyDeleted": already_deleted,
        }))))
    }

    async fn embeddings(&self, args: &EmbeddingsArgs) -> GeminiResult<CallOutput> {
        let model = self.embedding_model(args);
        let vectors = self
            .client
            .embeddings()
            .embed_texts(&model, &args.prepared_texts(), args.task_type, args.output_dimensionality)
            .await?;

        let value = json!({
            "model": model,
            "count": vectors.len(),
            "dimensions": vectors.first().map_or(0, Vec::len),
            "embeddings": vectors,
        });
        // Vectors are long; compact JSON keeps the text block readable.
        Ok(CallOutput::plain(ToolResponse::text(value.to_string()).with_structured(value)))
    }

    fn generation_model(&self, options: &GenerationOptions) -> String {
        options
            .model
            .as_deref()
            .map(str::trim)
            .unwrap_or(&self.client.config().default_model)
            .to_string()
    }

    fn embedding_model(&self, args: &EmbeddingsArgs) -> String {
        args.model
            .as_deref()
            .map(str::trim)
            .unwrap_or(&self.client.config().default_embedding_model)
            .to_string()
    }

    fn model_for(&self, request: &ToolRequest) -> Option<String> {
        match request {
            ToolRequest::Generate(args) => Some(self.generation_model(&args.options)),
            ToolRequest::Messages(args) => Some(self.generation_model(&args.options)),
            ToolRequest::Embeddings(args) => Some(self.embedding_model(args)),
            _ => None,
        }
    }

    fn record(
        &self,
        tool: &str,
        model: Option<String>,
        outcome: ToolOutcome,
        started: Instant,
        usage: Option<UsageMetrics>,
        error: Option<&str>,
    ) {
        self.events.record_event(&ToolEvent {
            tool: tool.to_string(),
            model,
            outcome,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            usage,
            error: error.map(str::to_string),
            timestamp: Utc::now(),
        });
    }
}

fn build_request(
    contents: Vec<Content>,
    system_instruction: Option<String>,
    options: &GenerationOptions,
) -> GenerateContentRequest {
    GenerateContentRequest {
        contents,
        system_instruction: system_instruction.map(Content::system_text),
        safety_settings: options.safety_settings.clone(),
        generation_config: options.generation_config(),
        ..Default::default()
    }
}

/// Text, function calls and usage of a generation, or the block notice.
fn render_generation(
    response: &GenerateContentResponse,
    with_function_calls: bool,
) -> GeminiResult<CallOutput> {
    let usage = extract_usage(response);

    if is_blocked(response) {
        let reason = block_reason(response);
        let text = format!("Response blocked: {reason}");
        let structured = json!({
            "blocked": true,
            "reason": reason,
            "finishReason": finish_reason(response),
            "usage": usage,
        });
        return Ok(CallOutput {
            response: ToolResponse::text(text).with_structured(structured),
            usage,
            blocked: true,
        });
    }

    let text = extract_text(response);
    let thoughts = extract_thoughts(response);
    let calls = if with_function_calls {
        extract_function_calls(response)
    } else {
        Vec::new()
    };

    let mut sections = Vec::new();
    if !thoughts.is_empty() {
        sections.push(format!("Thoughts:\n{thoughts}"));
    }
    if !text.is_empty() {
        sections.push(text.clone());
    }
    if !calls.is_empty() {
        sections.push(format!("Function calls:\n{}", serde_json::to_string_pretty(&calls)?));
    }
    if text.is_empty() && calls.is_empty() {
        sections.push(format!("[no text returned: {}]", block_reason(response)));
    }
    if let Some(usage) = usage {
        sections.push(usage.summary_line());
    }

    let structured = json!({
        "text": text,
        "thoughts": (!thoughts.is_empty()).then_some(thoughts),
        "functionCalls": calls,
        "usage": usage,
        "finishReason": finish_reason(response),
        "modelVersion": response.model_version,
        "blocked": false,
    });

    Ok(CallOutput {
        response: ToolResponse::text(sections.join("\n\n")).with_structured(structured),
        usage,
        blocked: false,
    })
}
