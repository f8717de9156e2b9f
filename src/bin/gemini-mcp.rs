//! MCP server exposing the Gemini tools over stdio.
//!
//! Reads configuration from the environment (and `.env`), logs to stderr and
//! serves `tools/list` and `tools/call` until stdin closes.
//!
//! ```bash
//! GEMINI_API_KEY=... cargo run --bin gemini-mcp
//! ```

use anyhow::Context as _;
use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler, ServiceExt};
use std::sync::Arc;

use integrations_gemini_mcp::{
    GeminiConfig, GeminiClientImpl, ToolDefinition, ToolDispatcher, ToolResponse, TracingEventSink,
};

#[derive(Clone)]
struct GeminiMcpServer {
    dispatcher: Arc<ToolDispatcher>,
}

impl ServerHandler for GeminiMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "gemini-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Google Gemini tools: text generation, multimodal messages, file upload and \
                 management, and embeddings. Call gemini_get_docs for argument details."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        let tools = self.dispatcher.catalog().into_iter().map(to_mcp_tool).collect();
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let arguments = request.arguments.map(serde_json::Value::Object);
        let response = self.dispatcher.call(&request.name, arguments).await;
        Ok(to_call_result(response))
    }
}

fn to_mcp_tool(definition: ToolDefinition) -> Tool {
    let schema = match definition.input_schema {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    };
    Tool::new(definition.name, definition.description, Arc::new(schema))
}

fn to_call_result(response: ToolResponse) -> CallToolResult {
    let content = response
        .content
        .iter()
        .map(|block| Content::text(block.as_text().to_string()))
        .collect();

    let mut result = if response.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    };
    result.structured_content = response.structured;
    result
}

/// Logs go to stderr; stdout carries the protocol.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let json = std::env::var("GEMINI_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = GeminiConfig::from_env().context("failed to load Gemini configuration")?;
    let client = GeminiClientImpl::new(config).context("failed to create Gemini client")?;
    let dispatcher = ToolDispatcher::new(Arc::new(client), Arc::new(TracingEventSink));
    tracing::info!(tools = dispatcher.catalog().len(), "Starting Gemini MCP server on stdio");

    let server = GeminiMcpServer {
        dispatcher: Arc::new(dispatcher),
    };
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .inspect_err(|err| tracing::error!(error = %err, "MCP initialization failed"))?;

    service.waiting().await?;
    tracing::info!("Gemini MCP server stopped");
    Ok(())
}
