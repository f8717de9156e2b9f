//! Content generation service implementation.

use async_trait::async_trait;
use serde_json::json;

use super::validation::validate_generate_request;
use super::ContentService;
use crate::error::GeminiResult;
use crate::normalizer;
use crate::observability::{Logger, StructuredLogger};
use crate::transport::{endpoints, ApiExecutor, HttpMethod, RequestBuilder};
use crate::types::{GenerateContentRequest, GenerateContentResponse};

/// [`ContentService`] over the shared request builder and executor.
pub struct ContentServiceImpl {
    requests: RequestBuilder,
    executor: ApiExecutor,
    logger: StructuredLogger,
}

impl ContentServiceImpl {
    /// Creates the service over a shared request builder and executor.
    pub fn new(requests: RequestBuilder, executor: ApiExecutor, logger: StructuredLogger) -> Self {
        Self {
            requests,
            executor,
            logger,
        }
    }
}

#[async_trait]
impl ContentService for ContentServiceImpl {
    async fn generate(
        &self,
        model: &str,
        request: GenerateContentRequest,
    ) -> GeminiResult<GenerateContentResponse> {
        validate_generate_request(model, &request)?;

        let http_request = self.requests.build_request(
            HttpMethod::Post,
            &endpoints::generate_content(model),
            &[],
            Some(&request),
        )?;

        self.logger.debug(
            "Sending generateContent request",
            json!({
                "model": endpoints::model_id(model),
                "turns": request.contents.len(),
                "has_system_instruction": request.system_instruction.is_some(),
                "has_tools": request.tools.is_some(),
            }),
        );

        let response: GenerateContentResponse = self
            .executor
            .execute_json("content.generate", http_request)
            .await?;

        let usage = normalizer::extract_usage(&response).unwrap_or_default();
        self.logger.info(
            "generateContent completed",
            json!({
                "model": endpoints::model_id(model),
                "finish_reason": normalizer::finish_reason(&response),
                "prompt_tokens": usage.prompt_tokens,
                "completion_tokens": usage.completion_tokens,
            }),
        );

        Ok(response)
    }
}
