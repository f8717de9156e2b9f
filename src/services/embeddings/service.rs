//! Embeddings service implementation.

use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::json;

use super::validation::{validate_embed_texts, MAX_BATCH_SIZE};
use super::EmbeddingsService;
use crate::error::{GeminiError, GeminiResult, ResponseError};
use crate::observability::{Logger, StructuredLogger};
use crate::transport::{endpoints, ApiExecutor, HttpMethod, RequestBuilder};
use crate::types::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, Content, EmbedContentRequest, Part,
    TaskType,
};

/// [`EmbeddingsService`] backed by `batchEmbedContents`.
pub struct EmbeddingsServiceImpl {
    requests: RequestBuilder,
    executor: ApiExecutor,
    logger: StructuredLogger,
}

impl EmbeddingsServiceImpl {
    /// Creates the service over a shared request builder and executor.
    pub fn new(requests: RequestBuilder, executor: ApiExecutor, logger: StructuredLogger) -> Self {
        Self {
            requests,
            executor,
            logger,
        }
    }

    async fn embed_chunk(
        &self,
        model: &str,
        chunk: &[String],
        task_type: Option<TaskType>,
        output_dimensionality: Option<u32>,
    ) -> GeminiResult<Vec<Vec<f32>>> {
        let resource = endpoints::model_resource(model);
        let body = BatchEmbedContentsRequest {
            requests: chunk
                .iter()
                .map(|text| EmbedContentRequest {
                    model: resource.clone(),
                    content: Content {
                        role: None,
                        parts: vec![Part::text(text.clone())],
                    },
                    task_type,
                    title: None,
                    output_dimensionality,
                })
                .collect(),
        };

        let request = self.requests.build_request(
            HttpMethod::Post,
            &endpoints::batch_embed_contents(model),
            &[],
            Some(&body),
        )?;
        let response: BatchEmbedContentsResponse =
            self.executor.execute_json("embeddings.batch", request).await?;

        if response.embeddings.len() != chunk.len() {
            return Err(GeminiError::Response(ResponseError::UnexpectedFormat {
                message: format!(
                    "expected {} embeddings, got {}",
                    chunk.len(),
                    response.embeddings.len()
                ),
            }));
        }
        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl EmbeddingsService for EmbeddingsServiceImpl {
    async fn embed_texts(
        &self,
        model: &str,
        texts: &[String],
        task_type: Option<TaskType>,
        output_dimensionality: Option<u32>,
    ) -> GeminiResult<Vec<Vec<f32>>> {
        validate_embed_texts(model, texts, output_dimensionality)?;

        // try_join_all yields results in chunk order regardless of completion order.
        let chunks = try_join_all(
            texts
                .chunks(MAX_BATCH_SIZE)
                .map(|chunk| self.embed_chunk(model, chunk, task_type, output_dimensionality)),
        )
        .await?;
        let vectors: Vec<Vec<f32>> = chunks.into_iter().flatten().collect();

        self.logger.info(
            "Embeddings generated",
            json!({
                "model": endpoints::model_id(model),
                "count": vectors.len(),
                "dimensions": vectors.first().map(Vec::len),
            }),
        );
        Ok(vectors)
    }
}
