//! The request pipeline: normalize, call the backend, reconcile.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{GenerationOutcome, QueryParams};
use crate::error::GatewayError;
use crate::ports::InferenceBackend;
use crate::services::normalizer::RequestNormalizer;
use crate::services::reconciler::reconcile;

/// Orchestrates one generation request end to end.
#[derive(Clone)]
pub struct GatewayService {
    normalizer: RequestNormalizer,
    backend: Arc<dyn InferenceBackend>,
}

impl GatewayService {
    pub fn new(normalizer: RequestNormalizer, backend: Arc<dyn InferenceBackend>) -> Self {
        Self {
            normalizer,
            backend,
        }
    }

    pub fn normalizer(&self) -> &RequestNormalizer {
        &self.normalizer
    }

    pub fn backend(&self) -> &Arc<dyn InferenceBackend> {
        &self.backend
    }

    /// Run one query through the pipeline.
    ///
    /// Validation failures never reach the backend.
    pub async fn generate(&self, raw: &QueryParams) -> Result<GenerationOutcome, GatewayError> {
        let request = self.normalizer.normalize(raw)?;
        let parameters = request.parameters();

        info!(
            model = %request.model,
            stream = request.stream,
            query_chars = request.query.len(),
            "Sending request to Ollama"
        );

        let endpoint = self.backend.endpoint();
        let reply = self
            .backend
            .chat(&request)
            .await
            .map_err(|e| GatewayError::from_backend(e, &endpoint))?;

        let response = reconcile(reply, &request.model)
            .await
            .map_err(|e| GatewayError::from_backend(e, &endpoint))?;

        debug!(
            model = %response.model,
            chars = response.message.len(),
            "Generation complete"
        );

        Ok(GenerationOutcome {
            response,
            parameters,
        })
    }
}
