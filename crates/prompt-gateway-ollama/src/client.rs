//! reqwest-based Ollama client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, info};

use prompt_gateway_core::settings::DEFAULT_BACKEND_URL;
use prompt_gateway_core::{
    BackendError, BackendReply, GenerationRequest, InferenceBackend, ModelTag, ReplyShape,
};

use crate::stream::ndjson_chunks;
use crate::wire::{ChatRequestBody, PullRequestBody, TagsResponse, error_message};

/// Connection settings for [`OllamaClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OllamaConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:11434`.
    pub base_url: String,
    /// Deadline for a whole generation call including a streamed body.
    /// `None` waits indefinitely.
    pub generation_timeout: Option<Duration>,
    /// Per-request deadline for `/api/tags`.
    pub tags_timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            generation_timeout: None,
            tags_timeout: Duration::from_secs(10),
        }
    }
}

impl OllamaConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_generation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.generation_timeout = timeout;
        self
    }
}

/// Ollama implementation of [`InferenceBackend`].
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Use an existing (pooled) reqwest client.
    pub const fn with_client(http: Client, config: OllamaConfig) -> Self {
        Self { http, config }
    }

    pub const fn config(&self) -> &OllamaConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }
}

#[async_trait]
impl InferenceBackend for OllamaClient {
    async fn chat(&self, request: &GenerationRequest) -> Result<BackendReply, BackendError> {
        let body = ChatRequestBody::from(request);
        let mut builder = self.http.post(self.url("/api/chat")).json(&body);
        if let Some(timeout) = self.config.generation_timeout {
            builder = builder.timeout(timeout);
        }

        debug!(model = %request.model, stream = request.stream, "POST /api/chat");
        let response = check_status(builder.send().await.map_err(classify)?)
            .await
            .map_err(rejected_parameters)?;

        if request.stream {
            return Ok(BackendReply::Stream(ndjson_chunks(
                response.bytes_stream(),
                classify,
            )));
        }

        let bytes = response.bytes().await.map_err(classify)?;
        let shape = ReplyShape::from_body(&bytes);
        if let ReplyShape::Structured(object) = &shape {
            if let Some(err) = object.get("error").and_then(|e| e.as_str()) {
                return Err(BackendError::Runtime(err.to_string()));
            }
        }
        Ok(BackendReply::Complete(shape))
    }

    async fn list_models(&self) -> Result<Vec<ModelTag>, BackendError> {
        let response = self
            .http
            .get(self.url("/api/tags"))
            .timeout(self.config.tags_timeout)
            .send()
            .await
            .map_err(classify)?;
        let response = check_status(response).await?;

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Runtime(format!("Invalid tags response: {e}")))?;
        Ok(tags.models)
    }

    async fn pull_model(&self, name: &str) -> Result<(), BackendError> {
        info!(model = %name, "POST /api/pull");
        let response = self
            .http
            .post(self.url("/api/pull"))
            .json(&PullRequestBody {
                model: name,
                stream: false,
            })
            .send()
            .await
            .map_err(classify)?;
        let response = check_status(response).await?;

        let bytes = response.bytes().await.map_err(classify)?;
        if let ReplyShape::Structured(object) = ReplyShape::from_body(&bytes) {
            if let Some(err) = object.get("error").and_then(|e| e.as_str()) {
                return Err(BackendError::Runtime(err.to_string()));
            }
        }
        Ok(())
    }

    fn endpoint(&self) -> String {
        self.config.base_url.clone()
    }
}

/// Turn a non-success status into `BackendError::Status`; pass success through.
async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = error_message(&body);
    debug!(status = status.as_u16(), "Ollama returned {message}");

    Err(BackendError::Status {
        status: status.as_u16(),
        message,
    })
}

/// On `/api/chat` a 4xx means Ollama refused the generation parameters.
fn rejected_parameters(err: BackendError) -> BackendError {
    match err {
        BackendError::Status { status, message }
            if StatusCode::from_u16(status).is_ok_and(|s| s.is_client_error()) =>
        {
            BackendError::InvalidParameters(message)
        }
        other => other,
    }
}

fn classify(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else if err.is_connect() {
        BackendError::Unreachable(err.to_string())
    } else {
        BackendError::Runtime(err.to_string())
    }
}
