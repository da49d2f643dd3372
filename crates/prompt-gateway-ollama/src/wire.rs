//! Ollama request and response bodies.

use serde::{Deserialize, Serialize};

use prompt_gateway_core::{ChatMessage, GenerationOptions, GenerationRequest, ModelTag};

/// Body of `POST /api/chat`.
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequestBody<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
    pub options: &'a GenerationOptions,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'a str>,
}

impl<'a> From<&'a GenerationRequest> for ChatRequestBody<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            model: &request.model,
            messages: request.messages(),
            options: &request.options,
            stream: request.stream,
            format: request.format.as_deref(),
        }
    }
}

/// Body of `POST /api/pull`.
#[derive(Debug, Serialize)]
pub(crate) struct PullRequestBody<'a> {
    pub model: &'a str,
    pub stream: bool,
}

/// Response of `GET /api/tags`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

/// Error payload Ollama attaches to failed calls.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

/// Best-effort human message from an error response body.
pub(crate) fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body).map_or_else(
        |_| String::from_utf8_lossy(body).trim().to_string(),
        |parsed| parsed.error,
    )
}
