//! Generation request types: raw caller parameters and the validated request.

use serde::{Deserialize, Deserializer, Serialize};

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
/// Default nucleus sampling threshold.
pub const DEFAULT_TOP_P: f64 = 0.9;
/// Default top-k sampling cutoff.
pub const DEFAULT_TOP_K: i64 = 40;
/// Default maximum number of generated tokens.
pub const DEFAULT_NUM_PREDICT: i64 = 2048;
/// Default context window size.
pub const DEFAULT_NUM_CTX: i64 = 4096;
/// Default number of GPU layers.
pub const DEFAULT_NUM_GPU: i64 = 1;
/// Default number of CPU threads.
pub const DEFAULT_NUM_THREAD: i64 = 4;

/// Unvalidated parameters exactly as a caller supplied them.
///
/// Every field except `query` has a documented default, so a body of
/// `{"query": "..."}` deserializes into a complete value. Numeric fields are
/// signed on purpose: range checks belong to the normalizer, not to serde.
/// An explicit `null` for a text or flag field means the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    pub query: Option<String>,
    pub model: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub context: String,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: i64,
    pub num_predict: i64,
    /// Comma-separated stop sequences.
    #[serde(deserialize_with = "null_as_default")]
    pub stop: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stream: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub format: String,
    pub num_ctx: i64,
    pub num_gpu: i64,
    pub num_thread: i64,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            query: None,
            model: None,
            context: String::new(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
            num_predict: DEFAULT_NUM_PREDICT,
            stop: String::new(),
            stream: false,
            format: String::new(),
            num_ctx: DEFAULT_NUM_CTX,
            num_gpu: DEFAULT_NUM_GPU,
            num_thread: DEFAULT_NUM_THREAD,
        }
    }
}

impl QueryParams {
    /// Convenience constructor used by callers that only have a query.
    pub fn for_query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Generation options forwarded to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub num_ctx: i64,
    pub num_gpu: i64,
    pub num_thread: i64,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u64,
    pub num_predict: u64,
    /// Only present when at least one non-empty stop sequence was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
}

/// Role of a chat message sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

/// A single role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// A validated, sanitized request ready for the backend.
///
/// Only [`crate::services::RequestNormalizer`] builds these, so holding one
/// means every invariant (allowed model, numeric ranges, clean query) holds.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub query: String,
    pub context: String,
    pub options: GenerationOptions,
    pub stream: bool,
    /// Response-format hint, only set when the caller supplied one.
    pub format: Option<String>,
}

impl GenerationRequest {
    /// The ordered message list: system context first, then the user query.
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: ChatRole::System,
                content: self.context.clone(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: self.query.clone(),
            },
        ]
    }

    /// Parameters echoed back to the caller alongside the response.
    pub fn parameters(&self) -> RequestParameters {
        RequestParameters {
            model: self.model.clone(),
            temperature: self.options.temperature,
            top_p: self.options.top_p,
            top_k: self.options.top_k,
            num_predict: self.options.num_predict,
            stream: self.stream,
            context_length: self.options.num_ctx,
        }
    }
}

/// Echo of the effective request parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestParameters {
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u64,
    pub num_predict: u64,
    pub stream: bool,
    pub context_length: i64,
}

/// Successful result of one pass through the gateway pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub response: super::NormalizedResponse,
    pub parameters: RequestParameters,
}
