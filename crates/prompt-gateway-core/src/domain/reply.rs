//! Backend reply shapes and the normalized response envelope.

use std::fmt;

use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ports::BackendError;

/// Stream of incremental chunks from a streaming generation call.
pub type ChunkStream = BoxStream<'static, Result<ChatChunk, BackendError>>;

/// What the backend handed back for one generation call.
pub enum BackendReply {
    /// Non-streaming mode: exactly one reply.
    Complete(ReplyShape),
    /// Streaming mode: chunks in arrival order.
    Stream(ChunkStream),
}

impl fmt::Debug for BackendReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete(shape) => f.debug_tuple("Complete").field(shape).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A non-streaming reply body.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyShape {
    /// The body was a JSON object.
    Structured(Map<String, Value>),
    /// Anything else, kept as text.
    Opaque(String),
}

impl ReplyShape {
    /// Classify a raw response body.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Self::Structured(map),
            _ => Self::Opaque(String::from_utf8_lossy(body).into_owned()),
        }
    }
}

impl fmt::Display for ReplyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured(map) => {
                let rendered = serde_json::to_string(map).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
            Self::Opaque(text) => f.write_str(text),
        }
    }
}

/// Message payload inside a streamed chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// One incremental unit of a streamed generation reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatChunk {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub message: Option<ChunkMessage>,
    #[serde(default)]
    pub done: bool,
    /// Set when the backend aborts generation mid-stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatChunk {
    /// Build a content-carrying chunk.
    pub fn text(fragment: impl Into<String>) -> Self {
        Self {
            message: Some(ChunkMessage {
                role: Some("assistant".to_string()),
                content: Some(fragment.into()),
            }),
            ..Self::default()
        }
    }

    /// Build the terminal chunk.
    pub fn finished() -> Self {
        Self {
            done: true,
            ..Self::default()
        }
    }

    /// Text fragment carried by this chunk, if any.
    pub fn fragment(&self) -> Option<&str> {
        self.message.as_ref()?.content.as_deref()
    }
}

/// The uniform envelope returned to callers regardless of reply mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResponse {
    pub message: String,
    pub model: String,
    pub created_at: Option<String>,
    pub done: bool,
    /// Present only when the reply shape could not be interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}
