//! Inference backend port.
//!
//! The gateway talks to exactly one backend through this trait: a chat-style
//! generation call, a model listing (used for health and presence checks)
//! and a model pull used at startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{BackendReply, GenerationRequest};

/// A model the backend reports as locally available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTag {
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub modified_at: Option<String>,
}

impl ModelTag {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size: None,
            modified_at: None,
        }
    }
}

/// Errors surfaced by a backend call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// Connection refused, DNS failure or other transport fault.
    #[error("Cannot connect to backend: {0}")]
    Unreachable(String),

    /// The request did not complete within its deadline.
    #[error("Backend request timed out")]
    Timeout,

    /// The backend answered with an error status it did not attribute to the
    /// caller's parameters.
    #[error("Backend responded with status {status}: {message}")]
    Status { status: u16, message: String },

    /// The backend rejected the request parameters.
    #[error("Backend rejected request parameters: {0}")]
    InvalidParameters(String),

    /// The backend or the client layer failed while producing a reply.
    #[error("Backend runtime error: {0}")]
    Runtime(String),
}

/// Port for the large-language-model inference service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Issue one generation call. Streaming is selected by `request.stream`.
    async fn chat(&self, request: &GenerationRequest) -> Result<BackendReply, BackendError>;

    /// List models currently available on the backend.
    async fn list_models(&self) -> Result<Vec<ModelTag>, BackendError>;

    /// Fetch a model onto the backend, waiting until the pull finishes.
    async fn pull_model(&self, name: &str) -> Result<(), BackendError>;

    /// Human-readable location of the backend (for diagnostics).
    fn endpoint(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_tag_tolerates_extra_fields() {
        let tag: ModelTag = serde_json::from_str(
            r#"{"name":"llama3:8b","model":"llama3:8b","size":4661224676,"digest":"abc"}"#,
        )
        .unwrap();
        assert_eq!(tag.name, "llama3:8b");
        assert_eq!(tag.size, Some(4_661_224_676));
    }
}
