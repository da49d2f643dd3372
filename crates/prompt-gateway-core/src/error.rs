//! Error taxonomy for the gateway pipeline.

use thiserror::Error;

use crate::credentials::AuthError;
use crate::ports::BackendError;

/// Input that failed validation. Display strings are the user-facing text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("query is required")]
    QueryRequired,

    #[error("Invalid model. Allowed models: {allowed}")]
    ModelNotAllowed { allowed: String },

    /// Path-traversal guard.
    #[error("Invalid query")]
    InvalidQuery,

    /// Shell metacharacter guard.
    #[error("Invalid characters in query")]
    InvalidCharacters,

    #[error("temperature must be between 0.0 and 2.0")]
    TemperatureOutOfRange,

    #[error("top_p must be between 0.0 and 1.0")]
    TopPOutOfRange,

    #[error("top_k must be non-negative")]
    NegativeTopK,

    #[error("num_predict must be non-negative")]
    NegativeNumPredict,

    /// The request body itself could not be decoded.
    #[error("{0}")]
    MalformedBody(String),
}

/// Errors that terminate a gateway request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Missing header, wrong scheme or unknown token.
    #[error(transparent)]
    Authentication(#[from] AuthError),

    /// Malformed, out-of-range or disallowed input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend could not be reached during the request.
    #[error("{error}")]
    BackendUnavailable { error: String, details: String },

    /// The backend refused the request parameters.
    #[error("{0}")]
    BackendRejection(String),

    /// Backend runtime fault or any unclassified failure.
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    /// Map a backend failure into the taxonomy.
    ///
    /// `endpoint` names the backend location for the user-facing message.
    pub fn from_backend(err: BackendError, endpoint: &str) -> Self {
        match err {
            BackendError::Unreachable(_) | BackendError::Timeout | BackendError::Status { .. } => {
                Self::BackendUnavailable {
                    error: format!(
                        "Cannot connect to Ollama. Please ensure it is running on {endpoint}"
                    ),
                    details: err.to_string(),
                }
            }
            BackendError::InvalidParameters(msg) => Self::BackendRejection(msg),
            BackendError::Runtime(msg) => Self::Internal(msg),
        }
    }

    /// Returns a suggested HTTP status code for this error.
    #[must_use]
    pub const fn suggested_status_code(&self) -> u16 {
        match self {
            Self::Authentication(_) => 401,
            Self::Validation(_) | Self::BackendRejection(_) => 400,
            Self::BackendUnavailable { .. } => 503,
            Self::Internal(_) => 500,
        }
    }

    /// Short summary used as the `message` field of error envelopes.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "Authentication Error",
            Self::Validation(_) => "Validation Error",
            Self::BackendUnavailable { .. } => "Ollama service is not available",
            Self::BackendRejection(_) => "Invalid request parameters",
            Self::Internal(_) => "Ollama runtime error",
        }
    }
}
