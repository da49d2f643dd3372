//! HTTP error type and the mapping from gateway errors to responses.
//!
//! Every error body has the shape `{"message": <summary>, "error": <detail>}`;
//! backend outages add a `details` field.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use prompt_gateway_core::{AuthError, GatewayError, ValidationError};

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Missing or rejected credentials.
    #[error("Authentication Error: {0}")]
    Unauthorized(String),

    /// Request failed validation (including an undecodable body).
    #[error("Validation Error: {0}")]
    Validation(String),

    /// The backend rejected the request parameters.
    #[error("Invalid request parameters: {0}")]
    InvalidParameters(String),

    /// The backend could not be reached.
    #[error("Ollama service is not available: {error}")]
    ServiceUnavailable { error: String, details: String },

    /// Backend runtime fault or anything unclassified.
    #[error("Ollama runtime error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    message: &'static str,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl HttpError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::InvalidParameters(_) => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn summary(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "Authentication Error",
            Self::Validation(_) => "Validation Error",
            Self::InvalidParameters(_) => "Invalid request parameters",
            Self::ServiceUnavailable { .. } => "Ollama service is not available",
            Self::Internal(_) => "Ollama runtime error",
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.summary();
        let unauthorized = matches!(self, Self::Unauthorized(_));

        let (error, details) = match self {
            Self::Unauthorized(msg)
            | Self::Validation(msg)
            | Self::InvalidParameters(msg)
            | Self::Internal(msg) => (msg, None),
            Self::ServiceUnavailable { error, details } => (error, Some(details)),
        };

        let mut response = (
            status,
            axum::Json(ErrorBody {
                message,
                error,
                details,
            }),
        )
            .into_response();

        if unauthorized {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<GatewayError> for HttpError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Authentication(e) => e.into(),
            GatewayError::Validation(e) => e.into(),
            GatewayError::BackendUnavailable { error, details } => {
                Self::ServiceUnavailable { error, details }
            }
            GatewayError::BackendRejection(msg) => Self::InvalidParameters(msg),
            GatewayError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<AuthError> for HttpError {
    fn from(err: AuthError) -> Self {
        Self::Unauthorized(err.to_string())
    }
}

impl From<ValidationError> for HttpError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
