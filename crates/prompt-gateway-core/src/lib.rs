//! Core domain types, ports and services for prompt-gateway.
//!
//! This crate holds the decision logic of the gateway: credential checks,
//! request normalization, backend reply reconciliation and the startup
//! readiness loop. It knows nothing about HTTP servers or the concrete
//! inference backend; those live behind the [`ports::InferenceBackend`] port.

pub mod credentials;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use credentials::{ApiKeys, AuthError, CredentialValidator, KeyEntry, generate_api_key};
pub use domain::{
    BackendReply, ChatChunk, ChatMessage, ChatRole, ChunkStream, GenerationOptions,
    GenerationOutcome, GenerationRequest, NormalizedResponse, QueryParams, ReplyShape,
    RequestParameters,
};
pub use error::{GatewayError, ValidationError};
pub use ports::{BackendError, InferenceBackend, ModelTag};
pub use services::{
    GatewayService, HealthReport, ModelSyncOutcome, ReadinessError, ReadinessProber,
    RequestNormalizer, RetryPolicy, reconcile, reconcile_complete, reconcile_stream, sanitize_query,
};
pub use settings::{DEFAULT_MODEL, GatewaySettings, ModelPolicy, SettingsError};
