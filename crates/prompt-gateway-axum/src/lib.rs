//! Axum HTTP adapter for prompt-gateway.
//!
//! Exposes the gateway over HTTP:
//!
//! - `POST /query`: bearer-authenticated generation endpoint
//! - `GET /up` and `GET /echo`: liveness probes
//! - `GET /health/ollama`: single backend health probe
//!
//! [`bootstrap`] is the composition root that wires the Ollama client into
//! the core services; [`create_router`] builds the router over the result.

pub mod auth;
pub mod bootstrap;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export primary types
pub use bootstrap::{
    CorsConfig, GatewayContext, ServerConfig, bootstrap, prepare_backend, start_server,
};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
