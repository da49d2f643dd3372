//! Ollama adapter for prompt-gateway.
//!
//! Implements [`prompt_gateway_core::InferenceBackend`] over Ollama's HTTP API:
//! `POST /api/chat` for generation (single object or NDJSON stream),
//! `GET /api/tags` for health and presence checks, and `POST /api/pull`.

mod client;
mod stream;
mod wire;

pub use client::{OllamaClient, OllamaConfig};
