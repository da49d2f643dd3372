//! Command-line front end for prompt-gateway.
//!
//! - `serve`: wait for Ollama, pull the allowed models and run the HTTP server
//! - `check`: standalone Ollama readiness check for container entrypoints
//! - `keygen`: generate an `API_KEYS` value

pub mod commands;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;

// Re-export primary types for convenient access
pub use commands::Commands;
pub use error::CliError;
pub use logging::LogLevel;
pub use parser::Cli;
