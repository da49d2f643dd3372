//! CLI-specific error types and exit codes.

use prompt_gateway_core::SettingsError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid environment configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ollama never became ready.
    #[error("Ollama is not ready: {0}")]
    NotReady(String),

    /// The server failed to start or stopped with an error.
    #[error("Server error: {0}")]
    Server(String),

    /// Output could not be produced.
    #[error("{0}")]
    Output(String),
}

impl CliError {
    /// Map error to a process exit code.
    ///
    /// A failed readiness check exits with 1 so container entrypoints can
    /// branch on it; configuration problems use `EX_CONFIG`.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::NotReady(_) | Self::Server(_) | Self::Output(_) => 1,
            Self::Config(_) => 78, // EX_CONFIG
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::NotReady("x".into()).exit_code(), 1);
        assert_eq!(CliError::from(SettingsError::EmptyAllowList).exit_code(), 78);
    }
}
