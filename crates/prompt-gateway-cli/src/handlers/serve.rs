//! Serve command handler.

use prompt_gateway_axum::{CorsConfig, ServerConfig, start_server};
use prompt_gateway_core::GatewaySettings;

use crate::error::CliError;

/// Execute the serve command.
///
/// Blocks until the server shuts down.
pub async fn execute(host: String, port: u16, skip_model_pull: bool) -> Result<(), CliError> {
    let settings = GatewaySettings::from_env()?;

    let config = ServerConfig {
        host,
        port,
        cors: CorsConfig::from_origins(settings.cors_origins.clone()),
        pull_models: !skip_model_pull,
        ..ServerConfig::default()
    };

    start_server(config, settings)
        .await
        .map_err(|e| CliError::Server(format!("{e:#}")))
}
