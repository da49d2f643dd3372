//! Check command handler.

use std::time::Duration;

use prompt_gateway_axum::bootstrap;
use prompt_gateway_core::{GatewaySettings, RetryPolicy};
use tracing::{error, info};

use crate::error::CliError;

/// Execute the check command.
pub async fn execute(retries: u32, delay: u64) -> Result<(), CliError> {
    let settings = GatewaySettings::from_env()?;
    let endpoint = settings.backend_url.clone();
    let ctx = bootstrap(settings).map_err(|e| CliError::Config(format!("{e:#}")))?;

    let policy = RetryPolicy {
        max_attempts: retries,
        delay: Duration::from_secs(delay),
    };

    info!(endpoint = %endpoint, "Checking Ollama connectivity");

    match ctx.prober.wait_until_ready(&policy).await {
        Ok(()) => {
            info!("Ollama is ready");
            Ok(())
        }
        Err(e) => {
            error!("{e}");
            for (i, tip) in troubleshooting_tips(&endpoint).iter().enumerate() {
                error!("  {}. {tip}", i + 1);
            }
            Err(CliError::NotReady(e.to_string()))
        }
    }
}

fn troubleshooting_tips(endpoint: &str) -> [String; 4] {
    let authority = endpoint
        .split_once("://")
        .map_or(endpoint, |(_, rest)| rest)
        .trim_end_matches('/');

    [
        "Ensure Ollama is running on the host machine: ollama serve".to_string(),
        format!("Check that this host can reach {authority}"),
        "Verify the Docker network configuration allows host access".to_string(),
        format!("Try running: curl {endpoint}/api/tags"),
    ]
}
