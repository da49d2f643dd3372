//! Backend readiness: health probing, bounded startup waiting and model presence.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ports::{BackendError, InferenceBackend, ModelTag};

/// Deadline for a single health probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Deadline for the model listing used by presence checks.
pub const LISTING_TIMEOUT: Duration = Duration::from_secs(10);

/// How long and how often to wait for the backend at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(2),
        }
    }
}

/// Result of a single health probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub healthy: bool,
    pub message: String,
}

impl HealthReport {
    fn up() -> Self {
        Self {
            healthy: true,
            message: "Ollama is running and accessible".to_string(),
        }
    }

    fn down(message: String) -> Self {
        Self {
            healthy: false,
            message,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("Backend not ready after {attempts} attempts: {message}")]
    Exhausted { attempts: u32, message: String },
}

/// What happened to one required model during startup sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSyncOutcome {
    /// Already present on the backend.
    Present,
    /// Missing and pulled successfully.
    Pulled,
    /// Missing and the pull failed.
    Failed(String),
    /// Presence could not be determined.
    Unchecked(String),
}

/// Probes the backend and drives the startup readiness loop.
#[derive(Clone)]
pub struct ReadinessProber {
    backend: Arc<dyn InferenceBackend>,
}

impl ReadinessProber {
    pub fn new(backend: Arc<dyn InferenceBackend>) -> Self {
        Self { backend }
    }

    /// One health probe. Never fails; unhealthy states are reported in the result.
    pub async fn probe(&self) -> HealthReport {
        match self.list_models_within(PROBE_TIMEOUT).await {
            Ok(_) => HealthReport::up(),
            Err(BackendError::Unreachable(_)) => HealthReport::down(format!(
                "Cannot connect to Ollama. Is it running on {}?",
                self.backend.endpoint()
            )),
            Err(BackendError::Timeout) => {
                HealthReport::down("Connection to Ollama timed out".to_string())
            }
            Err(BackendError::Status { status, .. }) => {
                HealthReport::down(format!("Ollama responded with status code: {status}"))
            }
            Err(e) => HealthReport::down(format!("Request error checking Ollama health: {e}")),
        }
    }

    /// Probe until healthy or the attempt budget runs out.
    ///
    /// Sleeps `policy.delay` between attempts but not after the last one.
    /// At least one attempt is always made.
    pub async fn wait_until_ready(&self, policy: &RetryPolicy) -> Result<(), ReadinessError> {
        let attempts = policy.max_attempts.max(1);
        let mut last = String::new();

        for attempt in 1..=attempts {
            let report = self.probe().await;
            if report.healthy {
                info!(attempt, "Ollama is ready");
                return Ok(());
            }

            warn!(
                attempt,
                max_attempts = attempts,
                "Ollama not ready: {}",
                report.message
            );
            last = report.message;

            if attempt < attempts {
                tokio::time::sleep(policy.delay).await;
            }
        }

        Err(ReadinessError::Exhausted {
            attempts,
            message: last,
        })
    }

    /// Make sure each required model is available, pulling the missing ones.
    ///
    /// Failures are reported per model and never abort the sync.
    pub async fn ensure_models(&self, required: &[String]) -> Vec<(String, ModelSyncOutcome)> {
        let present: HashSet<String> = match self.list_models_within(LISTING_TIMEOUT).await {
            Ok(tags) => tags.into_iter().map(|t| t.name).collect(),
            Err(e) => {
                warn!("Could not list models on Ollama: {e}");
                return required
                    .iter()
                    .map(|m| (m.clone(), ModelSyncOutcome::Unchecked(e.to_string())))
                    .collect();
            }
        };

        let mut outcomes = Vec::with_capacity(required.len());
        for model in required {
            let outcome = if present.contains(model) {
                debug!(model = %model, "Model already present");
                ModelSyncOutcome::Present
            } else {
                info!(model = %model, "Pulling model");
                match self.backend.pull_model(model).await {
                    Ok(()) => {
                        info!(model = %model, "Model pulled");
                        ModelSyncOutcome::Pulled
                    }
                    Err(e) => {
                        warn!(model = %model, "Failed to pull model: {e}");
                        ModelSyncOutcome::Failed(e.to_string())
                    }
                }
            };
            outcomes.push((model.clone(), outcome));
        }
        outcomes
    }

    async fn list_models_within(&self, deadline: Duration) -> Result<Vec<ModelTag>, BackendError> {
        tokio::time::timeout(deadline, self.backend.list_models())
            .await
            .unwrap_or(Err(BackendError::Timeout))
    }
}
