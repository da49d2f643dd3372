//! Server bootstrap - the composition root.
//!
//! This module is the ONLY place where the concrete Ollama client is wired
//! into the core services for the HTTP adapter.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use prompt_gateway_core::{
    GatewayService, GatewaySettings, InferenceBackend, ModelSyncOutcome, ReadinessProber,
    RequestNormalizer, RetryPolicy,
};
use prompt_gateway_ollama::{OllamaClient, OllamaConfig};

use crate::routes::create_router;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CorsConfig {
    /// Allow all origins, without credentials.
    #[default]
    AllowAll,
    /// Allow specific origins, with credentials.
    AllowOrigins(Vec<String>),
}

impl CorsConfig {
    /// `None` means any origin.
    pub fn from_origins(origins: Option<Vec<String>>) -> Self {
        origins.map_or(Self::AllowAll, Self::AllowOrigins)
    }
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port for the HTTP server.
    pub port: u16,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Startup readiness loop settings.
    pub readiness: RetryPolicy,
    /// Pull allowed models that the backend does not have yet.
    pub pull_models: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors: CorsConfig::default(),
            readiness: RetryPolicy::default(),
            pull_models: true,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application context for the Axum adapter.
pub struct GatewayContext {
    /// Settings snapshot taken at startup.
    pub settings: GatewaySettings,
    /// The request pipeline.
    pub gateway: GatewayService,
    /// Backend readiness checks.
    pub prober: ReadinessProber,
}

impl GatewayContext {
    /// Assemble the context over any backend implementation.
    pub fn new(settings: GatewaySettings, backend: Arc<dyn InferenceBackend>) -> Self {
        let normalizer = RequestNormalizer::new(settings.models.clone());
        Self {
            gateway: GatewayService::new(normalizer, Arc::clone(&backend)),
            prober: ReadinessProber::new(backend),
            settings,
        }
    }
}

/// Wire the Ollama client into the core services.
pub fn bootstrap(settings: GatewaySettings) -> Result<GatewayContext> {
    let http = reqwest::Client::builder()
        .pool_max_idle_per_host(10)
        .build()
        .context("Failed to build HTTP client")?;

    let config = OllamaConfig::new(settings.backend_url.clone())
        .with_generation_timeout(settings.generation_timeout);

    info!(
        backend = %config.base_url,
        allowed_models = %settings.models.allowed_models().join(", "),
        default_model = %settings.models.default_model(),
        api_keys = settings.api_keys.len(),
        generation_timeout_secs = ?settings.generation_timeout.map(|t| t.as_secs()),
        "Gateway bootstrap"
    );

    let backend: Arc<dyn InferenceBackend> = Arc::new(OllamaClient::with_client(http, config));
    Ok(GatewayContext::new(settings, backend))
}

/// Wait for the backend, then make sure the allowed models are present.
///
/// An unreachable backend is fatal; pull failures are only logged.
pub async fn prepare_backend(ctx: &GatewayContext, config: &ServerConfig) -> Result<()> {
    ctx.prober
        .wait_until_ready(&config.readiness)
        .await
        .context("Ollama did not become ready")?;

    if !config.pull_models {
        info!("Skipping model pull");
        return Ok(());
    }

    let outcomes = ctx
        .prober
        .ensure_models(ctx.settings.models.allowed_models())
        .await;
    for (model, outcome) in outcomes {
        match outcome {
            ModelSyncOutcome::Present | ModelSyncOutcome::Pulled => {
                info!(model = %model, "Model available");
            }
            ModelSyncOutcome::Failed(reason) | ModelSyncOutcome::Unchecked(reason) => {
                warn!(model = %model, "Model may be unavailable: {reason}");
            }
        }
    }
    Ok(())
}

/// Bootstrap, run the startup checks and serve until Ctrl-C.
pub async fn start_server(config: ServerConfig, settings: GatewaySettings) -> Result<()> {
    let ctx = bootstrap(settings)?;
    if ctx.settings.api_keys.is_empty() {
        warn!("No API keys configured; every /query request will be rejected");
    }

    prepare_backend(&ctx, &config).await?;

    let app = create_router(ctx, &config.cors);

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("prompt-gateway listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("prompt-gateway shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
