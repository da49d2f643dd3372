//! Gateway settings and the model policy.
//!
//! Settings are read once at startup from the process environment (after the
//! binary has loaded `.env`) and are immutable afterwards.

use std::time::Duration;

use thiserror::Error;

use crate::credentials::ApiKeys;
use crate::error::ValidationError;

/// Model used when the caller leaves `model` blank.
pub const DEFAULT_MODEL: &str = "llama3:8b";

/// Backend location used when `OLLAMA_HOST` is unset.
pub const DEFAULT_BACKEND_URL: &str = "http://host.docker.internal:11434";

pub const ENV_API_KEYS: &str = "API_KEYS";
pub const ENV_BACKEND_URL: &str = "OLLAMA_HOST";
pub const ENV_ALLOWED_MODELS: &str = "PROMPT_GATEWAY_ALLOWED_MODELS";
pub const ENV_DEFAULT_MODEL: &str = "PROMPT_GATEWAY_DEFAULT_MODEL";
pub const ENV_GENERATION_TIMEOUT: &str = "PROMPT_GATEWAY_GENERATION_TIMEOUT_SECS";
pub const ENV_CORS_ORIGINS: &str = "PROMPT_GATEWAY_CORS_ORIGINS";

/// Settings validation error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Model allow-list must not be empty")]
    EmptyAllowList,

    #[error("Default model '{model}' is not in the allow-list ({allowed})")]
    DefaultModelNotAllowed { model: String, allowed: String },

    #[error("Invalid generation timeout '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),
}

/// The fixed set of models callers may request, plus the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPolicy {
    default_model: String,
    allowed_models: Vec<String>,
}

impl ModelPolicy {
    /// Build a policy. The default must itself be allowed.
    pub fn new(
        default_model: impl Into<String>,
        allowed_models: Vec<String>,
    ) -> Result<Self, SettingsError> {
        let default_model = default_model.into();
        if allowed_models.is_empty() {
            return Err(SettingsError::EmptyAllowList);
        }
        if !allowed_models.contains(&default_model) {
            return Err(SettingsError::DefaultModelNotAllowed {
                model: default_model,
                allowed: allowed_models.join(", "),
            });
        }
        Ok(Self {
            default_model,
            allowed_models,
        })
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn allowed_models(&self) -> &[String] {
        &self.allowed_models
    }

    pub fn is_allowed(&self, model: &str) -> bool {
        self.allowed_models.iter().any(|m| m == model)
    }

    /// Resolve a requested model: blank means default, otherwise it must be allowed.
    pub fn resolve(&self, requested: Option<&str>) -> Result<String, ValidationError> {
        match requested {
            None => Ok(self.default_model.clone()),
            Some(name) if name.trim().is_empty() => Ok(self.default_model.clone()),
            Some(name) if self.is_allowed(name) => Ok(name.to_string()),
            Some(_) => Err(ValidationError::ModelNotAllowed {
                allowed: self.allowed_models.join(", "),
            }),
        }
    }
}

impl Default for ModelPolicy {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            allowed_models: vec![DEFAULT_MODEL.to_string()],
        }
    }
}

/// Everything the gateway needs from its environment.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub api_keys: ApiKeys,
    pub backend_url: String,
    pub models: ModelPolicy,
    /// Optional deadline for a single generation call; `None` waits indefinitely.
    pub generation_timeout: Option<Duration>,
    /// Explicit CORS origins; `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl GatewaySettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_keys = lookup(ENV_API_KEYS)
            .map(|raw| ApiKeys::from_json(&raw))
            .unwrap_or_default();

        let backend_url = lookup(ENV_BACKEND_URL)
            .map(|raw| normalize_backend_url(&raw))
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let allowed_models = lookup(ENV_ALLOWED_MODELS)
            .map(|raw| split_list(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_MODEL.to_string()]);

        let default_model = lookup(ENV_DEFAULT_MODEL)
            .map(|raw| raw.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let generation_timeout = lookup(ENV_GENERATION_TIMEOUT)
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_timeout(&raw))
            .transpose()?;

        let cors_origins = lookup(ENV_CORS_ORIGINS)
            .map(|raw| split_list(&raw))
            .filter(|list| !list.is_empty());

        Ok(Self {
            api_keys,
            backend_url,
            models: ModelPolicy::new(default_model, allowed_models)?,
            generation_timeout,
            cors_origins,
        })
    }
}

/// Accept `host:port` as well as full URLs; strip trailing slashes.
fn normalize_backend_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_timeout(raw: &str) -> Result<Duration, SettingsError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(SettingsError::InvalidTimeout(raw.to_string())),
    }
}
