//! Response bodies.

use serde::{Deserialize, Serialize};

use prompt_gateway_core::{GenerationOutcome, HealthReport, NormalizedResponse, RequestParameters};

/// Success envelope for `POST /query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub message: String,
    pub response: NormalizedResponse,
    pub parameters: RequestParameters,
}

impl From<GenerationOutcome> for QueryResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        Self {
            message: "Success".to_string(),
            response: outcome.response,
            parameters: outcome.parameters,
        }
    }
}

/// Body of `GET /health/ollama`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendHealthResponse {
    pub status: String,
    pub message: String,
}

impl From<HealthReport> for BackendHealthResponse {
    fn from(report: HealthReport) -> Self {
        let status = if report.healthy { "healthy" } else { "unhealthy" };
        Self {
            status: status.to_string(),
            message: report.message,
        }
    }
}
