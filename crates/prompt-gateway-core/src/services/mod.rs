//! Services that make up the request pipeline and startup checks.

mod gateway;
mod normalizer;
mod readiness;
mod reconciler;

pub use gateway::GatewayService;
pub use normalizer::{RequestNormalizer, parse_stop_sequences, sanitize_query};
pub use readiness::{HealthReport, ModelSyncOutcome, ReadinessError, ReadinessProber, RetryPolicy};
pub use reconciler::{reconcile, reconcile_complete, reconcile_stream};
