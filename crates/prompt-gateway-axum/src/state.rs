//! Shared application state type.

use crate::bootstrap::GatewayContext;
use std::sync::Arc;

/// Application state shared across all handlers and middleware.
///
/// The context is immutable after bootstrap, so handlers share it freely.
pub type AppState = Arc<GatewayContext>;
