//! Route definitions and router construction.

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::require_api_key;
use crate::bootstrap::{CorsConfig, GatewayContext};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
///
/// Credentials are only allowed together with an explicit origin list.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        ]);

    match config {
        CorsConfig::AllowAll => base.allow_origin(Any),
        CorsConfig::AllowOrigins(origins) => {
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            base.allow_origin(allowed).allow_credentials(true)
        }
    }
}

/// Create the gateway router.
///
/// Only `/query` sits behind the bearer-auth layer; the probes are public.
pub fn create_router(ctx: GatewayContext, cors_config: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);
    let auth = middleware::from_fn_with_state(state.clone(), require_api_key);

    Router::new()
        .route("/query", post(handlers::query::query).route_layer(auth))
        .route("/up", get(handlers::health::up))
        .route("/echo", get(handlers::health::echo))
        .route("/health/ollama", get(handlers::health::ollama))
        .with_state(state)
        .layer(build_cors_layer(cors_config))
        .layer(TraceLayer::new_for_http())
}
