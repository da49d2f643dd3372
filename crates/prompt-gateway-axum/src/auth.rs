//! Bearer-token authentication middleware.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;

use prompt_gateway_core::AuthError;
use prompt_gateway_core::credentials::authorize;

use crate::error::HttpError;
use crate::state::AppState;

/// Auth middleware: validate `Authorization: Bearer <token>` against the
/// configured API keys.
///
/// Returns 401 with `WWW-Authenticate: Bearer` on failure. A header that is
/// not valid visible ASCII is treated as a malformed scheme.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let auth = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().map_err(|_| AuthError::InvalidScheme))
        .transpose();

    match auth.and_then(|h| authorize(h, &state.settings.api_keys)) {
        Ok(()) => Ok(next.run(req).await),
        Err(e) => {
            tracing::warn!(
                path = %req.uri().path(),
                reason = %e,
                "Unauthorized request"
            );
            Err(e.into())
        }
    }
}
