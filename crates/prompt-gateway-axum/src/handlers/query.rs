//! The generation endpoint.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use tracing::debug;

use prompt_gateway_core::{QueryParams, ValidationError};

use crate::dto::QueryResponse;
use crate::error::HttpError;
use crate::state::AppState;

/// `POST /query`.
///
/// The body is decoded here rather than through the `Json` extractor so a
/// malformed body produces the regular validation envelope.
pub async fn query(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<QueryResponse>, HttpError> {
    let params: QueryParams = serde_json::from_slice(&body).map_err(|e| {
        debug!("Rejecting undecodable query body: {e}");
        HttpError::from(ValidationError::MalformedBody(format!(
            "Invalid JSON body: {e}"
        )))
    })?;

    let outcome = state.gateway.generate(&params).await?;
    Ok(Json(outcome.into()))
}
