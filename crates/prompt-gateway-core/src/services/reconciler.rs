//! Response reconciliation: reduce any backend reply to a [`NormalizedResponse`].

use futures_util::TryStreamExt;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{BackendReply, ChunkStream, NormalizedResponse, ReplyShape};
use crate::ports::BackendError;

/// Reconcile a reply of either mode.
///
/// The non-streaming path never fails. The streaming path only fails when
/// the chunk stream itself reports an error.
pub async fn reconcile(
    reply: BackendReply,
    requested_model: &str,
) -> Result<NormalizedResponse, BackendError> {
    match reply {
        BackendReply::Complete(shape) => Ok(reconcile_complete(&shape, requested_model)),
        BackendReply::Stream(chunks) => reconcile_stream(chunks, requested_model).await,
    }
}

/// Drain a chunk stream and concatenate its fragments in arrival order.
pub async fn reconcile_stream(
    mut chunks: ChunkStream,
    requested_model: &str,
) -> Result<NormalizedResponse, BackendError> {
    let mut message = String::new();
    let mut received = 0usize;

    while let Some(chunk) = chunks.try_next().await? {
        if let Some(err) = chunk.error {
            return Err(BackendError::Runtime(err));
        }
        received += 1;
        if let Some(fragment) = chunk.fragment() {
            message.push_str(fragment);
        }
        if chunk.done {
            break;
        }
    }

    debug!(chunks = received, chars = message.len(), "Drained streaming reply");

    Ok(NormalizedResponse {
        message,
        model: requested_model.to_string(),
        created_at: None,
        done: true,
        parse_error: None,
    })
}

/// Reconcile a single non-streaming reply. Total over [`ReplyShape`].
pub fn reconcile_complete(shape: &ReplyShape, requested_model: &str) -> NormalizedResponse {
    match shape {
        ReplyShape::Opaque(text) => NormalizedResponse {
            message: text.clone(),
            model: requested_model.to_string(),
            created_at: None,
            done: true,
            parse_error: None,
        },
        ReplyShape::Structured(object) => match extract(object, requested_model) {
            Ok(response) => response,
            Err(fault) => {
                warn!(error = %fault, "Backend reply has an unexpected shape");
                NormalizedResponse {
                    message: format!("Response received but could not parse: {shape}"),
                    model: requested_model.to_string(),
                    created_at: None,
                    done: true,
                    parse_error: Some(fault),
                }
            }
        },
    }
}

fn extract(object: &Map<String, Value>, requested_model: &str) -> Result<NormalizedResponse, String> {
    let content = match object.get("message") {
        None | Some(Value::Null) => None,
        Some(Value::Object(message)) => optional_str(message, "message.content", "content")?,
        Some(other) => {
            return Err(format!(
                "field 'message' must be an object, got {}",
                type_name(other)
            ));
        }
    };

    let message = match content {
        Some(text) => text.to_string(),
        None => Value::Object(object.clone()).to_string(),
    };

    let model = optional_str(object, "model", "model")?
        .map_or_else(|| requested_model.to_string(), ToString::to_string);
    let created_at = optional_str(object, "created_at", "created_at")?.map(ToString::to_string);

    let done = match object.get("done") {
        None | Some(Value::Null) => true,
        Some(Value::Bool(done)) => *done,
        Some(other) => {
            return Err(format!(
                "field 'done' must be a boolean, got {}",
                type_name(other)
            ));
        }
    };

    Ok(NormalizedResponse {
        message,
        model,
        created_at,
        done,
        parse_error: None,
    })
}

/// Read an optional string field; a present non-string value is a fault.
fn optional_str<'a>(
    object: &'a Map<String, Value>,
    label: &str,
    key: &str,
) -> Result<Option<&'a str>, String> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(format!(
            "field '{label}' must be a string, got {}",
            type_name(other)
        )),
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
