//! Exercises the Ollama client against an in-process server that plays Ollama.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use prompt_gateway_core::{
    BackendError, BackendReply, InferenceBackend, ModelPolicy, QueryParams, ReadinessProber,
    RequestNormalizer, reconcile,
};
use prompt_gateway_ollama::{OllamaClient, OllamaConfig};

async fn chat(Json(body): Json<Value>) -> Response {
    let user = body["messages"][1]["content"].as_str().unwrap_or_default();

    match user {
        "reject me" => (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid options"})),
        )
            .into_response(),
        "crash" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "runner died"})),
        )
            .into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Json(json!({"message": {"content": "late"}})).into_response()
        }
        _ if body["stream"] == true => {
            let lines = [
                r#"{"model":"llama3:8b","message":{"role":"assistant","content":"Hel"},"done":false}"#,
                r#"{"model":"llama3:8b","message":{"role":"assistant","content":"lo, "},"done":false}"#,
                r#"{"model":"llama3:8b","message":{"role":"assistant","content":"world"},"done":false}"#,
                r#"{"model":"llama3:8b","message":{"role":"assistant","content":""},"done":true}"#,
            ];
            let ndjson = lines.join("\n") + "\n";
            Response::builder()
                .header("content-type", "application/x-ndjson")
                .body(Body::from(ndjson))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        _ => Json(json!({
            "model": body["model"],
            "created_at": "2024-05-01T12:00:00Z",
            "message": {"role": "assistant", "content": format!("echo: {user}")},
            "done": true,
        }))
        .into_response(),
    }
}

async fn tags() -> Json<Value> {
    Json(json!({
        "models": [
            {"name": "llama3:8b", "model": "llama3:8b", "size": 4661224676u64, "digest": "abc"}
        ]
    }))
}

async fn pull(Json(body): Json<Value>) -> Response {
    if body["model"] == "missing:latest" {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "pull model manifest: file does not exist"})),
        )
            .into_response()
    } else {
        Json(json!({"status": "success"})).into_response()
    }
}

async fn spawn_fake_ollama() -> SocketAddr {
    let app = Router::new()
        .route("/api/chat", post(chat))
        .route("/api/tags", get(tags))
        .route("/api/pull", post(pull));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn client() -> OllamaClient {
    let addr = spawn_fake_ollama().await;
    OllamaClient::new(OllamaConfig::new(format!("http://{addr}")))
}

fn request(query: &str, stream: bool) -> prompt_gateway_core::GenerationRequest {
    let mut raw = QueryParams::for_query(query);
    raw.stream = stream;
    RequestNormalizer::new(ModelPolicy::default())
        .normalize(&raw)
        .unwrap()
}

#[tokio::test]
async fn non_streaming_chat_returns_structured_reply() {
    let client = client().await;
    let reply = client.chat(&request("Hello", false)).await.unwrap();
    assert!(matches!(reply, BackendReply::Complete(_)));

    let response = reconcile(reply, "llama3:8b").await.unwrap();
    assert_eq!(response.message, "echo: Hello");
    assert_eq!(response.model, "llama3:8b");
    assert_eq!(response.created_at.as_deref(), Some("2024-05-01T12:00:00Z"));
}

#[tokio::test]
async fn streaming_chat_concatenates_chunks() {
    let client = client().await;
    let reply = client.chat(&request("Hello", true)).await.unwrap();
    assert!(matches!(reply, BackendReply::Stream(_)));

    let response = reconcile(reply, "llama3:8b").await.unwrap();
    assert_eq!(response.message, "Hello, world");
    assert_eq!(response.created_at, None);
    assert!(response.done);
}

#[tokio::test]
async fn client_error_status_is_invalid_parameters() {
    let client = client().await;
    let err = client.chat(&request("reject me", false)).await.unwrap_err();
    assert_eq!(err, BackendError::InvalidParameters("invalid options".into()));
}

#[tokio::test]
async fn server_error_status_is_status() {
    let client = client().await;
    let err = client.chat(&request("crash", false)).await.unwrap_err();
    assert_eq!(
        err,
        BackendError::Status {
            status: 500,
            message: "runner died".into()
        }
    );
}

#[tokio::test]
async fn generation_timeout_maps_to_timeout() {
    let addr = spawn_fake_ollama().await;
    let client = OllamaClient::new(
        OllamaConfig::new(format!("http://{addr}"))
            .with_generation_timeout(Some(Duration::from_millis(50))),
    );

    let err = client.chat(&request("slow", false)).await.unwrap_err();
    assert_eq!(err, BackendError::Timeout);
}

#[tokio::test]
async fn tags_and_pull() {
    let client = client().await;

    let models = client.list_models().await.unwrap();
    assert_eq!(models.len(), 1);
    assert_eq!(models[0].name, "llama3:8b");

    client.pull_model("mistral:7b").await.unwrap();
    let err = client.pull_model("missing:latest").await.unwrap_err();
    assert!(matches!(err, BackendError::Status { status: 500, .. }));
}

#[tokio::test]
async fn unreachable_backend() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = OllamaClient::new(OllamaConfig::new(format!("http://{addr}")));
    let err = client.list_models().await.unwrap_err();
    assert!(matches!(err, BackendError::Unreachable(_)), "got {err:?}");
}

#[tokio::test]
async fn missing_tags_endpoint_reports_status_code() {
    let addr = spawn_fake_ollama().await;
    let client = OllamaClient::new(OllamaConfig::new(format!("http://{addr}/not-ollama")));

    let err = client.list_models().await.unwrap_err();
    assert!(
        matches!(err, BackendError::Status { status: 404, .. }),
        "got {err:?}"
    );

    let report = ReadinessProber::new(Arc::new(client)).probe().await;
    assert!(!report.healthy);
    assert_eq!(report.message, "Ollama responded with status code: 404");
}
