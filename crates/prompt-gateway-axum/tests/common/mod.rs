//! Shared fixtures for prompt-gateway-axum tests.
//!
//! Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use futures_util::StreamExt;
use futures_util::stream;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use prompt_gateway_axum::{CorsConfig, GatewayContext, create_router};
use prompt_gateway_core::{
    BackendError, BackendReply, ChatChunk, GatewaySettings, GenerationRequest, InferenceBackend,
    ModelTag, ReplyShape,
};

/// Bearer token accepted by [`settings`].
pub const TEST_KEY: &str = "test-key-123";

/// Endpoint reported by the stub backend.
pub const STUB_ENDPOINT: &str = "http://stub-ollama:11434";

/// What the stub answers to `chat`.
#[derive(Clone)]
pub enum StubReply {
    Complete(Value),
    Stream(Vec<&'static str>),
    Fail(BackendError),
}

/// Hand-written backend double that records the last request.
pub struct StubBackend {
    reply: StubReply,
    healthy: bool,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl StubBackend {
    pub fn new(reply: StubReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            healthy: true,
            last_request: Mutex::new(None),
        })
    }

    pub fn unhealthy() -> Arc<Self> {
        Arc::new(Self {
            reply: StubReply::Fail(BackendError::Unreachable("refused".into())),
            healthy: false,
            last_request: Mutex::new(None),
        })
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceBackend for StubBackend {
    async fn chat(&self, request: &GenerationRequest) -> Result<BackendReply, BackendError> {
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.reply {
            StubReply::Complete(value) => Ok(BackendReply::Complete(ReplyShape::from_body(
                value.to_string().as_bytes(),
            ))),
            StubReply::Stream(fragments) => {
                let mut chunks: Vec<Result<ChatChunk, BackendError>> =
                    fragments.iter().map(|f| Ok(ChatChunk::text(*f))).collect();
                chunks.push(Ok(ChatChunk::finished()));
                Ok(BackendReply::Stream(stream::iter(chunks).boxed()))
            }
            StubReply::Fail(err) => Err(err.clone()),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelTag>, BackendError> {
        if self.healthy {
            Ok(vec![ModelTag::named("llama3:8b")])
        } else {
            Err(BackendError::Unreachable("refused".into()))
        }
    }

    async fn pull_model(&self, _name: &str) -> Result<(), BackendError> {
        Ok(())
    }

    fn endpoint(&self) -> String {
        STUB_ENDPOINT.to_string()
    }
}

/// Settings with one API key and two allowed models.
pub fn settings() -> GatewaySettings {
    GatewaySettings::from_lookup(|key| match key {
        "API_KEYS" => Some(format!(r#"[{{"appname":"TEST","key":"{TEST_KEY}"}}]"#)),
        "PROMPT_GATEWAY_ALLOWED_MODELS" => Some("llama3:8b,mistral:7b".to_string()),
        _ => None,
    })
    .unwrap()
}

pub fn router(backend: Arc<StubBackend>) -> Router {
    router_with_cors(backend, &CorsConfig::AllowAll)
}

pub fn router_with_cors(backend: Arc<StubBackend>, cors: &CorsConfig) -> Router {
    create_router(GatewayContext::new(settings(), backend), cors)
}

/// Build an authenticated `POST /query` request.
pub fn query_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/query")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {TEST_KEY}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send a request and collect status, headers and body.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body.to_vec())
}

/// Send a request and parse the body as JSON.
pub async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let (status, headers, body) = send(app, request).await;
    let json = serde_json::from_slice(&body)
        .unwrap_or_else(|e| panic!("body is not JSON ({e}): {}", String::from_utf8_lossy(&body)));
    (status, headers, json)
}
