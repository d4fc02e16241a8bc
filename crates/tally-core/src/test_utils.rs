//! Test utilities for tally-core
//!
//! This module provides a mock OpenAI-compatible chat server that can be used
//! for development and integration tests of the narrative backends.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::question::route_question;

pub use axum::http::StatusCode;

/// What the mock server saw in the most recent chat request
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub system_message: Option<String>,
    pub user_message: String,
    pub authorization: Option<String>,
}

#[derive(Clone, Default)]
struct ServerState {
    requests: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<RecordedRequest>>>,
    failing_status: Option<StatusCode>,
}

/// Mock chat-completions server for testing and development
pub struct MockChatServer {
    addr: SocketAddr,
    state: ServerState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockChatServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::start_with(ServerState::default()).await
    }

    /// Start a server whose chat endpoint always answers with `status`
    pub async fn start_failing(status: StatusCode) -> Self {
        Self::start_with(ServerState {
            failing_status: Some(status),
            ..ServerState::default()
        })
        .await
    }

    async fn start_with(state: ServerState) -> Self {
        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of chat completion requests received
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// The most recent chat completion request
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.last_request.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Model list endpoint (health check)
async fn handle_models() -> Json<ModelsResponse> {
    Json(ModelsResponse {
        object: "list".to_string(),
        data: vec![ModelInfo {
            id: "mock-model".to_string(),
            object: "model".to_string(),
        }],
    })
}

async fn handle_chat(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let message = |role: &str| {
        request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == role)
            .map(|m| m.content.clone())
    };
    let user_message = message("user").unwrap_or_default();
    let recorded = RecordedRequest {
        model: request.model.clone(),
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        system_message: message("system"),
        user_message: user_message.clone(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    *state.last_request.lock().unwrap() = Some(recorded);

    if let Some(status) = state.failing_status {
        return (status, "mock failure").into_response();
    }

    // These patterns match the prompt files in prompts/*.md
    let content = if let Some(question) = quoted_after(&user_message, "Question: \"") {
        route_question(&question)
            .map(|kind| kind.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    } else if let Some(analysis) = quoted_after(&user_message, "results of a \"") {
        format!(
            "Summary of the {} analysis: the figures look reasonable. Keep tracking your spending each month.",
            analysis
        )
    } else {
        "I can only help with financial analyses.".to_string()
    };

    Json(ChatResponse {
        model: request.model,
        choices: vec![Choice {
            index: 0,
            message: ResponseMessage {
                role: "assistant".to_string(),
                content,
            },
            finish_reason: "stop".to_string(),
        }],
    })
    .into_response()
}

/// Text between `marker` and the next double quote
fn quoted_after(text: &str, marker: &str) -> Option<String> {
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

// Request/Response types for the mock server

#[derive(Debug, Serialize)]
struct ModelsResponse {
    object: String,
    data: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    id: String,
    object: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<RequestMessage>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    #[allow(dead_code)]
    #[serde(default)]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct RequestMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    model: String,
    choices: Vec<Choice>,
}

#[derive(Debug, Serialize)]
struct Choice {
    index: u32,
    message: ResponseMessage,
    finish_reason: String,
}

#[derive(Debug, Serialize)]
struct ResponseMessage {
    role: String,
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisKind;
    use crate::narrative::{Narrator, OpenAICompatibleNarrator};

    #[tokio::test]
    async fn test_mock_server_health_check() {
        let server = MockChatServer::start().await;
        let client = OpenAICompatibleNarrator::new(&server.url(), "test-model");

        assert!(client.health_check().await);
        assert_eq!(server.request_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_server_classifies_savings_question() {
        let server = MockChatServer::start().await;
        let client = OpenAICompatibleNarrator::new(&server.url(), "test-model");

        let kind = client
            .classify_question("Can I save more each month?")
            .await
            .unwrap();
        assert_eq!(kind, Some(AnalysisKind::Savings));

        let last = server.last_request().unwrap();
        assert_eq!(last.model, "test-model");
        assert_eq!(last.temperature, Some(0.3));
        assert_eq!(last.max_tokens, Some(50));
        assert!(last.system_message.is_some());
        assert!(last.authorization.is_none());
    }

    #[test]
    fn test_quoted_after() {
        assert_eq!(
            quoted_after(r#"Question: "hi there" end"#, "Question: \""),
            Some("hi there".to_string())
        );
        assert_eq!(quoted_after("nothing", "Question: \""), None);
    }
}
