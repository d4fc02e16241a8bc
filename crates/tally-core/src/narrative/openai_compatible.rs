//! OpenAI-compatible narrator
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - OpenAI itself (https://api.openai.com)
//! - vLLM, LocalAI, llama-server / llama.cpp
//! - Docker Model Runner
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::{AnalysisKind, AnalysisReport};
use crate::error::{Error, Result};
use crate::question::normalize_label;

use super::prompts::{Prompt, PromptId};
use super::Narrator;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const RETRY_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_MAX_RETRIES: u32 = 2;

const CLASSIFY_TEMPERATURE: f32 = 0.3;
const CLASSIFY_MAX_TOKENS: u32 = 50;
const NARRATE_TEMPERATURE: f32 = 0.7;
const NARRATE_MAX_TOKENS: u32 = 500;

#[derive(Clone)]
pub struct OpenAICompatibleNarrator {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    max_retries: u32,
    savings_target: f64,
}

impl OpenAICompatibleNarrator {
    pub fn new(base_url: &str, model: &str) -> Self {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
            max_retries: DEFAULT_MAX_RETRIES,
            savings_target: 200.0,
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        let mut narrator = Self::new(base_url, model);
        narrator.api_key = Some(api_key.to_string());
        narrator
    }

    /// Number of extra attempts after a transient failure
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Savings target quoted in the classification prompt
    pub fn with_savings_target(mut self, savings_target: f64) -> Self {
        self.savings_target = savings_target;
        self
    }

    /// Create from environment variables
    ///
    /// Required: `OPENAI_COMPATIBLE_HOST`
    /// Optional: `OPENAI_COMPATIBLE_MODEL` (default: gpt-3.5-turbo)
    /// Optional: `OPENAI_COMPATIBLE_API_KEY`
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OPENAI_COMPATIBLE_HOST").ok()?;
        let model = std::env::var("OPENAI_COMPATIBLE_MODEL")
            .unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        let mut narrator = Self::new(&host, &model);
        narrator.api_key = std::env::var("OPENAI_COMPATIBLE_API_KEY").ok();
        Some(narrator)
    }

    /// Chat completion with retries on transport errors, 429 and 5xx
    async fn chat_completion(
        &self,
        prompt: &Prompt,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let mut messages = Vec::with_capacity(2);
        if !prompt.system.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: prompt.system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.user.clone(),
        });

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(temperature),
            max_tokens: Some(max_tokens),
            stream: false,
        };

        let mut attempt = 0;
        loop {
            match self.send_once(&request).await {
                Ok(content) => return Ok(content),
                Err(e) if attempt < self.max_retries && is_transient(&e) => {
                    attempt += 1;
                    warn!(
                        model = %self.model,
                        attempt,
                        error = %e,
                        "Chat completion failed, retrying"
                    );
                    tokio::time::sleep(RETRY_DELAY * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(&self, request: &ChatCompletionRequest) -> Result<String> {
        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Narrative { status, body });
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| Error::InvalidData("No response from chat API".into()))
    }
}

/// Whether a failed request is worth repeating
fn is_transient(error: &Error) -> bool {
    match error {
        Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        Error::Narrative { status, .. } => {
            status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
        }
        _ => false,
    }
}

#[async_trait]
impl Narrator for OpenAICompatibleNarrator {
    async fn classify_question(&self, question: &str) -> Result<Option<AnalysisKind>> {
        let target = format!("{:.2}", self.savings_target);
        let prompt = Prompt::load(PromptId::ClassifyQuestion)
            .render(&[("question", question), ("savings_target", &target)]);

        let label = self
            .chat_completion(&prompt, CLASSIFY_TEMPERATURE, CLASSIFY_MAX_TOKENS)
            .await?;
        let kind = normalize_label(&label);
        debug!(label = %label, kind = ?kind, "Question classified by model");
        Ok(kind)
    }

    async fn narrate(&self, report: &AnalysisReport) -> Result<String> {
        let kind = report.kind();
        let results = serde_json::to_string_pretty(report)?;
        let prompt = Prompt::load(PromptId::NarrateReport).render(&[
            ("analysis", kind.as_str()),
            ("label", kind.label()),
            ("results", &results),
        ]);

        self.chat_completion(&prompt, NARRATE_TEMPERATURE, NARRATE_MAX_TOKENS)
            .await
    }

    async fn health_check(&self) -> bool {
        let mut req_builder = self
            .http_client
            .get(format!("{}/v1/models", self.base_url));
        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }
        match req_builder.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{LoanCalculator, TrendReport};
    use crate::models::Transaction;
    use crate::test_utils::MockChatServer;
    use axum::http::StatusCode as AxumStatus;

    #[tokio::test]
    async fn test_classify_question_against_mock_server() {
        let server = MockChatServer::start().await;
        let narrator = OpenAICompatibleNarrator::new(&server.url(), "test-model");

        let kind = narrator
            .classify_question("How much could I borrow for a flat?")
            .await
            .unwrap();
        assert_eq!(kind, Some(AnalysisKind::Loan));

        let none = narrator
            .classify_question("Tell me a joke")
            .await
            .unwrap();
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn test_narrate_embeds_report() {
        let server = MockChatServer::start().await;
        let narrator = OpenAICompatibleNarrator::with_api_key(&server.url(), "m", "secret");

        let report = AnalysisReport::Loan(LoanCalculator::default().capacity(&[
            Transaction::new(None, 36_000.0, "salary", "Salary", "Income"),
        ]));
        let text = narrator.narrate(&report).await.unwrap();

        assert!(text.contains("loan"));
        let last = server.last_request().unwrap();
        assert_eq!(last.temperature, Some(0.7));
        assert_eq!(last.max_tokens, Some(500));
        assert!(last.user_message.contains("\"analysis\": \"loan\""));
        assert_eq!(last.authorization.as_deref(), Some("Bearer secret"));
    }

    #[tokio::test]
    async fn test_server_error_is_retried_then_reported() {
        let server = MockChatServer::start_failing(AxumStatus::SERVICE_UNAVAILABLE).await;
        let narrator = OpenAICompatibleNarrator::new(&server.url(), "m").with_max_retries(2);

        let result = narrator
            .narrate(&AnalysisReport::Trends(TrendReport::default()))
            .await;

        assert!(matches!(
            result,
            Err(Error::Narrative { status, .. }) if status == StatusCode::SERVICE_UNAVAILABLE
        ));
        assert_eq!(server.request_count(), 3);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockChatServer::start_failing(AxumStatus::UNAUTHORIZED).await;
        let narrator = OpenAICompatibleNarrator::new(&server.url(), "m").with_max_retries(2);

        let result = narrator.classify_question("loan?").await;

        assert!(result.is_err());
        assert_eq!(server.request_count(), 1);
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockChatServer::start().await;
        let narrator = OpenAICompatibleNarrator::new(&server.url(), "m");
        assert!(narrator.health_check().await);

        let offline = OpenAICompatibleNarrator::new("http://127.0.0.1:9", "m");
        assert!(!offline.health_check().await);
    }

    fn api_error(status: StatusCode) -> Error {
        Error::Narrative {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_transient_classification() {
        assert!(is_transient(&api_error(StatusCode::SERVICE_UNAVAILABLE)));
        assert!(is_transient(&api_error(StatusCode::TOO_MANY_REQUESTS)));
        assert!(!is_transient(&api_error(StatusCode::UNAUTHORIZED)));
        assert!(!is_transient(&Error::InvalidData("empty".into())));
    }

    #[tokio::test]
    async fn test_client_error_keeps_status() {
        let server = MockChatServer::start_failing(AxumStatus::UNAUTHORIZED).await;
        let narrator = OpenAICompatibleNarrator::new(&server.url(), "m");

        let err = narrator.classify_question("loan?").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Narrative { status, ref body } if status == StatusCode::UNAUTHORIZED && body == "mock failure"
        ));
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let narrator = OpenAICompatibleNarrator::new("http://localhost:8080/", "m");
        assert_eq!(narrator.base_url, "http://localhost:8080");
        assert_eq!(narrator.model(), "m");
    }
}
