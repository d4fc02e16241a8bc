//! Pluggable narrative backends
//!
//! Turns analysis results into prose and classifies free-form questions,
//! using an external text-generation service. The analytics engine never
//! depends on this module; retries and timeouts live here only.
//!
//! # Architecture
//!
//! - `Narrator` trait: the interface every backend implements
//! - `NarratorClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleNarrator`, `MockNarrator`
//!
//! # Configuration
//!
//! Environment variables:
//! - `NARRATOR_BACKEND`: Backend to use (openai_compatible, mock). Default: openai_compatible
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-3.5-turbo)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

mod mock;
mod openai_compatible;
pub mod prompts;

pub use mock::MockNarrator;
pub use openai_compatible::OpenAICompatibleNarrator;

use async_trait::async_trait;

use crate::analysis::{AnalysisKind, AnalysisReport};
use crate::error::Result;
use crate::question::route_question;

/// Trait defining the interface for all narrative backends
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Decide which analysis answers a question; `None` when none applies
    async fn classify_question(&self, question: &str) -> Result<Option<AnalysisKind>>;

    /// Explain a report in plain language
    async fn narrate(&self, report: &AnalysisReport) -> Result<String>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;
}

/// Concrete narrator enum
#[derive(Clone)]
pub enum NarratorClient {
    /// Any server implementing the OpenAI chat completions API
    OpenAICompatible(OpenAICompatibleNarrator),
    /// Deterministic offline narrator
    Mock(MockNarrator),
}

impl NarratorClient {
    /// Create a narrator from environment variables
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend =
            std::env::var("NARRATOR_BACKEND").unwrap_or_else(|_| "openai_compatible".to_string());

        match backend.to_lowercase().as_str() {
            "openai_compatible" | "openai" => {
                OpenAICompatibleNarrator::from_env().map(NarratorClient::OpenAICompatible)
            }
            "mock" => Some(NarratorClient::Mock(MockNarrator::new())),
            _ => {
                tracing::warn!(
                    backend = %backend,
                    "Unknown NARRATOR_BACKEND, falling back to openai_compatible"
                );
                OpenAICompatibleNarrator::from_env().map(NarratorClient::OpenAICompatible)
            }
        }
    }

    /// Create a mock narrator
    pub fn mock() -> Self {
        NarratorClient::Mock(MockNarrator::new())
    }

    /// Savings target quoted to the backend when classifying questions
    pub fn with_savings_target(self, savings_target: f64) -> Self {
        match self {
            NarratorClient::OpenAICompatible(b) => {
                NarratorClient::OpenAICompatible(b.with_savings_target(savings_target))
            }
            NarratorClient::Mock(b) => NarratorClient::Mock(b),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            NarratorClient::OpenAICompatible(_) => "openai_compatible",
            NarratorClient::Mock(_) => "mock",
        }
    }
}

#[async_trait]
impl Narrator for NarratorClient {
    async fn classify_question(&self, question: &str) -> Result<Option<AnalysisKind>> {
        match self {
            NarratorClient::OpenAICompatible(b) => b.classify_question(question).await,
            NarratorClient::Mock(b) => b.classify_question(question).await,
        }
    }

    async fn narrate(&self, report: &AnalysisReport) -> Result<String> {
        match self {
            NarratorClient::OpenAICompatible(b) => b.narrate(report).await,
            NarratorClient::Mock(b) => b.narrate(report).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            NarratorClient::OpenAICompatible(b) => b.health_check().await,
            NarratorClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            NarratorClient::OpenAICompatible(b) => b.model(),
            NarratorClient::Mock(b) => b.model(),
        }
    }
}

/// Classify with the narrator when there is one, falling back to the local
/// keyword router when it is absent, fails, or cannot decide
pub async fn classify_with_fallback(
    narrator: Option<&NarratorClient>,
    question: &str,
) -> Option<AnalysisKind> {
    if let Some(narrator) = narrator {
        match narrator.classify_question(question).await {
            Ok(Some(kind)) => return Some(kind),
            Ok(None) => {
                tracing::debug!(model = narrator.model(), "Narrator could not classify question");
            }
            Err(e) => {
                tracing::warn!(
                    model = narrator.model(),
                    error = %e,
                    "Narrator classification failed, using keyword router"
                );
            }
        }
    }
    route_question(question)
}
