//! Prompt templates for the narrative backends
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/tally/prompts/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! A prompt file has a `# System` and a `# User` section; `{{var}}`
//! placeholders in either are substituted at render time.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

mod defaults {
    pub const CLASSIFY_QUESTION: &str = include_str!("../../../../prompts/classify_question.md");
    pub const NARRATE_REPORT: &str = include_str!("../../../../prompts/narrate_report.md");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    ClassifyQuestion,
    NarrateReport,
}

impl PromptId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClassifyQuestion => "classify_question",
            Self::NarrateReport => "narrate_report",
        }
    }

    fn default_content(&self) -> &'static str {
        match self {
            Self::ClassifyQuestion => defaults::CLASSIFY_QUESTION,
            Self::NarrateReport => defaults::NARRATE_REPORT,
        }
    }
}

/// A prompt split into its system and user messages
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Parse `# System` / `# User` sections; text without headers is all user
    pub fn parse(content: &str) -> Self {
        match (
            extract_section(content, "# System"),
            extract_section(content, "# User"),
        ) {
            (system, Some(user)) => Self {
                system: system.unwrap_or_default().to_string(),
                user: user.to_string(),
            },
            _ => Self {
                system: String::new(),
                user: content.trim().to_string(),
            },
        }
    }

    /// Load an override if one exists, else the embedded default
    pub fn load(id: PromptId) -> Self {
        if let Some(path) = override_path(id).filter(|p| p.exists()) {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    debug!(prompt = id.as_str(), path = %path.display(), "Using prompt override");
                    return Self::parse(&content);
                }
                Err(e) => {
                    warn!(prompt = id.as_str(), error = %e, "Failed to read prompt override");
                }
            }
        }
        Self::parse(id.default_content())
    }

    /// Substitute `{{key}}` placeholders in both sections
    pub fn render(&self, vars: &[(&str, &str)]) -> Self {
        let apply = |text: &str| {
            vars.iter().fold(text.to_string(), |acc, (key, value)| {
                acc.replace(&format!("{{{{{}}}}}", key), value)
            })
        };
        Self {
            system: apply(&self.system),
            user: apply(&self.user),
        }
    }
}

/// Directory searched for prompt overrides
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("prompts"))
}

fn override_path(id: PromptId) -> Option<PathBuf> {
    default_prompts_dir().map(|dir| dir.join(format!("{}.md", id.as_str())))
}

fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];
    let end = after_header.find("\n# ").unwrap_or(after_header.len());
    Some(after_header[..end].trim())
}
