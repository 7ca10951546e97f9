//! Language-model backend clients.
//!
//! The backend is an OpenAI-compatible chat completion endpoint (LM Studio,
//! vLLM, llama.cpp server, ...). It performs the actual vulnerability
//! assessment; this crate only frames the request and reads the reply.

mod http;
pub mod mock;

pub use http::HttpBackend;
pub use mock::MockBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// System instruction sent with every analysis request.
pub const SYSTEM_PROMPT: &str = "You are a security analysis expert. Analyze the provided code and return findings in JSON format.";

/// Sampling temperature; kept low so repeated runs agree.
pub const TEMPERATURE: f32 = 0.1;

/// Errors that can occur while talking to the backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to send request: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode backend response: {0}")]
    Decode(String),
    #[error("no choices in backend response")]
    EmptyChoices,
}

/// A chat message in the OpenAI wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of `POST /v1/chat/completions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// The parts of a chat completion reply this crate reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// Build the two-message exchange for one analysis.
pub fn analysis_messages(code: &str, rules_prompt: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!(
            "{}\n\nCode to analyze:\n```\n{}\n```",
            rules_prompt, code
        )),
    ]
}

/// A backend able to assess code and report its own liveness.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Send code plus a rule prompt, returning the raw reply text.
    async fn analyze(&self, code: &str, rules_prompt: &str) -> Result<String, BackendError>;

    /// Probe liveness. `Ok(false)` means reachable but unhealthy.
    async fn health_check(&self) -> Result<bool, BackendError>;

    /// Model identifier requests are sent for.
    fn model(&self) -> &str;
}
