//! OpenAI-compatible HTTP backend.
//!
//! Analysis: `POST {base_url}/v1/chat/completions`
//! Liveness: `GET {base_url}/v1/models`

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::time::{Duration, Instant};

use super::{analysis_messages, Backend, BackendError, ChatRequest, ChatResponse, TEMPERATURE};
use crate::config::BackendConfig;

/// Chat-completion client for one configured endpoint and model.
pub struct HttpBackend {
    http: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpBackend {
    /// Create a client for the configured endpoint.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = Client::builder()
            .user_agent(concat!("codeward/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            BackendError::Timeout(self.timeout.as_secs())
        } else {
            BackendError::Network(e)
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn analyze(&self, code: &str, rules_prompt: &str) -> Result<String, BackendError> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: analysis_messages(code, rules_prompt),
            temperature: TEMPERATURE,
        };

        let started = Instant::now();
        tracing::debug!(model = %self.model, bytes = code.len(), "sending analysis request");

        let response = self
            .authorize(self.http.post(self.url("/v1/chat/completions")))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_send_error(e))?;
        tracing::debug!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend replied"
        );

        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let reply: ChatResponse =
            serde_json::from_str(&text).map_err(|e| BackendError::Decode(e.to_string()))?;

        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(BackendError::EmptyChoices)
    }

    async fn health_check(&self) -> Result<bool, BackendError> {
        let response = self
            .authorize(self.http.get(self.url("/v1/models")))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        Ok(response.status().is_success())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
