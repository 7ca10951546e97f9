//! Scripted in-process backend.
//!
//! Replies are served first-in first-out; once the script runs out every
//! analysis gets an empty findings array. Every request is recorded.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{Backend, BackendError};

/// One recorded `analyze` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub code: String,
    pub rules_prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Liveness {
    Up,
    Down,
    Unreachable,
}

pub struct MockBackend {
    script: Mutex<VecDeque<Result<String, BackendError>>>,
    calls: Mutex<Vec<MockCall>>,
    health_probes: AtomicUsize,
    liveness: Liveness,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            health_probes: AtomicUsize::new(0),
            liveness: Liveness::Up,
        }
    }

    /// Queue a reply text.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        self.push(Ok(reply.into()));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, error: BackendError) -> Self {
        self.push(Err(error));
        self
    }

    /// Liveness probe answers, but reports the backend as unhealthy.
    pub fn unhealthy(mut self) -> Self {
        self.liveness = Liveness::Down;
        self
    }

    /// Liveness probe fails as if the endpoint never answered.
    pub fn unreachable(mut self) -> Self {
        self.liveness = Liveness::Unreachable;
        self
    }

    fn push(&self, entry: Result<String, BackendError>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(entry);
        }
    }

    /// Every `analyze` call received so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn health_probe_count(&self) -> usize {
        self.health_probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn analyze(&self, code: &str, rules_prompt: &str) -> Result<String, BackendError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                code: code.to_string(),
                rules_prompt: rules_prompt.to_string(),
            });
        }

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        next.unwrap_or_else(|| Ok("[]".to_string()))
    }

    async fn health_check(&self) -> Result<bool, BackendError> {
        self.health_probes.fetch_add(1, Ordering::SeqCst);
        match self.liveness {
            Liveness::Up => Ok(true),
            Liveness::Down => Ok(false),
            Liveness::Unreachable => Err(BackendError::Timeout(120)),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
