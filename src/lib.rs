//! Codeward - LLM-backed security review over MCP.
//!
//! Codeward accepts source code over a line-delimited JSON-RPC protocol
//! (MCP on stdio), works out which language it is, asks a language-model
//! backend for a vulnerability assessment, and turns the model's free-form
//! reply into typed, severity-ranked findings.
//!
//! # Architecture
//!
//! - `server`: protocol engine and tool registry
//! - `service`: shared context (config, classifier, backend, analyzers)
//! - `language`: language catalogue and the two-stage classifier
//! - `preprocess`: comment stripping that keeps line numbers intact
//! - `analysis`: the pipeline, rule prompts and reply extraction
//! - `backend`: OpenAI-compatible HTTP client and a scripted mock
//! - `report`: Markdown, JSON and SARIF output
//! - `config`: defaults, YAML file and environment
//! - `cli`: command-line entry points
//!
//! The crate does not detect vulnerabilities itself: it never inspects code
//! beyond comment stripping and language classification.

pub mod analysis;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod language;
pub mod preprocess;
pub mod report;
pub mod server;
pub mod service;

pub use analysis::{AnalysisMetadata, AnalysisResult, AnalyzerProfile, Finding, Severity};
pub use backend::{Backend, BackendError, HttpBackend, MockBackend};
pub use config::Config;
pub use error::AnalysisError;
pub use language::{Classifier, Language, LanguageInfo};
pub use server::{McpError, McpServer};
pub use service::{HealthStatus, Service};
