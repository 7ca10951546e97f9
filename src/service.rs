//! The analysis service: configuration, classifier, backend and analyzers
//! bundled into one context object shared by the RPC server and the CLI.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analysis::{self, AnalysisResult, AnalyzerProfile};
use crate::backend::{Backend, BackendError, HttpBackend};
use crate::config::Config;
use crate::error::AnalysisError;
use crate::language::{self, Classifier, Language, LanguageInfo};

/// Language argument meaning "classify it for me".
pub const AUTO_LANGUAGE: &str = "auto";

/// Health report returned by the `health_check` tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    /// `available` or `unavailable`.
    pub llm_service_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_service_error: Option<String>,
    pub supported_languages: Vec<String>,
}

impl HealthStatus {
    pub fn backend_available(&self) -> bool {
        self.llm_service_status == "available"
    }
}

/// Shared, immutable service context.
pub struct Service {
    config: Config,
    classifier: Classifier,
    backend: Arc<dyn Backend>,
    analyzers: Vec<AnalyzerProfile>,
}

impl Service {
    /// Service over an arbitrary backend with the built-in analyzers.
    pub fn new(config: Config, backend: Arc<dyn Backend>) -> Self {
        Self {
            config,
            classifier: Classifier::new(),
            backend,
            analyzers: AnalyzerProfile::builtin(),
        }
    }

    /// Service talking to the HTTP backend named in `config`.
    pub fn from_config(config: Config) -> Result<Self, BackendError> {
        let backend = HttpBackend::new(&config.backend)?;
        Ok(Self::new(config, Arc::new(backend)))
    }

    /// Replace the registered analyzers. Order is kept for reporting.
    pub fn with_analyzers(mut self, analyzers: Vec<AnalyzerProfile>) -> Self {
        self.analyzers = analyzers;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn analyzer(&self, language: Language) -> Option<&AnalyzerProfile> {
        self.analyzers.iter().find(|a| a.language == language)
    }

    /// Languages with a registered analyzer, in registration order.
    pub fn registered_languages(&self) -> Vec<Language> {
        self.analyzers.iter().map(|a| a.language).collect()
    }

    /// The static language catalogue.
    pub fn supported_languages(&self) -> Vec<LanguageInfo> {
        language::supported_languages()
    }

    /// Decide which language `code` is analyzed as.
    ///
    /// An explicit tag other than `auto` is trusted as given.
    pub fn resolve_language(
        &self,
        code: &str,
        file_path: Option<&str>,
        language: Option<&str>,
    ) -> Result<Language, AnalysisError> {
        match language.map(str::trim).filter(|l| !l.is_empty()) {
            Some(tag) if tag != AUTO_LANGUAGE => {
                Language::parse(tag).ok_or_else(|| AnalysisError::UnsupportedLanguage(tag.to_string()))
            }
            _ => Ok(self.classifier.classify(code, file_path)),
        }
    }

    /// Validate, classify and analyze one piece of code.
    pub async fn analyze(
        &self,
        code: &str,
        file_path: Option<&str>,
        language: Option<&str>,
    ) -> Result<AnalysisResult, AnalysisError> {
        if code.is_empty() {
            return Err(AnalysisError::InvalidParameter(
                "missing or invalid 'code' parameter".to_string(),
            ));
        }

        let language = self.resolve_language(code, file_path, language)?;
        let profile = self
            .analyzer(language)
            .ok_or_else(|| AnalysisError::UnsupportedLanguage(language.to_string()))?;

        tracing::debug!(%language, file_path = file_path.unwrap_or(""), "analyzing");
        analysis::run(self.backend.as_ref(), profile, code, file_path).await
    }

    /// Probe the backend. Never fails; unreachability is part of the status.
    pub async fn health(&self) -> HealthStatus {
        let (available, error) = match self.backend.health_check().await {
            Ok(true) => (true, None),
            Ok(false) => (false, None),
            Err(e) => {
                tracing::warn!(error = %e, "backend health check failed");
                (false, Some(e.to_string()))
            }
        };

        HealthStatus {
            status: "healthy".to_string(),
            version: self.config.server.version.clone(),
            llm_service_status: if available { "available" } else { "unavailable" }.to_string(),
            llm_service_error: error,
            supported_languages: self
                .registered_languages()
                .iter()
                .map(|l| l.as_str().to_string())
                .collect(),
        }
    }
}
