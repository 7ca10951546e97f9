//! Errors raised by the analysis service.

use thiserror::Error;

use crate::analysis::ExtractionError;
use crate::backend::BackendError;

/// Why an analysis request did not produce a result.
///
/// Validation failures are raised before the backend is contacted.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("analysis failed: {0}")]
    Backend(#[from] BackendError),

    #[error("failed to parse response: {0}")]
    Extraction(#[from] ExtractionError),
}

impl AnalysisError {
    /// True for errors raised before any backend call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AnalysisError::InvalidParameter(_) | AnalysisError::UnsupportedLanguage(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = AnalysisError::UnsupportedLanguage("cobol".into());
        assert_eq!(err.to_string(), "unsupported language: cobol");
        assert!(err.is_validation());

        let err: AnalysisError = BackendError::EmptyChoices.into();
        assert_eq!(
            err.to_string(),
            "analysis failed: no choices in backend response"
        );
        assert!(!err.is_validation());
    }
}
