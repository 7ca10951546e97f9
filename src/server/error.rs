//! Protocol-level errors and their JSON-RPC codes.

use crate::error::AnalysisError;

/// Errors reported to protocol clients.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("parse error: {message}")]
    ParseError { message: String },

    #[error("method not found: {method}")]
    MethodNotFound { method: String },

    #[error("{message}")]
    InvalidParams { message: String },

    #[error("{message}")]
    InternalError { message: String },

    /// The backend replied, but the reply held no usable findings.
    #[error("{message}")]
    ExtractionFailed { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    /// Convert to a JSON-RPC error code.
    pub fn error_code(&self) -> i64 {
        match self {
            McpError::ParseError { .. } => -32700,
            McpError::MethodNotFound { .. } => -32601,
            McpError::InvalidParams { .. } => -32602,
            McpError::InternalError { .. } => -32603,
            McpError::ExtractionFailed { .. } => -32001,
            McpError::Io(_) => -32603,
            McpError::Json(_) => -32603,
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        McpError::InvalidParams {
            message: message.into(),
        }
    }
}

impl From<AnalysisError> for McpError {
    fn from(err: AnalysisError) -> Self {
        let message = err.to_string();
        match err {
            AnalysisError::InvalidParameter(_) | AnalysisError::UnsupportedLanguage(_) => {
                McpError::InvalidParams { message }
            }
            AnalysisError::Backend(_) => McpError::InternalError { message },
            AnalysisError::Extraction(_) => McpError::ExtractionFailed { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            McpError::ParseError {
                message: "bad json".into()
            }
            .error_code(),
            -32700
        );
        assert_eq!(
            McpError::MethodNotFound {
                method: "prompts/list".into()
            }
            .error_code(),
            -32601
        );
        assert_eq!(McpError::invalid_params("x").error_code(), -32602);
        assert_eq!(
            McpError::InternalError {
                message: "crash".into()
            }
            .error_code(),
            -32603
        );
        assert_eq!(
            McpError::ExtractionFailed {
                message: "garbage".into()
            }
            .error_code(),
            -32001
        );
    }

    #[test]
    fn test_from_analysis_error() {
        let err: McpError = AnalysisError::UnsupportedLanguage("cobol".into()).into();
        assert_eq!(err.error_code(), -32602);
        assert_eq!(err.to_string(), "unsupported language: cobol");

        let err: McpError = AnalysisError::Backend(BackendError::Status {
            status: 500,
            body: "down".into(),
        })
        .into();
        assert_eq!(err.error_code(), -32603);
        assert_eq!(
            err.to_string(),
            "analysis failed: backend returned status 500: down"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let mcp_err: McpError = io_err.into();
        assert!(matches!(mcp_err, McpError::Io(_)));
        assert_eq!(mcp_err.error_code(), -32603);
    }
}
