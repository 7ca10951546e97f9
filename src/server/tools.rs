//! The tools exposed through `tools/list` and `tools/call`.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use super::error::McpError;
use super::protocol::{CallToolResult, McpTool};
use crate::language::Language;
use crate::report;
use crate::service::{Service, AUTO_LANGUAGE};

/// Invokable tools, in listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    AnalyzeSecurity,
    HealthCheck,
    ListSupportedLanguages,
}

impl Tool {
    pub const ALL: [Tool; 3] = [
        Tool::AnalyzeSecurity,
        Tool::HealthCheck,
        Tool::ListSupportedLanguages,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::AnalyzeSecurity => "analyze_security",
            Tool::HealthCheck => "health_check",
            Tool::ListSupportedLanguages => "list_supported_languages",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tool::AnalyzeSecurity => "Performs comprehensive security analysis on source code",
            Tool::HealthCheck => "Verifies service health and dependency availability",
            Tool::ListSupportedLanguages => {
                "Lists all supported programming languages and their metadata"
            }
        }
    }

    pub fn input_schema(&self) -> Value {
        match self {
            Tool::AnalyzeSecurity => {
                let mut tags: Vec<&str> = Language::KNOWN.iter().map(|l| l.as_str()).collect();
                tags.push(AUTO_LANGUAGE);
                let language_help = format!("Programming language ({})", tags.join(", "));
                json!({
                    "type": "object",
                    "properties": {
                        "code": {
                            "type": "string",
                            "description": "Source code to analyze"
                        },
                        "file_path": {
                            "type": "string",
                            "description": "File path for context and language detection (optional)"
                        },
                        "language": {
                            "type": "string",
                            "description": language_help,
                            "enum": tags
                        }
                    },
                    "required": ["code"]
                })
            }
            Tool::HealthCheck | Tool::ListSupportedLanguages => json!({
                "type": "object",
                "properties": {}
            }),
        }
    }
}

static CATALOGUE: Lazy<Vec<McpTool>> = Lazy::new(|| {
    Tool::ALL
        .iter()
        .map(|t| McpTool {
            name: t.name().to_string(),
            description: t.description().to_string(),
            input_schema: t.input_schema(),
        })
        .collect()
});

/// The static tool catalogue.
pub fn catalogue() -> &'static [McpTool] {
    &CATALOGUE
}

/// Optional string argument; non-string values count as absent.
fn str_arg<'a>(arguments: &'a Value, key: &str) -> Option<&'a str> {
    arguments.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Run a tool against the service.
pub async fn call(service: &Service, name: &str, arguments: &Value) -> Result<CallToolResult, McpError> {
    let tool = Tool::from_name(name)
        .ok_or_else(|| McpError::invalid_params(format!("unknown tool: {}", name)))?;
    tracing::info!(tool = name, "calling tool");

    match tool {
        Tool::AnalyzeSecurity => {
            let code = arguments
                .get("code")
                .and_then(Value::as_str)
                .filter(|c| !c.is_empty())
                .ok_or_else(|| McpError::invalid_params("missing or invalid 'code' parameter"))?;

            let result = service
                .analyze(
                    code,
                    str_arg(arguments, "file_path"),
                    str_arg(arguments, "language"),
                )
                .await?;
            Ok(CallToolResult::text(report::render_markdown(&result)))
        }
        Tool::HealthCheck => {
            let health = service.health().await;
            Ok(CallToolResult::text(serde_json::to_string_pretty(&health)?))
        }
        Tool::ListSupportedLanguages => {
            let languages = service.supported_languages();
            Ok(CallToolResult::text(serde_json::to_string_pretty(&languages)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue() {
        let names: Vec<&str> = catalogue().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["analyze_security", "health_check", "list_supported_languages"]
        );

        let schema = &catalogue()[0].input_schema;
        assert_eq!(schema["required"], json!(["code"]));
        assert_eq!(
            schema["properties"]["language"]["enum"],
            json!(["java", "csharp", "react_typescript", "react_javascript", "auto"])
        );
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Tool::from_name("health_check"), Some(Tool::HealthCheck));
        assert_eq!(Tool::from_name("delete_everything"), None);
    }

    #[test]
    fn test_str_arg_ignores_non_strings() {
        let args = json!({"file_path": 12, "language": "", "code": "x"});
        assert_eq!(str_arg(&args, "file_path"), None);
        assert_eq!(str_arg(&args, "language"), None);
        assert_eq!(str_arg(&args, "code"), Some("x"));
    }
}
