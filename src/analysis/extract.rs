//! Pulling structured findings out of free-form backend replies.
//!
//! Replies are not guaranteed to be pure JSON, so the payload is located by
//! an ordered list of strategies; the first one that yields text wins.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

lazy_static! {
    static ref FENCED_BLOCK: Regex = Regex::new(r"```(?:(?i:json))?\s*([\s\S]*?)```").unwrap();
    static ref BRACKETED: Regex = Regex::new(r"(\[[\s\S]*\]|\{[\s\S]*\})").unwrap();
}

/// The backend replied, but nothing in the reply decodes as findings.
#[derive(Error, Debug)]
#[error("{array_error} (as object: {object_error})")]
pub struct ExtractionError {
    /// Why the payload is not a findings array.
    pub array_error: String,
    /// Why the payload is not an object with an `issues` array.
    pub object_error: String,
}

/// A way of locating the JSON payload in a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStrategy {
    /// Inner text of the first fenced code block, optionally tagged `json`.
    FencedBlock,
    /// First `[...]` or `{...}` span, greedy to the last closing bracket.
    Bracketed,
    /// The reply as-is.
    Raw,
}

impl ExtractStrategy {
    /// Strategies in the order they are tried.
    pub const ORDER: [ExtractStrategy; 3] = [
        ExtractStrategy::FencedBlock,
        ExtractStrategy::Bracketed,
        ExtractStrategy::Raw,
    ];

    pub fn apply<'a>(&self, text: &'a str) -> Option<&'a str> {
        match self {
            ExtractStrategy::FencedBlock => FENCED_BLOCK
                .captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim()),
            ExtractStrategy::Bracketed => BRACKETED
                .captures(text)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim()),
            ExtractStrategy::Raw => Some(text),
        }
    }
}

/// Locate the JSON payload in a reply, reporting which strategy found it.
pub fn extract_json(text: &str) -> (ExtractStrategy, &str) {
    for strategy in ExtractStrategy::ORDER {
        if let Some(found) = strategy.apply(text) {
            return (strategy, found);
        }
    }
    (ExtractStrategy::Raw, text)
}

/// A finding as the backend sent it, before validation and enrichment.
///
/// Every field is optional so one sloppy entry does not sink the whole reply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawFinding {
    pub id: Option<Value>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub severity: Option<String>,
    pub line_number: Option<Value>,
    pub column_number: Option<Value>,
    pub file_path: Option<String>,
    pub code_snippet: Option<String>,
    pub remediation: Option<String>,
    pub references: Option<Vec<String>>,
}

impl RawFinding {
    /// Identifier as text; numbers are kept in their JSON form.
    pub fn id_text(&self) -> Option<String> {
        match &self.id {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Positive line/column value; zero, negative or non-numeric means absent.
pub fn position(value: &Option<Value>) -> Option<u32> {
    let n = match value.as_ref()? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    u32::try_from(n).ok().filter(|n| *n > 0)
}

#[derive(Deserialize)]
struct IssuesWrapper {
    issues: Vec<RawFinding>,
}

/// Decode a payload as a findings array, or as `{"issues": [...]}`.
pub fn decode_findings(json: &str) -> Result<Vec<RawFinding>, ExtractionError> {
    let array_error = match serde_json::from_str::<Vec<RawFinding>>(json) {
        Ok(findings) => return Ok(findings),
        Err(e) => e.to_string(),
    };

    match serde_json::from_str::<IssuesWrapper>(json) {
        Ok(wrapper) => Ok(wrapper.issues),
        Err(e) => Err(ExtractionError {
            array_error,
            object_error: e.to_string(),
        }),
    }
}

/// Extract and decode the findings in a backend reply.
pub fn parse_reply(reply: &str) -> Result<Vec<RawFinding>, ExtractionError> {
    let (strategy, payload) = extract_json(reply);
    tracing::debug!(?strategy, bytes = payload.len(), "located findings payload");
    decode_findings(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARRAY: &str = r#"[{"id": "A-1", "title": "Hardcoded password", "severity": "HIGH"}]"#;

    fn titles(findings: &[RawFinding]) -> Vec<String> {
        findings.iter().filter_map(|f| f.title.clone()).collect()
    }

    #[test]
    fn test_equivalent_inputs_decode_identically() {
        let fenced = format!("```json\n{}\n```", ARRAY);
        let prose = format!("Here is what I found:\n{}\nLet me know if you need more.", ARRAY);

        let (s1, p1) = extract_json(ARRAY);
        let (s2, p2) = extract_json(&fenced);
        let (s3, p3) = extract_json(&prose);

        assert_eq!(s1, ExtractStrategy::Bracketed);
        assert_eq!(s2, ExtractStrategy::FencedBlock);
        assert_eq!(s3, ExtractStrategy::Bracketed);
        assert_eq!(p1, ARRAY);
        assert_eq!(p2, ARRAY);
        assert_eq!(p3, ARRAY);

        for reply in [ARRAY.to_string(), fenced, prose] {
            let findings = parse_reply(&reply).unwrap();
            assert_eq!(titles(&findings), vec!["Hardcoded password"]);
            assert_eq!(findings[0].id_text().as_deref(), Some("A-1"));
        }
    }

    #[test]
    fn test_untagged_fence() {
        let reply = "Result:\n```\n[]\n```";
        assert_eq!(extract_json(reply), (ExtractStrategy::FencedBlock, "[]"));
        assert!(parse_reply(reply).unwrap().is_empty());
    }

    #[test]
    fn test_raw_fallback() {
        let reply = "no issues here";
        assert_eq!(extract_json(reply), (ExtractStrategy::Raw, reply));
        assert!(parse_reply(reply).is_err());
    }

    #[test]
    fn test_issues_wrapper() {
        let reply = r#"{"issues": [{"title": "XSS", "severity": "medium"}]}"#;
        let findings = parse_reply(reply).unwrap();
        assert_eq!(titles(&findings), vec!["XSS"]);
        assert_eq!(findings[0].severity.as_deref(), Some("medium"));
    }

    #[test]
    fn test_object_without_issues_fails() {
        let err = parse_reply(r#"{"findings": []}"#).unwrap_err();
        assert!(err.object_error.contains("issues"));
    }

    #[test]
    fn test_malformed_json_fails() {
        assert!(parse_reply("```json\n[{\"title\": \n```").is_err());
    }

    #[test]
    fn test_lenient_fields() {
        let reply = r#"[{"id": 7, "title": null, "line_number": "14", "column_number": -1, "references": null}]"#;
        let findings = parse_reply(reply).unwrap();
        assert_eq!(findings[0].id_text().as_deref(), Some("7"));
        assert_eq!(findings[0].title, None);
        assert_eq!(position(&findings[0].line_number), Some(14));
        assert_eq!(position(&findings[0].column_number), None);
        assert_eq!(findings[0].references, None);
    }

    #[test]
    fn test_position() {
        assert_eq!(position(&Some(serde_json::json!(3))), Some(3));
        assert_eq!(position(&Some(serde_json::json!(0))), None);
        assert_eq!(position(&Some(serde_json::json!(2.0))), Some(2));
        assert_eq!(position(&Some(serde_json::json!(true))), None);
        assert_eq!(position(&None), None);
    }
}
