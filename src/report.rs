//! Output formatting for analysis results.
//!
//! Supports three output formats:
//! - Markdown: sectioned report, also the text of `analyze_security` tool results
//! - JSON: the full `AnalysisResult` for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration
//!
//! Health and catalogue listings for the CLI are printed in colour.

use colored::*;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::analysis::{AnalysisResult, Finding, Severity};
use crate::language::LanguageInfo;
use crate::service::HealthStatus;

/// Report format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Json,
    Sarif,
}

/// Render a result in the requested format.
pub fn render(result: &AnalysisResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Markdown => Ok(render_markdown(result)),
        OutputFormat::Json => render_json(result),
        OutputFormat::Sarif => render_sarif(result),
    }
}

// =============================================================================
// Markdown
// =============================================================================

fn section_heading(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "## Critical Issues",
        Severity::High => "## High Severity Issues",
        Severity::Medium => "## Medium Severity Issues",
        Severity::Low => "## Low Severity Issues",
    }
}

/// Full Markdown report: header, summary, then the findings sections.
pub fn render_markdown(result: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str("# Security Analysis Report\n\n");
    let _ = write!(out, "**Language**: {}\n\n", result.language);
    let _ = write!(
        out,
        "**Analysis Time**: {}\n\n",
        result.metadata.analysis_time
    );
    let _ = write!(out, "## Summary\n\n{}\n\n", result.summary);
    out.push_str(&render_findings(&result.issues));
    out
}

/// Findings grouped by severity, most urgent first.
///
/// Empty groups are omitted and findings keep their original order within a
/// group. With no findings the output is a single line.
pub fn render_findings(issues: &[Finding]) -> String {
    if issues.is_empty() {
        return "No security issues found.\n".to_string();
    }

    let mut out = String::new();
    for severity in Severity::REPORT_ORDER {
        let mut group = issues.iter().filter(|f| f.severity == severity).peekable();
        if group.peek().is_none() {
            continue;
        }
        out.push_str(section_heading(severity));
        out.push_str("\n\n");
        for finding in group {
            write_finding(&mut out, finding);
        }
    }
    out
}

fn write_finding(out: &mut String, finding: &Finding) {
    let _ = write!(out, "### {}\n\n", finding.title);
    let _ = write!(out, "**Severity**: {}\n\n", finding.severity);
    let _ = write!(out, "**Description**: {}\n\n", finding.description);

    if let Some(line) = finding.line {
        let _ = write!(out, "**Location**: Line {}", line);
        if let Some(column) = finding.column {
            let _ = write!(out, ", Column {}", column);
        }
        out.push_str("\n\n");
    }

    if !finding.code_snippet.is_empty() {
        let _ = write!(out, "**Code Snippet**:\n```\n{}\n```\n\n", finding.code_snippet);
    }

    if !finding.remediation.is_empty() {
        let _ = write!(out, "**Remediation**: {}\n\n", finding.remediation);
    }

    if !finding.references.is_empty() {
        out.push_str("**References**:\n");
        for reference in &finding.references {
            let _ = writeln!(out, "- {}", reference);
        }
        out.push('\n');
    }

    out.push_str("---\n\n");
}

// =============================================================================
// JSON
// =============================================================================

pub fn render_json(result: &AnalysisResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

// =============================================================================
// SARIF
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "codeward";

#[derive(Serialize, Deserialize)]
struct SarifReport {
    version: String,
    #[serde(rename = "$schema")]
    schema: String,
    runs: Vec<SarifRun>,
}

#[derive(Serialize, Deserialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize, Deserialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize, Deserialize)]
struct SarifDriver {
    name: String,
    version: String,
    rules: Vec<SarifRule>,
}

#[derive(Serialize, Deserialize)]
struct SarifRule {
    id: String,
    name: String,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
    #[serde(rename = "helpUri", skip_serializing_if = "Option::is_none")]
    help_uri: Option<String>,
    #[serde(rename = "defaultConfiguration")]
    default_config: SarifRuleConfig,
}

#[derive(Serialize, Deserialize)]
struct SarifRuleConfig {
    level: String,
}

#[derive(Serialize, Deserialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize, Deserialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize, Deserialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize, Deserialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifact,
    region: SarifRegion,
}

#[derive(Serialize, Deserialize)]
struct SarifArtifact {
    uri: String,
}

#[derive(Serialize, Deserialize)]
struct SarifRegion {
    #[serde(rename = "startLine")]
    start_line: u32,
    #[serde(rename = "startColumn", skip_serializing_if = "Option::is_none")]
    start_column: Option<u32>,
}

fn map_severity_to_level(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical | Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "note",
    }
}

/// First reference that looks like a URL, used as the rule's help link.
fn help_uri(finding: &Finding) -> Option<String> {
    finding
        .references
        .iter()
        .find(|r| r.starts_with("http://") || r.starts_with("https://"))
        .cloned()
}

pub fn render_sarif(result: &AnalysisResult) -> anyhow::Result<String> {
    // One rule per finding: backend findings carry no stable rule taxonomy.
    let rules: Vec<SarifRule> = result
        .issues
        .iter()
        .map(|f| SarifRule {
            id: f.id.clone(),
            name: f.title.clone(),
            short_description: SarifMessage {
                text: f.title.clone(),
            },
            help_uri: help_uri(f),
            default_config: SarifRuleConfig {
                level: map_severity_to_level(f.severity).to_string(),
            },
        })
        .collect();

    let results: Vec<SarifResult> = result
        .issues
        .iter()
        .map(|f| SarifResult {
            rule_id: f.id.clone(),
            level: map_severity_to_level(f.severity).to_string(),
            message: SarifMessage {
                text: if f.remediation.is_empty() {
                    f.description.clone()
                } else {
                    format!("{} Remediation: {}", f.description, f.remediation)
                },
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifact {
                        uri: f.file_path.replace('\\', "/"),
                    },
                    region: SarifRegion {
                        start_line: f.line.unwrap_or(1),
                        start_column: f.column,
                    },
                },
            }],
        })
        .collect();

    let report = SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    rules,
                },
            },
            results,
        }],
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// =============================================================================
// Terminal listings
// =============================================================================

/// Print the health report.
pub fn write_health(health: &HealthStatus) {
    println!("Service Status: {}", health.status.green());
    println!("Version: {}", health.version);

    if health.backend_available() {
        println!("LLM Service: {}", "available".green());
    } else {
        print!("LLM Service: {}", "unavailable".red());
        if let Some(error) = &health.llm_service_error {
            print!(" {}", format!("({})", error).dimmed());
        }
        println!();
    }

    println!("Supported Languages: {}", health.supported_languages.join(", "));
}

/// Print the language catalogue.
pub fn write_languages(languages: &[LanguageInfo]) {
    println!("{}", "Supported Languages:".bold());
    println!();
    for lang in languages {
        println!("  {:<18} {}", lang.identifier.cyan(), lang.description);
        println!("  {:<18} {}", "", lang.extensions.join(", ").dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisMetadata;
    use crate::language::Language;

    fn finding(id: &str, title: &str, severity: Severity) -> Finding {
        Finding {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("{} description", title),
            severity,
            line: None,
            column: None,
            file_path: "App.java".to_string(),
            code_snippet: String::new(),
            remediation: String::new(),
            references: Vec::new(),
        }
    }

    fn result(issues: Vec<Finding>) -> AnalysisResult {
        AnalysisResult {
            language: Language::Java,
            summary: "summary".to_string(),
            metadata: AnalysisMetadata {
                analysis_time: "1.50s".to_string(),
                issues_found: issues.len(),
                critical_count: 0,
                high_count: 0,
                medium_count: 0,
                low_count: 0,
                detected_language: Language::Java,
                errors: Vec::new(),
            },
            issues,
        }
    }

    #[test]
    fn test_empty_findings() {
        let text = render_findings(&[]);
        assert_eq!(text, "No security issues found.\n");
        assert!(!text.contains("##"));
    }

    #[test]
    fn test_markdown_header() {
        let text = render_markdown(&result(Vec::new()));
        assert!(text.starts_with("# Security Analysis Report\n\n**Language**: java\n\n**Analysis Time**: 1.50s\n\n## Summary\n\nsummary\n\n"));
        assert!(text.ends_with("No security issues found.\n"));
    }

    #[test]
    fn test_sections_in_severity_order_keep_finding_order() {
        let issues = vec![
            finding("1", "Low one", Severity::Low),
            finding("2", "High one", Severity::High),
            finding("3", "Critical one", Severity::Critical),
            finding("4", "High two", Severity::High),
        ];
        let text = render_findings(&issues);

        let pos = |needle: &str| text.find(needle).unwrap();
        assert!(pos("## Critical Issues") < pos("## High Severity Issues"));
        assert!(pos("## High Severity Issues") < pos("## Low Severity Issues"));
        assert!(pos("### High one") < pos("### High two"));
        assert!(!text.contains("## Medium Severity Issues"));
    }

    #[test]
    fn test_finding_details() {
        let mut f = finding("1", "SQL Injection", Severity::High);
        f.line = Some(42);
        f.column = Some(7);
        f.code_snippet = "stmt.execute(q)".to_string();
        f.remediation = "Use PreparedStatement".to_string();
        f.references = vec!["CWE-89".to_string(), "OWASP A03".to_string()];

        let text = render_findings(&[f]);
        assert!(text.contains("### SQL Injection\n\n**Severity**: HIGH\n\n**Description**: SQL Injection description\n\n"));
        assert!(text.contains("**Location**: Line 42, Column 7\n\n"));
        assert!(text.contains("**Code Snippet**:\n```\nstmt.execute(q)\n```\n\n"));
        assert!(text.contains("**Remediation**: Use PreparedStatement\n\n"));
        assert!(text.contains("**References**:\n- CWE-89\n- OWASP A03\n\n---\n\n"));
    }

    #[test]
    fn test_optional_parts_omitted() {
        let mut f = finding("1", "Weak hash", Severity::Medium);
        f.column = Some(3);
        let text = render_findings(&[f]);
        assert!(!text.contains("**Location**"));
        assert!(!text.contains("**Code Snippet**"));
        assert!(!text.contains("**Remediation**"));
        assert!(!text.contains("**References**"));
    }

    #[test]
    fn test_sarif() {
        let mut f = finding("ISSUE-1", "XSS", Severity::Medium);
        f.line = Some(9);
        f.references = vec!["CWE-79".to_string(), "https://owasp.org/xss".to_string()];
        let sarif = render_sarif(&result(vec![f, finding("ISSUE-2", "Info leak", Severity::Low)])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&sarif).unwrap();

        assert_eq!(value["version"], "2.1.0");
        let run = &value["runs"][0];
        assert_eq!(run["tool"]["driver"]["name"], "codeward");
        assert_eq!(run["tool"]["driver"]["rules"][0]["helpUri"], "https://owasp.org/xss");
        assert_eq!(run["results"][0]["level"], "warning");
        assert_eq!(run["results"][0]["locations"][0]["physicalLocation"]["region"]["startLine"], 9);
        assert_eq!(run["results"][1]["level"], "note");
        assert_eq!(run["results"][1]["locations"][0]["physicalLocation"]["region"]["startLine"], 1);
    }

    #[test]
    fn test_json_is_the_result() {
        let original = result(vec![finding("ISSUE-1", "XSS", Severity::High)]);
        let json = render(&original, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["issues"][0]["severity"], "HIGH");
        assert_eq!(value["analysis_metadata"]["analysis_time"], "1.50s");
    }
}
