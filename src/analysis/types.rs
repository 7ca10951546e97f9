//! Core types for analysis results.

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Severity of a finding, ordered by urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Report order: most urgent first.
    pub const REPORT_ORDER: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// A single reported security issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    #[serde(rename = "line_number", skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(rename = "column_number", skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub file_path: String,
    pub code_snippet: String,
    pub remediation: String,
    #[serde(default)]
    pub references: Vec<String>,
}

/// Metadata about one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// Elapsed wall time, human formatted (e.g. `1.52s`).
    pub analysis_time: String,
    pub issues_found: usize,
    pub critical_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
    pub low_count: usize,
    pub detected_language: Language,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl AnalysisMetadata {
    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical_count,
            Severity::High => self.high_count,
            Severity::Medium => self.medium_count,
            Severity::Low => self.low_count,
        }
    }
}

/// Output of the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub language: Language,
    /// Findings in the backend's emission order.
    pub issues: Vec<Finding>,
    pub summary: String,
    #[serde(rename = "analysis_metadata")]
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// Findings of one severity, in their original order.
    pub fn issues_with(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.issues.iter().filter(move |f| f.severity == severity)
    }

    /// Highest severity present, if any.
    pub fn max_severity(&self) -> Option<Severity> {
        self.issues.iter().map(|f| f.severity).max()
    }
}
