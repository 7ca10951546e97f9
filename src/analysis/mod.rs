//! The analysis pipeline.
//!
//! One pipeline serves every language; what differs per language is plain
//! data held in an [`AnalyzerProfile`]:
//!
//! - the rule prompt sent to the backend (`rules.rs`)
//! - the comment-stripping rule applied before sending (`preprocess.rs`)
//!
//! A run is: preprocess, call the backend once, extract the JSON payload
//! from the reply (`extract.rs`), then enrich and count the findings.

mod extract;
mod rules;
mod types;

pub use extract::{
    decode_findings, extract_json, parse_reply, ExtractStrategy, ExtractionError, RawFinding,
};
pub use rules::rules_prompt;
pub use types::{AnalysisMetadata, AnalysisResult, Finding, Severity};

use std::collections::HashSet;
use std::time::Instant;

use crate::backend::Backend;
use crate::error::AnalysisError;
use crate::language::Language;
use crate::preprocess::CommentStyle;

/// Everything the pipeline needs to know about one language.
#[derive(Debug, Clone)]
pub struct AnalyzerProfile {
    pub language: Language,
    pub rules: String,
    pub comment_style: CommentStyle,
}

impl AnalyzerProfile {
    /// Built-in profile for a language, `None` for [`Language::Unknown`].
    pub fn for_language(language: Language) -> Option<Self> {
        Some(Self {
            language,
            rules: rules_prompt(language)?,
            comment_style: CommentStyle::CStyle,
        })
    }

    /// Built-in profiles for every known language, in registration order.
    pub fn builtin() -> Vec<Self> {
        Language::KNOWN
            .into_iter()
            .filter_map(Self::for_language)
            .collect()
    }
}

/// Run one analysis against the backend.
///
/// Backend failures become [`AnalysisError::Backend`]; a reply that holds no
/// decodable findings becomes [`AnalysisError::Extraction`]. Neither is retried.
pub async fn run(
    backend: &dyn Backend,
    profile: &AnalyzerProfile,
    code: &str,
    file_path: Option<&str>,
) -> Result<AnalysisResult, AnalysisError> {
    let started = Instant::now();
    let cleaned = profile.comment_style.strip(code);

    let reply = backend.analyze(&cleaned, &profile.rules).await?;
    let raw = parse_reply(&reply)?;

    let mut errors = Vec::new();
    let issues = enrich(raw, file_path.unwrap_or(""), &mut errors);
    for note in &errors {
        tracing::warn!("{}", note);
    }

    let metadata = build_metadata(&issues, profile.language, started, errors);
    let summary = summarize(&metadata);
    tracing::info!(
        language = %profile.language,
        issues = metadata.issues_found,
        elapsed = %metadata.analysis_time,
        "analysis complete"
    );

    Ok(AnalysisResult {
        language: profile.language,
        issues,
        summary,
        metadata,
    })
}

/// Turn raw backend findings into typed ones.
///
/// Missing ids become `ISSUE-<position>`, bumped past any id already taken.
/// Missing file paths come from the request. Unknown severities are kept as
/// LOW with a note in `errors`.
pub fn enrich(raw: Vec<RawFinding>, file_path: &str, errors: &mut Vec<String>) -> Vec<Finding> {
    let mut taken: HashSet<String> = raw.iter().filter_map(RawFinding::id_text).collect();

    raw.into_iter()
        .enumerate()
        .map(|(index, r)| {
            let id = match r.id_text() {
                Some(id) => id,
                None => {
                    let mut n = index + 1;
                    while taken.contains(&format!("ISSUE-{}", n)) {
                        n += 1;
                    }
                    let id = format!("ISSUE-{}", n);
                    taken.insert(id.clone());
                    id
                }
            };

            let severity = match r.severity.as_deref().map(str::parse::<Severity>) {
                Some(Ok(severity)) => severity,
                Some(Err(_)) | None => {
                    errors.push(format!(
                        "finding {}: unrecognised severity {:?}, recorded as LOW",
                        id,
                        r.severity.as_deref().unwrap_or("")
                    ));
                    Severity::Low
                }
            };

            Finding {
                severity,
                line: extract::position(&r.line_number),
                column: extract::position(&r.column_number),
                file_path: r
                    .file_path
                    .filter(|p| !p.is_empty())
                    .unwrap_or_else(|| file_path.to_string()),
                title: r.title.unwrap_or_default(),
                description: r.description.unwrap_or_default(),
                code_snippet: r.code_snippet.unwrap_or_default(),
                remediation: r.remediation.unwrap_or_default(),
                references: r.references.unwrap_or_default(),
                id,
            }
        })
        .collect()
}

fn build_metadata(
    issues: &[Finding],
    language: Language,
    started: Instant,
    errors: Vec<String>,
) -> AnalysisMetadata {
    let count = |severity| issues.iter().filter(|f| f.severity == severity).count();
    AnalysisMetadata {
        analysis_time: format!("{:.2?}", started.elapsed()),
        issues_found: issues.len(),
        critical_count: count(Severity::Critical),
        high_count: count(Severity::High),
        medium_count: count(Severity::Medium),
        low_count: count(Severity::Low),
        detected_language: language,
        errors,
    }
}

/// One-sentence summary of the counts.
pub fn summarize(metadata: &AnalysisMetadata) -> String {
    if metadata.issues_found == 0 {
        return "No security issues detected.".to_string();
    }
    format!(
        "Found {} security issue(s): {} critical, {} high, {} medium, {} low.",
        metadata.issues_found,
        metadata.critical_count,
        metadata.high_count,
        metadata.medium_count,
        metadata.low_count
    )
}
