//! Two-stage language classification.
//!
//! The extension stage maps a file suffix to a tag. Extensions shared by two
//! dialects (`.ts`, `.js`) are only trusted when the content stage agrees.
//! The content stage scores every language by the number of its signatures
//! that match the code; the first language (in registration order) with the
//! strictly highest non-zero score wins.

use lazy_static::lazy_static;
use phf::phf_map;
use regex::Regex;
use std::path::Path;

use super::Language;

/// Extension (lowercase, no dot) to `(language, needs content confirmation)`.
static EXTENSIONS: phf::Map<&'static str, (Language, bool)> = phf_map! {
    "java" => (Language::Java, false),
    "cs" => (Language::CSharp, false),
    "tsx" => (Language::ReactTypescript, false),
    "ts" => (Language::ReactTypescript, true),
    "jsx" => (Language::ReactJavascript, false),
    "js" => (Language::ReactJavascript, true),
};

lazy_static! {
    /// Content signatures per language, in registration order.
    static ref SIGNATURES: Vec<(Language, Vec<Regex>)> = vec![
        (
            Language::Java,
            vec![
                Regex::new(r"package\s+[a-z][a-z0-9_.]*;").unwrap(),
                Regex::new(r"import\s+(java|javax|org)\.").unwrap(),
                Regex::new(r"public\s+(class|interface|enum)\s+\w+").unwrap(),
                Regex::new(r"@(Override|Autowired|Entity|Controller|Service|Repository)").unwrap(),
                Regex::new(r"(public|private|protected)\s+(static\s+)?(void|int|String|boolean)").unwrap(),
            ],
        ),
        (
            Language::CSharp,
            vec![
                Regex::new(r"using\s+System").unwrap(),
                Regex::new(r"namespace\s+\w+").unwrap(),
                Regex::new(r"(public|private|protected)\s+(class|interface|struct)\s+\w+").unwrap(),
                Regex::new(r"\[assembly:\s*\w+").unwrap(),
                Regex::new(r"(async\s+)?Task<").unwrap(),
            ],
        ),
        (
            Language::ReactTypescript,
            vec![
                Regex::new(r#"import\s+.*from\s+['"]react['"]"#).unwrap(),
                Regex::new(r"interface\s+\w+\s*\{").unwrap(),
                Regex::new(r"type\s+\w+\s*=").unwrap(),
                Regex::new(r":\s*(React\.)?FC<").unwrap(),
                // JSX/TSX tag
                Regex::new(r"<\w+[^>]*>").unwrap(),
            ],
        ),
        (
            Language::ReactJavascript,
            vec![
                Regex::new(r#"import\s+.*from\s+['"]react['"]"#).unwrap(),
                Regex::new(r"React\.createElement").unwrap(),
                Regex::new(r"useState|useEffect|useCallback|useMemo").unwrap(),
                Regex::new(r"<\w+[^>]*>").unwrap(),
                Regex::new(r"export\s+(default\s+)?(function|const)\s+\w+").unwrap(),
            ],
        ),
    ];
}

/// Map a file path to a language by its extension alone.
///
/// Returns `Unknown` for empty paths, missing extensions and unmapped ones.
pub fn detect_from_extension(file_path: &str) -> Language {
    extension_rule(file_path)
        .map(|(lang, _)| lang)
        .unwrap_or(Language::Unknown)
}

fn extension_rule(file_path: &str) -> Option<(Language, bool)> {
    if file_path.is_empty() {
        return None;
    }
    let ext = Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();
    EXTENSIONS.get(ext.as_str()).copied()
}

/// Score the code against every language's signatures.
///
/// Scores are returned in registration order.
pub fn content_scores(code: &str) -> Vec<(Language, usize)> {
    SIGNATURES
        .iter()
        .map(|(lang, patterns)| {
            let score = patterns.iter().filter(|p| p.is_match(code)).count();
            (*lang, score)
        })
        .collect()
}

/// Classify code by its content alone.
pub fn detect_from_content(code: &str) -> Language {
    let mut best = Language::Unknown;
    let mut best_score = 0;

    for (lang, score) in content_scores(code) {
        // Strict comparison keeps the earliest-registered language on ties.
        if score > best_score {
            best_score = score;
            best = lang;
        }
    }

    best
}

/// Language classifier combining the extension and content stages.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier;

impl Classifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify a code fragment, using the file path when one is given.
    pub fn classify(&self, code: &str, file_path: Option<&str>) -> Language {
        let path = file_path.unwrap_or("");

        if let Some((lang, needs_confirmation)) = extension_rule(path) {
            if !needs_confirmation {
                tracing::debug!(path, language = %lang, "classified by extension");
                return lang;
            }

            let by_content = detect_from_content(code);
            if by_content == lang {
                tracing::debug!(path, language = %lang, "extension confirmed by content");
                return lang;
            }
            tracing::debug!(
                path,
                extension = %lang,
                content = %by_content,
                "ambiguous extension not confirmed, using content verdict"
            );
            return by_content;
        }

        detect_from_content(code)
    }
}
