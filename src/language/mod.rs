//! Supported languages and the static catalogue describing them.

mod detect;

pub use detect::{detect_from_content, detect_from_extension, Classifier};

use serde::{Deserialize, Serialize};

/// Language tags understood by the classifier and the analyzers.
///
/// Variant order is the registration order: it decides content-stage ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Java,
    #[serde(rename = "csharp")]
    CSharp,
    ReactTypescript,
    ReactJavascript,
    Unknown,
}

impl Language {
    /// Every classifiable language, in registration order.
    pub const KNOWN: [Language; 4] = [
        Language::Java,
        Language::CSharp,
        Language::ReactTypescript,
        Language::ReactJavascript,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::CSharp => "csharp",
            Language::ReactTypescript => "react_typescript",
            Language::ReactJavascript => "react_javascript",
            Language::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "java" => Some(Language::Java),
            "csharp" => Some(Language::CSharp),
            "react_typescript" => Some(Language::ReactTypescript),
            "react_javascript" => Some(Language::ReactJavascript),
            "unknown" => Some(Language::Unknown),
            _ => None,
        }
    }

    /// Human-readable name used in catalogue output.
    pub fn description(&self) -> &'static str {
        match self {
            Language::Java => "Java programming language",
            Language::CSharp => "C# programming language",
            Language::ReactTypescript => "React with TypeScript",
            Language::ReactJavascript => "React with JavaScript",
            Language::Unknown => "Unrecognized language",
        }
    }

    /// File extensions (with leading dot) associated with this language.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Java => &[".java"],
            Language::CSharp => &[".cs"],
            Language::ReactTypescript => &[".tsx", ".ts"],
            Language::ReactJavascript => &[".jsx", ".js"],
            Language::Unknown => &[],
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Catalogue entry for a supported language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    pub identifier: String,
    pub description: String,
    pub extensions: Vec<String>,
}

impl From<Language> for LanguageInfo {
    fn from(lang: Language) -> Self {
        Self {
            identifier: lang.as_str().to_string(),
            description: lang.description().to_string(),
            extensions: lang.extensions().iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// The static language catalogue, in registration order.
pub fn supported_languages() -> Vec<LanguageInfo> {
    Language::KNOWN.iter().copied().map(LanguageInfo::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_tags() {
        for lang in Language::KNOWN {
            assert_eq!(Language::parse(lang.as_str()), Some(lang));
        }
        assert_eq!(Language::parse("python"), None);
        assert_eq!(Language::parse("auto"), None);
    }

    #[test]
    fn test_serde_uses_tags() {
        let json = serde_json::to_string(&Language::CSharp).unwrap();
        assert_eq!(json, "\"csharp\"");
        let lang: Language = serde_json::from_str("\"react_typescript\"").unwrap();
        assert_eq!(lang, Language::ReactTypescript);
    }

    #[test]
    fn test_supported_languages() {
        let languages = supported_languages();
        assert_eq!(languages.len(), 4);
        let ids: Vec<&str> = languages.iter().map(|l| l.identifier.as_str()).collect();
        assert_eq!(
            ids,
            vec!["java", "csharp", "react_typescript", "react_javascript"]
        );
        assert_eq!(languages[2].extensions, vec![".tsx", ".ts"]);
    }
}
