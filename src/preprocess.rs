//! Source preprocessing before code is sent to the backend.
//!
//! Comments are stripped so the model judges code rather than prose, but
//! every newline survives: line numbers reported by the backend must still
//! point at the original source.

/// How comments are removed for a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `/* block */` and `// line` comments (Java, C#, JS/TS).
    CStyle,
    /// Leave the code untouched.
    None,
}

impl CommentStyle {
    pub fn strip(&self, code: &str) -> String {
        match self {
            CommentStyle::CStyle => strip_c_style(code),
            CommentStyle::None => code.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    /// Inside a literal opened by this quote.
    Str(char),
    Block,
    Line,
}

/// Remove C-style comments in one pass, keeping every `\n` and `\r`.
///
/// Comment openers inside string literals are code. `"` and `'` literals end
/// at a newline at the latest; backtick templates may span lines. A `'`
/// directly after a word character is an apostrophe (`Don't` in JSX text),
/// not a literal.
pub fn strip_c_style(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut state = Scan::Code;
    let mut prev: Option<char> = None;
    let mut chars = code.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            Scan::Code => match ch {
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = Scan::Block;
                }
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    state = Scan::Line;
                }
                '\'' if matches!(prev, Some(c) if is_word_char(c)) => out.push(ch),
                '"' | '\'' | '`' => {
                    state = Scan::Str(ch);
                    out.push(ch);
                }
                _ => out.push(ch),
            },
            Scan::Str(quote) => {
                out.push(ch);
                if ch == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if ch == quote || (ch == '\n' && quote != '`') {
                    state = Scan::Code;
                }
            }
            Scan::Block => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = Scan::Code;
                } else if ch == '\n' || ch == '\r' {
                    out.push(ch);
                }
            }
            Scan::Line => match ch {
                '\n' => {
                    out.push(ch);
                    state = Scan::Code;
                }
                '\r' => out.push(ch),
                _ => {}
            },
        }
        prev = Some(ch);
    }
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_preserves_line_count() {
        let code = "/**\n * Docs\n */\npublic class A {\n    // note\n    int x = 1; /* inline */ int y = 2;\n}\n";
        let stripped = strip_c_style(code);
        assert_eq!(stripped.lines().count(), code.lines().count());
        assert_eq!(stripped.matches('\n').count(), code.matches('\n').count());

        let lines: Vec<&str> = stripped.split('\n').collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[3], "public class A {");
        assert_eq!(lines[4], "    ");
        assert_eq!(lines[5], "    int x = 1;  int y = 2;");
    }

    #[test]
    fn test_line_comment_inside_string_kept() {
        let code = r#"String url = "http://example.org"; // fetch"#;
        assert_eq!(strip_c_style(code), r#"String url = "http://example.org"; "#);
    }

    #[test]
    fn test_crlf_kept() {
        let code = "int a; // one\r\nint b;\r\n";
        assert_eq!(strip_c_style(code), "int a; \r\nint b;\r\n");
    }

    #[test]
    fn test_none_style_passes_through() {
        let code = "# python comment\n// not ours";
        assert_eq!(CommentStyle::None.strip(code), code);
    }

    #[test]
    fn test_block_opener_inside_string_kept() {
        let code = concat!(
            "@GetMapping(\"/api/*\")\n",
            "public List<User> find(String q) {\n",
            "    return jdbc.query(\"SELECT * FROM users WHERE name = '\" + q + \"'\");\n",
            "}\n",
            "/** docs */\n",
            "class B {}\n",
        );
        let stripped = strip_c_style(code);
        assert!(stripped.contains("@GetMapping(\"/api/*\")"));
        assert!(stripped.contains("jdbc.query(\"SELECT * FROM users"));
        assert!(!stripped.contains("docs"));
        assert!(stripped.contains("class B {}"));
        assert_eq!(stripped.matches('\n').count(), code.matches('\n').count());
    }

    #[test]
    fn test_template_literal_spans_lines() {
        let code = "const q = `a\n/* kept */ // kept`; // gone\nx();";
        assert_eq!(strip_c_style(code), "const q = `a\n/* kept */ // kept`; \nx();");
    }

    #[test]
    fn test_quotes_and_apostrophes() {
        assert_eq!(strip_c_style("<p>Don't</p> // note"), "<p>Don't</p> ");
        assert_eq!(strip_c_style("char c = '/'; // slash"), "char c = '/'; ");
        assert_eq!(strip_c_style(r#"char q = '"'; // quote"#), r#"char q = '"'; "#);
        assert_eq!(
            strip_c_style(r#"String s = "a \" // b"; // c"#),
            r#"String s = "a \" // b"; "#
        );
    }

    #[test]
    fn test_unterminated_string_ends_at_newline() {
        let code = "String s = \"open\n/* gone */ int x;";
        assert_eq!(strip_c_style(code), "String s = \"open\n int x;");
    }
}
