//! Security rule prompts sent to the backend, one per language.

use crate::language::Language;

const OUTPUT_FORMAT: &str = r#"Return findings as a JSON array of security issues with this structure:
[
  {
    "id": "unique-id",
    "title": "Issue title",
    "description": "Detailed description",
    "severity": "CRITICAL|HIGH|MEDIUM|LOW",
    "line_number": 0,
    "column_number": 0,
    "code_snippet": "vulnerable code",
    "remediation": "How to fix",
    "references": ["OWASP reference", "CWE-XXX"]
  }
]

Report only real vulnerabilities, with line numbers and code snippets. If no issues are found, return an empty array []."#;

const JAVA_RULES: &str = r#"Analyze the following Java code for security vulnerabilities. Check for:

INJECTION:
1. SQL Injection - string concatenation in queries, Statement instead of PreparedStatement
2. Command Injection - Runtime.exec() or ProcessBuilder with unsanitized input
3. LDAP Injection - unescaped input in LDAP filters
4. XXE - DocumentBuilderFactory/SAXParser with external entities enabled
5. JNDI Injection - Context.lookup() with user-controlled names
6. Expression Language Injection - untrusted input in SpEL, OGNL, JSP/JSF EL

CRYPTOGRAPHY:
7. Weak algorithms - DES, 3DES, RC4, MD5, SHA1, ECB mode, hardcoded keys
8. Insecure randomness - java.util.Random or Math.random() for secrets
9. Broken TLS - trust-all certificate managers, disabled hostname verification

DESERIALIZATION:
10. ObjectInputStream.readObject() or XMLDecoder on untrusted data

AUTHENTICATION & SESSION:
11. Hardcoded credentials, API keys and secrets
12. Session fixation, session ids in URLs, missing timeouts
13. Missing authentication or authorization checks

FILES & RESOURCES:
14. Path Traversal - user input in file paths, unchecked ../ sequences
15. Unrestricted file upload - no type or size validation
16. Resource leaks - streams and connections outside try-with-resources

REFLECTION & SERVER-SIDE:
17. Unsafe reflection - Class.forName() or Method.invoke() with user input
18. SSRF - outbound requests to user-controlled URLs
19. Open redirects - sendRedirect() with unvalidated input

INPUT HANDLING:
20. ReDoS - nested quantifiers on untrusted input
21. Log injection - unsanitized input written to logs
22. Mass assignment - binding request data straight onto entities
23. XML bombs - unlimited entity expansion

CONCURRENCY & NATIVE:
24. Race conditions - check-then-act on shared state without synchronization
25. JNI calls with unchecked arguments"#;

const CSHARP_RULES: &str = r#"Analyze the following C# code for security vulnerabilities. Check for:

INJECTION:
1. SQL Injection - string concatenation in SqlCommand text, missing parameters
2. Command Injection - Process.Start() with unsanitized input
3. LDAP Injection - unescaped input in DirectorySearcher filters
4. XML Injection - XmlDocument/XmlReader with DTD processing enabled

CRYPTOGRAPHY:
5. Weak algorithms - DES, MD5, SHA1, hardcoded keys or IVs
6. Insecure randomness - System.Random for security-sensitive values
7. Weak password hashing - plain text or fast unsalted hashes

DESERIALIZATION:
8. BinaryFormatter, NetDataContractSerializer, or TypeNameHandling.All on untrusted data

AUTHENTICATION & AUTHORIZATION:
9. Hardcoded secrets - passwords, API keys, connection strings
10. Missing [Authorize] or manual authorization checks
11. Insecure session handling - missing expiry, predictable ids

FILES:
12. Path Traversal - Path.Combine or File APIs with user input
13. Unrestricted file upload

INPUT & OUTPUT:
14. Missing input validation, regex without timeouts
15. Cross-Site Scripting - Html.Raw or unencoded output

CODE EXECUTION:
16. Dynamic compilation or scripting with user input
17. Unsafe reflection - Type.GetType() or Assembly.Load() with user input

CONFIGURATION:
18. Debug mode or developer exception pages in production
19. Information disclosure - stack traces or internal details in responses
20. Insecure direct object references

WEB:
21. Missing anti-forgery tokens
22. Cookies without HttpOnly or Secure flags
23. Open redirects - Redirect() with unvalidated input"#;

const REACT_RULES: &str = r#"Analyze the following React code for security vulnerabilities. Check for:

CROSS-SITE SCRIPTING:
1. dangerouslySetInnerHTML without sanitization
2. User input rendered into the DOM outside React escaping
3. javascript: or data: URLs in href/src built from user input
4. User-controlled event handler or attribute values

STATE & PROPS:
5. Secrets or sensitive data kept in client-side state
6. Security-relevant props without validation
7. Direct state mutation that bypasses checks

API & DATA:
8. Hardcoded API keys or credentials
9. Missing CSRF protection on state-changing requests
10. Sensitive endpoints or data exposed to the client
11. Sensitive data in localStorage or sessionStorage

AUTHENTICATION & AUTHORIZATION:
12. Authorization decided purely on the client
13. Tokens stored where scripts can read them
14. Routes or components without access control

INPUT:
15. Client-only form validation
16. Unrestricted file uploads
17. Regular expressions vulnerable to ReDoS

CONFIGURATION:
18. console.log of sensitive data, debug flags left on
19. Error messages exposing internals
20. Dependencies with known vulnerabilities

REACT-SPECIFIC:
21. Refs used for direct DOM manipulation of untrusted content
22. Untrusted third-party components
23. eval(), new Function() or other dynamic code execution"#;

const TYPESCRIPT_RULES: &str = r#"TYPESCRIPT-SPECIFIC:
24. `any` used for security-critical data
25. Type assertions that bypass validation
26. Missing null/undefined guards on untrusted values"#;

/// Rule prompt for a language, or `None` when no analyzer exists for it.
pub fn rules_prompt(language: Language) -> Option<String> {
    let body = match language {
        Language::Java => JAVA_RULES.to_string(),
        Language::CSharp => CSHARP_RULES.to_string(),
        Language::ReactJavascript => REACT_RULES.to_string(),
        Language::ReactTypescript => format!("{}\n\n{}", REACT_RULES, TYPESCRIPT_RULES),
        Language::Unknown => return None,
    };
    Some(format!("{}\n\n{}", body, OUTPUT_FORMAT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_language_has_rules() {
        for lang in Language::KNOWN {
            let prompt = rules_prompt(lang).unwrap();
            assert!(prompt.contains("\"severity\": \"CRITICAL|HIGH|MEDIUM|LOW\""));
        }
        assert!(rules_prompt(Language::Unknown).is_none());
    }

    #[test]
    fn test_typescript_section_only_for_typescript() {
        let ts = rules_prompt(Language::ReactTypescript).unwrap();
        let js = rules_prompt(Language::ReactJavascript).unwrap();
        assert!(ts.contains("TYPESCRIPT-SPECIFIC"));
        assert!(!js.contains("TYPESCRIPT-SPECIFIC"));
        assert!(rules_prompt(Language::Java).unwrap().starts_with("Analyze the following Java code"));
    }
}
