//! Hardcoded-secret detection.
//!
//! Two layers: named regex patterns over source lines, and an AST pass
//! over assignments whose left-hand name smells like a credential and
//! whose right-hand side is a string literal.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tree_sitter::Node;

use super::first_line;
use super::types::{SecurityVulnerability, VulnKind, VulnSeverity};
use crate::lang::Lang;
use crate::tree::{self, Span, Visit};

struct SecretPattern {
    name: &'static str,
    severity: VulnSeverity,
    regex: Regex,
}

static SECRET_PATTERNS: Lazy<Vec<SecretPattern>> = Lazy::new(|| {
    let compile = |name, severity, pattern: &str| SecretPattern {
        name,
        severity,
        regex: Regex::new(pattern).expect("static secret pattern"),
    };
    vec![
        compile(
            "api_key",
            VulnSeverity::Critical,
            r#"(?i)(api[_-]?key|apikey)\s*[=:]\s*["']([A-Za-z0-9_\-]{20,})["']"#,
        ),
        compile(
            "aws_key",
            VulnSeverity::Critical,
            r#"(?i)(aws[_-]?(access[_-]?key|secret[_-]?key))\s*[=:]\s*["']([A-Za-z0-9_\-+/=]{20,})["']"#,
        ),
        compile(
            "password",
            VulnSeverity::Critical,
            r#"(?i)(password|passwd|pwd)\s*[=:]\s*["']([^"']{8,})["']"#,
        ),
        compile(
            "token",
            VulnSeverity::High,
            r#"(?i)(token|bearer)\s*[=:]\s*["']([A-Za-z0-9_\-]{20,})["']"#,
        ),
        compile(
            "private_key",
            VulnSeverity::Critical,
            r#"(?i)(private[_-]?key|privkey)\s*[=:]\s*["']([A-Za-z0-9_\-+/=\s]{50,})["']"#,
        ),
    ]
});

const SECRET_KEYWORDS: &[&str] = &[
    "password",
    "secret",
    "api_key",
    "apikey",
    "token",
    "credential",
    "private_key",
    "access_key",
];

pub fn detect(root: Node, text: &str, lang: Lang) -> Vec<SecurityVulnerability> {
    let mut vulnerabilities = Vec::new();
    let mut reported_lines: HashSet<usize> = HashSet::new();

    for (idx, line) in text.lines().enumerate() {
        for pattern in SECRET_PATTERNS.iter() {
            if let Some(m) = pattern.regex.find(line) {
                let line_no = idx + 1;
                reported_lines.insert(line_no);
                vulnerabilities.push(SecurityVulnerability {
                    kind: VulnKind::HardcodedSecret,
                    severity: pattern.severity,
                    file: String::new(),
                    span: Span::point(line_no, m.start() + 1),
                    message: format!("Potential hardcoded {} detected", pattern.name),
                    snippet: line.trim().to_string(),
                    description: format!("Hardcoded {} found in source code", pattern.name),
                    remediation:
                        "Move the secret to an environment variable or a secret manager"
                            .to_string(),
                    confidence: 0.85,
                });
                break;
            }
        }
    }

    // AST layer: credential-named assignments of string literals.
    tree::traverse(root, &mut |node| {
        if !is_assignment(node, lang) {
            return Visit::Descend;
        }
        let snippet = tree::node_text(node, text);
        if looks_like_secret_assignment(snippet) {
            let span = Span::from_node(&node);
            if reported_lines.insert(span.line) {
                vulnerabilities.push(SecurityVulnerability {
                    kind: VulnKind::HardcodedSecret,
                    severity: VulnSeverity::High,
                    file: String::new(),
                    span,
                    message: "Potential hardcoded secret in variable assignment".to_string(),
                    snippet: first_line(snippet),
                    description: "Variable assignment contains a potential secret value"
                        .to_string(),
                    remediation:
                        "Move the secret to an environment variable or a secret manager"
                            .to_string(),
                    confidence: 0.8,
                });
            }
        }
        Visit::Descend
    });

    vulnerabilities
}

fn is_assignment(node: Node, lang: Lang) -> bool {
    match lang {
        Lang::Go => matches!(
            node.kind(),
            "short_var_declaration" | "assignment_statement" | "var_spec"
        ),
        Lang::Javascript | Lang::Typescript => {
            matches!(node.kind(), "variable_declarator" | "assignment_expression")
        }
        Lang::Python => node.kind() == "assignment",
    }
}

fn looks_like_secret_assignment(snippet: &str) -> bool {
    if snippet.len() <= 20 {
        return false;
    }
    let lowered = snippet.to_ascii_lowercase();
    if !SECRET_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return false;
    }
    // The value must itself be a string literal, not a lookup.
    match snippet.split_once('=') {
        Some((_, value)) => {
            let value = value.trim_start_matches('=').trim();
            value.starts_with('"') || value.starts_with('\'') || value.starts_with('`')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::parse_for_tests;

    fn run(lang: Lang, src: &str) -> Vec<SecurityVulnerability> {
        let tree = parse_for_tests(lang, src);
        detect(tree.root_node(), src, lang)
    }

    #[test]
    fn api_key_literal_is_critical() {
        let src = "const apiKey = 'abcd1234abcd1234abcd1234';\nconst API_KEY = \"abcd1234abcd1234abcd1234\";\n";
        let vulns = run(Lang::Javascript, src);
        assert!(!vulns.is_empty());
        assert!(vulns.iter().any(|v| v.severity == VulnSeverity::Critical));
        assert!(vulns.iter().all(|v| v.kind == VulnKind::HardcodedSecret));
    }

    #[test]
    fn password_literal_is_detected_in_python() {
        let src = "password = \"hunter2hunter2\"\n";
        let vulns = run(Lang::Python, src);
        assert!(!vulns.is_empty());
        assert_eq!(vulns[0].span.line, 1);
    }

    #[test]
    fn go_assignment_heuristic_fires() {
        let src = "package main\nfunc f() {\n\taccessKeySecret := \"some-long-literal-value\"\n\t_ = accessKeySecret\n}\n";
        let vulns = run(Lang::Go, src);
        assert!(!vulns.is_empty());
    }

    #[test]
    fn env_lookup_is_clean() {
        let src = "import os\npassword = os.environ['DB_PASSWORD']\n";
        assert!(run(Lang::Python, src).is_empty());
    }

    #[test]
    fn short_values_are_ignored() {
        let src = "pwd = \"x\"\n";
        assert!(run(Lang::Python, src).is_empty());
    }
}
