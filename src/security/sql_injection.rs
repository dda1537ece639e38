//! SQL injection detection.
//!
//! Flags query-call arguments built by string concatenation, template
//! literals, or Python string formatting. Parameterized queries (`?` or
//! `$n` placeholders) are skipped.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tree_sitter::Node;

use super::first_line;
use super::types::{SecurityVulnerability, VulnKind, VulnSeverity};
use crate::lang::Lang;
use crate::tree::{self, Span, Visit};

const SQL_FUNCTIONS: &[&str] = &[
    "query",
    "queryrow",
    "querycontext",
    "exec",
    "execcontext",
    "execute",
    "executemany",
    "queryone",
];

const SQL_KEYWORDS: &[&str] = &["select", "insert", "update", "delete", "where"];

static DOLLAR_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\d").expect("static placeholder pattern"));

pub fn detect(root: Node, text: &str, lang: Lang) -> Vec<SecurityVulnerability> {
    let mut vulnerabilities = Vec::new();
    let mut reported_lines: HashSet<usize> = HashSet::new();

    tree::traverse(root, &mut |node| {
        match node.kind() {
            "call_expression" | "call" => {
                if let Some(vuln) = check_query_call(node, text, lang) {
                    if reported_lines.insert(vuln.span.line) {
                        vulnerabilities.push(vuln);
                    }
                }
            }
            // Query strings are often built in a variable first.
            "short_var_declaration" | "assignment_statement" | "assignment"
            | "variable_declarator" | "assignment_expression" => {
                if let Some(vuln) = check_query_assignment(node, text) {
                    if reported_lines.insert(vuln.span.line) {
                        vulnerabilities.push(vuln);
                    }
                }
            }
            _ => {}
        }
        Visit::Descend
    });

    vulnerabilities
}

fn check_query_call(node: Node, text: &str, lang: Lang) -> Option<SecurityVulnerability> {
    let snippet = tree::node_text(node, text);
    if has_placeholders(snippet) {
        return None;
    }
    let callee = node
        .child_by_field_name("function")
        .map(|f| tree::node_text(f, text))
        .unwrap_or("");
    if !is_sql_function(callee) {
        return None;
    }
    let tainted = match lang {
        Lang::Go => has_concatenation(snippet),
        Lang::Javascript | Lang::Typescript => {
            has_concatenation(snippet) || snippet.contains("${")
        }
        Lang::Python => has_python_formatting(snippet),
    };
    if !tainted {
        return None;
    }
    let technique = match lang {
        Lang::Python => "string formatting",
        Lang::Javascript | Lang::Typescript => "string interpolation",
        Lang::Go => "string concatenation",
    };
    Some(SecurityVulnerability {
        kind: VulnKind::SqlInjection,
        severity: VulnSeverity::Critical,
        file: String::new(),
        span: Span::from_node(&node),
        message: format!(
            "Potential SQL injection in {}: {} in SQL query",
            callee, technique
        ),
        snippet: first_line(snippet),
        description: format!("SQL query constructed using {} with user input", technique),
        remediation: remediation_for(lang).to_string(),
        confidence: 0.9,
    })
}

fn check_query_assignment(node: Node, text: &str) -> Option<SecurityVulnerability> {
    let snippet = tree::node_text(node, text);
    if has_placeholders(snippet) {
        return None;
    }
    let lowered = snippet.to_ascii_lowercase();
    let query_ish = lowered.contains("query") || lowered.contains("sql");
    let has_keyword = SQL_KEYWORDS.iter().any(|k| lowered.contains(k));
    if query_ish && has_keyword && has_concatenation(snippet) {
        return Some(SecurityVulnerability {
            kind: VulnKind::SqlInjection,
            severity: VulnSeverity::Critical,
            file: String::new(),
            span: Span::from_node(&node),
            message:
                "Potential SQL injection: query variable constructed with string concatenation"
                    .to_string(),
            snippet: first_line(snippet),
            description: "SQL query variable built using string concatenation".to_string(),
            remediation: "Use parameterized queries instead of concatenated strings"
                .to_string(),
            confidence: 0.88,
        });
    }
    None
}

fn is_sql_function(callee: &str) -> bool {
    let lowered = callee.to_ascii_lowercase();
    SQL_FUNCTIONS.iter().any(|f| lowered.contains(f))
}

fn has_placeholders(snippet: &str) -> bool {
    snippet.contains('?') || DOLLAR_PLACEHOLDER.is_match(snippet)
}

fn has_concatenation(snippet: &str) -> bool {
    snippet.contains('+') && (snippet.contains('"') || snippet.contains('\'') || snippet.contains('`'))
}

fn has_python_formatting(snippet: &str) -> bool {
    snippet.contains('%') || snippet.contains("f\"") || snippet.contains("f'")
        || snippet.contains(".format(")
        || has_concatenation(snippet)
}

fn remediation_for(lang: Lang) -> &'static str {
    match lang {
        Lang::Go => "Use parameterized queries (db.Query with ? or $1 placeholders)",
        Lang::Javascript | Lang::Typescript => {
            "Use parameterized queries or a query builder instead of interpolation"
        }
        Lang::Python => "Use parameterized queries (cursor.execute with %s placeholders)",
    }
}
