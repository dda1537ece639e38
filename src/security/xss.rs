//! Cross-site-scripting detection.
//!
//! JavaScript: dangerous DOM sinks (innerHTML/outerHTML/document.write)
//! receiving user-input-looking values. Go/Python: HTML render calls fed
//! unescaped user input.

use std::collections::HashSet;
use tree_sitter::Node;

use super::first_line;
use super::types::{SecurityVulnerability, VulnKind, VulnSeverity};
use crate::lang::Lang;
use crate::tree::{self, Span, Visit};

const DOM_SINKS: &[&str] = &["innerhtml", "outerhtml", "document.write"];

const RENDER_MARKERS: &[&str] = &[
    "executetemplate",
    "execute",
    "render_template",
    "render_to_string",
    "render",
];

const USER_INPUT_MARKERS: &[&str] = &[
    "req.", "request.", "params.", "query.", "form.", "body.", "input.", "user.", "data.",
];

const ESCAPE_MARKERS: &[&str] = &["escape", "sanitize", "html/template", "dompurify", "textcontent"];

pub fn detect(root: Node, text: &str, lang: Lang) -> Vec<SecurityVulnerability> {
    match lang {
        Lang::Javascript | Lang::Typescript => detect_dom_sinks(root, text),
        Lang::Go | Lang::Python => detect_render_calls(root, text, lang),
    }
}

fn detect_dom_sinks(root: Node, text: &str) -> Vec<SecurityVulnerability> {
    let mut vulnerabilities = Vec::new();
    let mut reported_lines: HashSet<usize> = HashSet::new();

    tree::traverse(root, &mut |node| {
        if !matches!(node.kind(), "assignment_expression" | "call_expression") {
            return Visit::Descend;
        }
        let snippet = tree::node_text(node, text);
        let lowered = snippet.to_ascii_lowercase();
        let dangerous = DOM_SINKS.iter().any(|s| lowered.contains(s));
        if !dangerous {
            return Visit::Descend;
        }
        if ESCAPE_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Visit::Descend;
        }
        let tainted = USER_INPUT_MARKERS.iter().any(|m| lowered.contains(m))
            || snippet.contains('+')
            || snippet.contains("${");
        if !tainted {
            return Visit::Descend;
        }
        let span = Span::from_node(&node);
        if reported_lines.insert(span.line) {
            vulnerabilities.push(SecurityVulnerability {
                kind: VulnKind::Xss,
                severity: VulnSeverity::High,
                file: String::new(),
                span,
                message:
                    "Potential XSS: user input assigned to innerHTML/outerHTML or passed to document.write"
                        .to_string(),
                snippet: first_line(snippet),
                description: "User input inserted into the DOM without sanitization".to_string(),
                remediation: "Use textContent instead of innerHTML, or sanitize with DOMPurify"
                    .to_string(),
                confidence: 0.9,
            });
        }
        Visit::Skip
    });
    vulnerabilities
}

fn detect_render_calls(root: Node, text: &str, lang: Lang) -> Vec<SecurityVulnerability> {
    let mut vulnerabilities = Vec::new();
    let mut reported_lines: HashSet<usize> = HashSet::new();

    tree::traverse(root, &mut |node| {
        if !matches!(node.kind(), "call_expression" | "call") {
            return Visit::Descend;
        }
        let callee = node
            .child_by_field_name("function")
            .map(|f| tree::node_text(f, text).to_ascii_lowercase())
            .unwrap_or_default();
        if !RENDER_MARKERS.iter().any(|m| callee.contains(m)) {
            return Visit::Descend;
        }
        let snippet = tree::node_text(node, text);
        let lowered = snippet.to_ascii_lowercase();
        if ESCAPE_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Visit::Descend;
        }
        if !USER_INPUT_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Visit::Descend;
        }
        let span = Span::from_node(&node);
        if reported_lines.insert(span.line) {
            let (description, remediation) = match lang {
                Lang::Python => (
                    "User input rendered in a template without auto-escaping",
                    "Rely on template auto-escaping; use mark_safe() only for trusted content",
                ),
                _ => (
                    "User input rendered in HTML without proper escaping",
                    "Use html/template with automatic escaping or html.EscapeString()",
                ),
            };
            vulnerabilities.push(SecurityVulnerability {
                kind: VulnKind::Xss,
                severity: VulnSeverity::High,
                file: String::new(),
                span,
                message: format!(
                    "Potential XSS in {}: unescaped user input in HTML output",
                    callee
                ),
                snippet: first_line(snippet),
                description: description.to_string(),
                remediation: remediation.to_string(),
                confidence: 0.85,
            });
        }
        Visit::Skip
    });
    vulnerabilities
}
