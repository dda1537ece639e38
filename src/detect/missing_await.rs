//! Missing-await detection for JavaScript/TypeScript.
//!
//! Inside an async-flagged function, a call expression that is not under
//! an `await` is flagged when its text matches an async-I/O heuristic
//! (fetch-like, `.then`, `.catch`, promise-like). This is a textual
//! precision/recall trade-off, not a type check.

use tree_sitter::Node;

use super::{Finding, FindingKind, Severity};
use crate::tree::{self, Span, Visit};

const ASYNC_HINTS: &[&str] = &["fetch", ".then", ".catch", "promise"];

const FUNCTION_KINDS: &[&str] = &[
    "function_declaration",
    "function_expression",
    "generator_function_declaration",
    "arrow_function",
    "method_definition",
];

pub fn detect(root: Node, text: &str) -> Vec<Finding> {
    let mut findings = Vec::new();
    tree::traverse(root, &mut |node| {
        if FUNCTION_KINDS.contains(&node.kind()) && is_async(node) {
            if let Some(body) = node.child_by_field_name("body") {
                scan_async_body(body, text, &mut findings);
            }
            // Nested functions get their own visit.
            return Visit::Skip;
        }
        Visit::Descend
    });
    findings
}

fn is_async(node: Node) -> bool {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == "async" {
                return true;
            }
        }
    }
    false
}

fn scan_async_body(body: Node, text: &str, findings: &mut Vec<Finding>) {
    tree::traverse(body, &mut |node| {
        // Stop at nested functions; they are handled on their own terms.
        if FUNCTION_KINDS.contains(&node.kind()) {
            return Visit::Skip;
        }
        if node.kind() == "call_expression" && !is_awaited(node) {
            let snippet = tree::node_text(node, text);
            let lowered = snippet.to_ascii_lowercase();
            if ASYNC_HINTS.iter().any(|h| lowered.contains(h)) {
                let callee = node
                    .child_by_field_name("function")
                    .map(|f| tree::node_text(f, text).to_string())
                    .unwrap_or_else(|| "call".to_string());
                findings.push(
                    Finding::new(
                        FindingKind::MissingAwait,
                        Severity::Error,
                        Span::from_node(&node),
                        format!(
                            "Missing await: asynchronous call '{}' is not awaited",
                            callee
                        ),
                    )
                    .with_snippet(first_line(snippet))
                    .with_suggestion(
                        "Add 'await', or handle the returned promise explicitly".to_string(),
                    ),
                );
                // Inner calls of a flagged chain would double-report.
                return Visit::Skip;
            }
        }
        Visit::Descend
    });
}

/// True when any ancestor inside the current statement is an await.
fn is_awaited(call: Node) -> bool {
    let mut current = call.parent();
    while let Some(parent) = current {
        match parent.kind() {
            "await_expression" => return true,
            "expression_statement" | "statement_block" | "lexical_declaration"
            | "variable_declaration" | "return_statement" => return false,
            _ => current = parent.parent(),
        }
    }
    false
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").trim().to_string()
}
