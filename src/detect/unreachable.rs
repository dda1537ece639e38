//! Unreachable-code detection.
//!
//! Scans each block's statements in order; once a terminating statement is
//! seen, every later statement in the same block is unreachable. An
//! `if (true) { <terminator> }` guard counts as terminating.

use tree_sitter::Node;

use super::{Finding, FindingKind, FixKind, Severity};
use crate::lang::Lang;
use crate::tree::{self, Span, Visit};

/// Calls that end control flow even though they parse as plain calls.
const EXIT_CALLS: &[&str] = &[
    "os.Exit",
    "panic",
    "log.Fatal",
    "log.Fatalf",
    "log.Fatalln",
    "process.exit",
    "sys.exit",
    "os._exit",
    "exit",
    "quit",
];

pub fn detect(root: Node, text: &str, lang: Lang) -> Vec<Finding> {
    let block_kind = match lang {
        Lang::Go => "block",
        Lang::Javascript | Lang::Typescript => "statement_block",
        Lang::Python => "block",
    };

    let mut findings = Vec::new();
    tree::traverse(root, &mut |node| {
        if node.kind() == block_kind {
            scan_block(node, text, lang, &mut findings);
        }
        Visit::Descend
    });
    findings
}

fn scan_block(block: Node, text: &str, lang: Lang, findings: &mut Vec<Finding>) {
    let mut cursor = block.walk();
    let mut terminated = false;
    for child in block.named_children(&mut cursor) {
        if child.kind() == "comment" {
            continue;
        }
        if terminated {
            findings.push(
                Finding::new(
                    FindingKind::UnreachableCode,
                    Severity::Warning,
                    Span::from_node(&child),
                    "Unreachable code: statement appears after a terminating statement"
                        .to_string(),
                )
                .with_snippet(first_line(tree::node_text(child, text)))
                .with_suggestion(
                    "Remove the unreachable statement or restructure the control flow"
                        .to_string(),
                )
                .with_fix(FixKind::Delete),
            );
            continue;
        }
        if terminates(child, text, lang) {
            terminated = true;
        }
    }
}

/// Whether a statement ends control flow in its block.
fn terminates(node: Node, text: &str, lang: Lang) -> bool {
    match node.kind() {
        "return_statement" | "throw_statement" | "raise_statement" | "break_statement"
        | "continue_statement" => true,
        "expression_statement" => {
            let mut cursor = node.walk();
            let exits = node
                .named_children(&mut cursor)
                .any(|c| is_exit_call(c, text));
            exits
        }
        // Go statements are not wrapped in expression_statement.
        "call_expression" | "call" => is_exit_call(node, text),
        "if_statement" => if_true_terminates(node, text, lang),
        _ => false,
    }
}

fn is_exit_call(node: Node, text: &str) -> bool {
    if !matches!(node.kind(), "call_expression" | "call") {
        return false;
    }
    let Some(function) = node.child_by_field_name("function") else {
        return false;
    };
    let callee = tree::node_text(function, text);
    EXIT_CALLS.contains(&callee)
}

/// `if (true) { return }` and its Go/Python spellings terminate.
fn if_true_terminates(node: Node, text: &str, lang: Lang) -> bool {
    let Some(condition) = node.child_by_field_name("condition") else {
        return false;
    };
    let cond_text = tree::node_text(condition, text)
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim();
    let literally_true = match lang {
        Lang::Python => cond_text == "True",
        _ => cond_text == "true",
    };
    if !literally_true {
        return false;
    }
    let Some(consequence) = node.child_by_field_name("consequence") else {
        return false;
    };
    block_terminates(consequence, text, lang)
}

fn block_terminates(block: Node, text: &str, lang: Lang) -> bool {
    let mut cursor = block.walk();
    let terminated = block
        .named_children(&mut cursor)
        .any(|child| terminates(child, text, lang));
    terminated
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").trim().to_string()
}
