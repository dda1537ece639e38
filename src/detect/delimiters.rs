//! Delimiter-mismatch detection.
//!
//! The parser is error-tolerant: invalid regions surface as explicit error
//! nodes rather than a failed parse. This detector classifies the likely
//! delimiter family by substring search inside the erroring span and emits
//! a language-tailored hint.

use std::collections::HashSet;
use tree_sitter::Node;

use super::{Finding, FindingKind, FixKind, Severity};
use crate::lang::Lang;
use crate::tree::{self, Span, Visit};

pub fn detect(root: Node, text: &str, lang: Lang) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut reported_lines: HashSet<usize> = HashSet::new();

    tree::traverse(root, &mut |node| {
        if !(node.is_error() || node.is_missing()) {
            return Visit::Descend;
        }
        let span = Span::from_node(&node);
        // Error nodes nest; one report per line is enough.
        if !reported_lines.insert(span.line) {
            return Visit::Descend;
        }
        let snippet = tree::node_text(node, text);
        let family = classify(snippet, lang);
        findings.push(
            Finding::new(
                FindingKind::DelimiterMismatch,
                Severity::Error,
                span,
                format!("Delimiter mismatch: possible unbalanced {}", family),
            )
            .with_snippet(first_line(snippet))
            .with_suggestion(hint(lang).to_string())
            .with_confidence(0.9)
            .with_fix(FixKind::Error),
        );
        Visit::Descend
    });
    findings
}

fn classify(snippet: &str, lang: Lang) -> &'static str {
    if lang.is_js_family() && snippet.contains('`') {
        return "template literal";
    }
    if snippet.contains('{') || snippet.contains('}') {
        "braces"
    } else if snippet.contains('[') || snippet.contains(']') {
        "brackets"
    } else if snippet.contains('(') || snippet.contains(')') {
        "parentheses"
    } else {
        "delimiters"
    }
}

fn hint(lang: Lang) -> &'static str {
    match lang {
        Lang::Go => "Check that braces match in function and block declarations",
        Lang::Javascript | Lang::Typescript => {
            "Check braces, parentheses and template literals for balance"
        }
        Lang::Python => {
            "Check brackets and parentheses; Python blocks are indentation-based"
        }
    }
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::parse_for_tests;

    fn run(lang: Lang, src: &str) -> Vec<Finding> {
        let tree = parse_for_tests(lang, src);
        detect(tree.root_node(), src, lang)
    }

    #[test]
    fn unbalanced_go_brace_is_reported() {
        let src = "package main\nfunc f() {\n\tprintln(1)\n";
        let findings = run(Lang::Go, src);
        assert!(!findings.is_empty());
        assert_eq!(findings[0].kind, FindingKind::DelimiterMismatch);
        assert_eq!(findings[0].severity, Severity::Error);
    }

    #[test]
    fn unbalanced_javascript_paren_is_reported() {
        let src = "function f( { return 1; }";
        let findings = run(Lang::Javascript, src);
        assert!(!findings.is_empty());
    }

    #[test]
    fn python_hint_mentions_indentation() {
        let src = "def f(:\n    pass\n";
        let findings = run(Lang::Python, src);
        assert!(!findings.is_empty());
        assert!(findings[0].suggestion.contains("indentation"));
    }

    #[test]
    fn valid_source_yields_nothing() {
        let src = "package main\nfunc f() {\n\tprintln(1)\n}\n";
        assert!(run(Lang::Go, src).is_empty());
    }

    #[test]
    fn findings_are_deduplicated_per_line() {
        let src = "function f() { if (x { } }";
        let findings = run(Lang::Javascript, src);
        let lines: HashSet<usize> = findings.iter().map(|f| f.span.line).collect();
        assert_eq!(lines.len(), findings.len());
    }
}
