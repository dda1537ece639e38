//! Empty catch/except detection.
//!
//! A handler body is "empty" when, after stripping comments, it has no
//! statement at all, or (Python) its only statements are `pass`. A lone
//! `pass` is a structural no-op and must not mask silent suppression.

use tree_sitter::Node;

use super::{Finding, FindingKind, FixKind, Severity};
use crate::lang::Lang;
use crate::tree::{self, Span, Visit};

pub fn detect(root: Node, text: &str, lang: Lang) -> Vec<Finding> {
    let mut findings = Vec::new();
    match lang {
        Lang::Javascript | Lang::Typescript => {
            tree::traverse(root, &mut |node| {
                if node.kind() == "catch_clause" {
                    if let Some(body) = node.child_by_field_name("body") {
                        if body_is_empty(body, lang) {
                            findings.push(make_finding(
                                node,
                                text,
                                "Empty catch block: errors are silently ignored",
                            ));
                        }
                    }
                }
                Visit::Descend
            });
        }
        Lang::Python => {
            tree::traverse(root, &mut |node| {
                if node.kind() == "except_clause" {
                    if let Some(body) = last_block_child(node) {
                        if body_is_empty(body, lang) {
                            findings.push(make_finding(
                                node,
                                text,
                                "Empty except block: exceptions are silently ignored",
                            ));
                        }
                    }
                }
                Visit::Descend
            });
        }
        // Go has no catch construct; error handling is value-based.
        Lang::Go => {}
    }
    findings
}

fn body_is_empty(body: Node, lang: Lang) -> bool {
    let mut cursor = body.walk();
    let statements: Vec<Node> = body
        .named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect();
    if statements.is_empty() {
        return true;
    }
    lang == Lang::Python && statements.iter().all(|s| s.kind() == "pass_statement")
}

fn last_block_child(node: Node) -> Option<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() == "block")
        .last()
}

fn make_finding(clause: Node, text: &str, message: &str) -> Finding {
    Finding::new(
        FindingKind::EmptyCatch,
        Severity::Warning,
        Span::from_node(&clause),
        message.to_string(),
    )
    .with_snippet(first_line(tree::node_text(clause, text)))
    .with_suggestion(
        "Handle the error, or add a comment explaining why it is intentionally ignored"
            .to_string(),
    )
    .with_fix(FixKind::Refactor)
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
    fn python_bare_pass_is_flagged() {
        let src = "try:\n    risky()\nexcept:\n    pass\n";
        let findings = run(Lang::Python, src);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::EmptyCatch);
    }

    #[test]
    fn python_logging_handler_is_clean() {
        let src = "try:\n    risky()\nexcept Exception as e:\n    log.warning(e)\n";
        assert!(run(Lang::Python, src).is_empty());
    }

    #[test]
    fn python_comment_plus_pass_is_still_flagged() {
        // Comment stripping happens structurally; intent comments are
        // weighed later during validation, not here.
        let src = "try:\n    risky()\nexcept:\n    # ignored\n    pass\n";
        let findings = run(Lang::Python, src);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn javascript_empty_catch_is_flagged() {
        let src = "try { risky(); } catch (e) {}";
        let findings = run(Lang::Javascript, src);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn javascript_comment_only_catch_is_flagged() {
        let src = "try { risky(); } catch (e) { /* nothing */ }";
        let findings = run(Lang::Javascript, src);
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn javascript_handled_catch_is_clean() {
        let src = "try { risky(); } catch (e) { console.error(e); }";
        assert!(run(Lang::Javascript, src).is_empty());
    }

    #[test]
    fn go_yields_nothing() {
        let src = "package main\nfunc f() {}\n";
        assert!(run(Lang::Go, src).is_empty());
    }
}
