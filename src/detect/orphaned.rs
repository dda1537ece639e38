//! Orphaned-function detection.
//!
//! Builds the same-file call-name set (direct calls plus method-selector
//! calls) and reports declared functions absent from it. Methods are
//! conservatively excluded because they may satisfy an interface, and the
//! config suppresses entrypoints, test-framework names, and (by default)
//! exported identifiers. Reflection-based, cross-package, and
//! runtime-registered calls are invisible here; codebase validation is the
//! second line of defense.

use std::collections::HashSet;
use tree_sitter::Node;

use super::{callee_name, collect_functions, DetectionConfig, Finding, FindingKind, FixKind, Severity};
use crate::lang::Lang;
use crate::tree::{self, Span, Visit};

pub fn detect(root: Node, text: &str, lang: Lang, config: &DetectionConfig) -> Vec<Finding> {
    let decls = collect_functions(root, text, lang);

    let mut called: HashSet<String> = HashSet::new();
    tree::traverse(root, &mut |node| {
        if matches!(node.kind(), "call_expression" | "call" | "new_expression") {
            if let Some((name, _direct)) = callee_name(node, text) {
                called.insert(name);
            }
        }
        Visit::Descend
    });

    // Any name that appears as a method declaration is off the table,
    // whichever receiver it belongs to.
    let method_names: HashSet<&str> = decls
        .iter()
        .filter(|d| d.is_method)
        .map(|d| d.name.as_str())
        .collect();

    let mut findings = Vec::new();
    for decl in &decls {
        if decl.is_method || method_names.contains(decl.name.as_str()) {
            continue;
        }
        if config.is_excluded(&decl.name) {
            continue;
        }
        if config.trust_exported && decl.exported {
            continue;
        }
        if called.contains(&decl.name) {
            continue;
        }
        findings.push(
            Finding::new(
                FindingKind::OrphanedFunction,
                Severity::Info,
                Span::from_node(&decl.node),
                format!(
                    "Orphaned function: '{}' is never called within this file",
                    decl.name
                ),
            )
            .with_snippet(first_line(tree::node_text(decl.node, text)))
            .with_suggestion(format!(
                "Verify external callers before removing '{}'",
                decl.name
            ))
            .with_fix(FixKind::Delete),
        );
    }
    findings
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
        detect(tree.root_node(), src, lang, &DetectionConfig::default())
    }

    #[test]
    fn uncalled_private_go_function_is_flagged() {
        let src = "package main\nfunc helper() {}\nfunc main() {}\n";
        let findings = run(Lang::Go, src);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("'helper'"));
        assert_eq!(findings[0].severity, Severity::Info);
    }

    #[test]
    fn init_and_exported_functions_are_suppressed() {
        let src = "package main\nfunc init() { setup() }\nfunc PublicHelper() {}\nfunc setup() {}\n";
        assert!(run(Lang::Go, src).is_empty());
    }

    #[test]
    fn test_prefixed_functions_are_suppressed() {
        let src = "package main\nfunc TestParser(t int) {}\n";
        assert!(run(Lang::Go, src).is_empty());
    }

    #[test]
    fn called_function_is_not_an_orphan() {
        let src = "package main\nfunc helper() {}\nfunc main() { helper() }\n";
        assert!(run(Lang::Go, src).is_empty());
    }

    #[test]
    fn methods_are_conservatively_excluded() {
        let src = "package main\ntype S struct{}\nfunc (s *S) handle() {}\n";
        assert!(run(Lang::Go, src).is_empty());
    }

    #[test]
    fn selector_calls_count_as_uses() {
        // `handle` is only reached through a method-selector call.
        let src = "package main\nfunc handle() {}\nfunc main() { runner.handle() }\n";
        assert!(run(Lang::Go, src).is_empty());
    }

    #[test]
    fn python_private_orphan_is_flagged() {
        let src = "def _stale():\n    pass\n\ndef main():\n    print('hi')\n";
        let findings = run(Lang::Python, src);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("'_stale'"));
    }

    #[test]
    fn python_public_names_are_trusted_as_exported() {
        let src = "def helper():\n    pass\n";
        assert!(run(Lang::Python, src).is_empty());
    }
}
