//! Duplicate function/method detection.
//!
//! Declarations are indexed by a receiver-aware key, so `(a *A) Close` and
//! `(b *B) Close` are distinct while two top-level `test` functions
//! collide. Every occurrence of a duplicated key is reported.

use std::collections::BTreeMap;
use tree_sitter::Node;

use super::{collect_functions, Finding, FindingKind, FixKind, Severity};
use crate::lang::Lang;
use crate::tree::{self, Span};

pub fn detect(root: Node, text: &str, lang: Lang) -> Vec<Finding> {
    let decls = collect_functions(root, text, lang);

    let mut by_key: BTreeMap<String, Vec<(String, Span, String)>> = BTreeMap::new();
    for decl in &decls {
        let snippet = first_line(tree::node_text(decl.node, text));
        by_key.entry(decl.qualified.clone()).or_default().push((
            decl.name.clone(),
            Span::from_node(&decl.node),
            snippet,
        ));
    }

    let mut findings = Vec::new();
    for occurrences in by_key.values() {
        if occurrences.len() < 2 {
            continue;
        }
        let count = occurrences.len();
        for (name, span, snippet) in occurrences {
            let finding = Finding::new(
                FindingKind::DuplicateFunction,
                Severity::Error,
                *span,
                format!(
                    "Duplicate function definition: '{}' is defined {} times",
                    name, count
                ),
            )
            .with_snippet(snippet.clone())
            .with_suggestion(format!(
                "Consolidate the definitions of '{}' into one",
                name
            ))
            .with_confidence(0.8)
            .with_fix(FixKind::Refactor);
            findings.push(finding);
        }
    }
    findings
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").trim().to_string()
}
