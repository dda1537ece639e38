//! Unused-variable detection.
//!
//! Two passes over the tree. Pass 1 records each declared name together
//! with the byte offset of its name token; pass 2 walks every identifier
//! and treats any occurrence at a non-declaration offset as a use. The
//! offset-based exclusion is what keeps the declaration occurrence itself
//! from counting as a use of the same name.

use std::collections::{HashSet};
use tree_sitter::Node;

use super::{Finding, FindingKind, FixKind, Severity};
use crate::lang::Lang;
use crate::tree::{self, BytePos, Span, Visit};

struct Declared {
    name: String,
    span: Span,
}

pub fn detect(root: Node, text: &str, lang: Lang) -> Vec<Finding> {
    let mut decl_positions: HashSet<BytePos> = HashSet::new();
    let mut candidates: Vec<Declared> = Vec::new();
    let mut seen_names: HashSet<String> = HashSet::new();

    // Pass 1: declarations.
    tree::traverse(root, &mut |node| {
        if is_import_subtree(node) {
            return Visit::Skip;
        }
        match (lang, node.kind()) {
            (Lang::Go, "short_var_declaration") | (Lang::Go, "range_clause") => {
                if let Some(left) = node.child_by_field_name("left") {
                    for child in named_children(left) {
                        if child.kind() == "identifier" {
                            declare(
                                child,
                                text,
                                lang,
                                &mut decl_positions,
                                &mut candidates,
                                &mut seen_names,
                            );
                        }
                    }
                }
            }
            (Lang::Go, "var_spec") => {
                for child in named_children(node) {
                    if child.kind() == "identifier" {
                        declare(
                            child,
                            text,
                            lang,
                            &mut decl_positions,
                            &mut candidates,
                            &mut seen_names,
                        );
                    }
                }
            }
            (Lang::Javascript | Lang::Typescript, "variable_declarator") => {
                if let Some(name) = node.child_by_field_name("name") {
                    declare_pattern(
                        name,
                        text,
                        lang,
                        &mut decl_positions,
                        &mut candidates,
                        &mut seen_names,
                    );
                }
            }
            (Lang::Python, "assignment") | (Lang::Python, "for_statement") => {
                if let Some(left) = node.child_by_field_name("left") {
                    declare_pattern(
                        left,
                        text,
                        lang,
                        &mut decl_positions,
                        &mut candidates,
                        &mut seen_names,
                    );
                }
            }
            (Lang::Python, "function_definition") => {
                if let Some(params) = node.child_by_field_name("parameters") {
                    for child in named_children(params) {
                        let name_node = match child.kind() {
                            "identifier" => Some(child),
                            "default_parameter" | "typed_default_parameter" => {
                                child.child_by_field_name("name")
                            }
                            "typed_parameter" => first_named_of_kind(child, "identifier"),
                            _ => None,
                        };
                        if let Some(name_node) = name_node {
                            declare(
                                name_node,
                                text,
                                lang,
                                &mut decl_positions,
                                &mut candidates,
                                &mut seen_names,
                            );
                        }
                    }
                }
            }
            _ => {}
        }
        Visit::Descend
    });

    // Pass 2: usages. Any identifier occurrence that is not itself a
    // declaration token marks the name as used.
    let mut used: HashSet<String> = HashSet::new();
    tree::traverse(root, &mut |node| {
        if is_import_subtree(node) {
            return Visit::Skip;
        }
        if node.kind() == "identifier" && !decl_positions.contains(&BytePos::of(&node)) {
            used.insert(tree::node_text(node, text).to_string());
        }
        Visit::Descend
    });

    candidates
        .into_iter()
        .filter(|d| !used.contains(&d.name))
        .map(|d| {
            Finding::new(
                FindingKind::UnusedVariable,
                Severity::Warning,
                d.span,
                format!("Unused variable: '{}' is declared but never used", d.name),
            )
            .with_snippet(d.name.clone())
            .with_suggestion(format!("Remove the declaration of '{}' or use it", d.name))
            .with_fix(FixKind::Delete)
        })
        .collect()
}

/// Declare a single name token: its offset always joins the declaration
/// set, but excluded names never become candidates.
fn declare(
    name_node: Node,
    text: &str,
    lang: Lang,
    decl_positions: &mut HashSet<BytePos>,
    candidates: &mut Vec<Declared>,
    seen_names: &mut HashSet<String>,
) {
    decl_positions.insert(BytePos::of(&name_node));
    let name = tree::node_text(name_node, text).to_string();
    if is_excluded_name(&name, lang) {
        return;
    }
    if seen_names.insert(name.clone()) {
        candidates.push(Declared {
            name,
            span: Span::from_node(&name_node),
        });
    }
}

/// Declare every binding inside a possibly-destructuring target.
fn declare_pattern(
    pattern: Node,
    text: &str,
    lang: Lang,
    decl_positions: &mut HashSet<BytePos>,
    candidates: &mut Vec<Declared>,
    seen_names: &mut HashSet<String>,
) {
    tree::traverse(pattern, &mut |n| {
        match n.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                declare(n, text, lang, decl_positions, candidates, seen_names);
            }
            // The value side of `{key: alias}` patterns is still a binding;
            // attribute/subscript targets are not fresh bindings.
            "attribute" | "subscript" | "member_expression" | "subscript_expression" => {
                return Visit::Skip;
            }
            _ => {}
        }
        Visit::Descend
    });
}

fn is_excluded_name(name: &str, lang: Lang) -> bool {
    if name == "_" || name.is_empty() {
        return true;
    }
    if lang == Lang::Python {
        return name == "self" || name == "cls" || name.starts_with("__");
    }
    false
}

fn is_import_subtree(node: Node) -> bool {
    matches!(
        node.kind(),
        "import_statement" | "import_from_statement" | "import_declaration"
    )
}

fn named_children<'tree>(node: Node<'tree>) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn first_named_of_kind<'tree>(node: Node<'tree>, kind: &str) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}
