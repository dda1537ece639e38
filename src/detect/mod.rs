//! Code-quality detectors.
//!
//! Each detector takes the tree root and raw text and returns a list of
//! findings; an empty list is a valid outcome, never an error.

pub mod delimiters;
pub mod duplicates;
pub mod empty_catch;
pub mod missing_await;
pub mod orphaned;
pub mod types;
pub mod unreachable;
pub mod unused;

pub use types::{DetectionConfig, Finding, FindingKind, FixKind, Severity};

use std::collections::HashSet;
use tree_sitter::Node;

use crate::lang::Lang;
use crate::tree::{self, Visit};

/// The checks a caller asked for. An empty set means "run the default set".
#[derive(Debug, Clone, Default)]
pub struct CheckSet {
    tokens: HashSet<String>,
}

/// Recognized check tokens.
pub const CHECK_TOKENS: &[&str] = &[
    "duplicates",
    "unused",
    "unreachable",
    "orphaned",
    "empty_catch",
    "missing_await",
    "brace_mismatch",
];

impl CheckSet {
    pub fn from_tokens(tokens: &[String]) -> Self {
        CheckSet {
            tokens: tokens
                .iter()
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// True when the token was requested, or when the set is empty
    /// (default = everything).
    pub fn wants(&self, token: &str) -> bool {
        self.tokens.is_empty() || self.tokens.contains(token)
    }

    /// True only when the token was named explicitly.
    pub fn explicit(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Run every requested quality check over one parsed file.
pub fn run_checks(
    root: Node,
    text: &str,
    lang: Lang,
    checks: &CheckSet,
    config: &DetectionConfig,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    if checks.wants("duplicates") {
        findings.extend(duplicates::detect(root, text, lang));
    }
    if checks.wants("unused") {
        findings.extend(unused::detect(root, text, lang));
    }
    if checks.wants("unreachable") {
        findings.extend(unreachable::detect(root, text, lang));
    }
    if checks.wants("empty_catch") {
        findings.extend(empty_catch::detect(root, text, lang));
    }
    if checks.wants("missing_await") && lang.is_js_family() {
        findings.extend(missing_await::detect(root, text));
    }
    if checks.wants("brace_mismatch") {
        findings.extend(delimiters::detect(root, text, lang));
    }
    // Duplicate analysis implies the same-file call graph, so an explicit
    // "duplicates" request also surfaces orphans.
    if checks.wants("orphaned") || checks.explicit("duplicates") {
        findings.extend(orphaned::detect(root, text, lang, config));
    }

    findings
}

/// A function or method declaration found in one file.
#[derive(Debug, Clone)]
pub(crate) struct FunctionDecl<'tree> {
    /// Bare name.
    pub name: String,
    /// Receiver- or class-qualified key used for duplicate grouping.
    pub qualified: String,
    pub node: Node<'tree>,
    pub is_method: bool,
    pub exported: bool,
}

/// Collect every function and method declaration, receiver-aware.
pub(crate) fn collect_functions<'tree>(
    root: Node<'tree>,
    text: &str,
    lang: Lang,
) -> Vec<FunctionDecl<'tree>> {
    let mut decls = Vec::new();
    tree::traverse(root, &mut |node| {
        match (lang, node.kind()) {
            (Lang::Go, "function_declaration") => {
                if let Some(name) = field_text(node, "name", text) {
                    decls.push(make_decl(name.clone(), name, node, false, lang));
                }
            }
            (Lang::Go, "method_declaration") => {
                if let Some(name) = field_text(node, "name", text) {
                    let qualified = match receiver_type(node, text) {
                        Some(recv) => format!("{recv}.{name}"),
                        None => name.clone(),
                    };
                    decls.push(make_decl(name, qualified, node, true, lang));
                }
            }
            (Lang::Javascript | Lang::Typescript, "function_declaration")
            | (Lang::Javascript | Lang::Typescript, "generator_function_declaration") => {
                if let Some(name) = field_text(node, "name", text) {
                    decls.push(make_decl(name.clone(), name, node, false, lang));
                }
            }
            (Lang::Javascript | Lang::Typescript, "method_definition") => {
                if let Some(name) = field_text(node, "name", text) {
                    let qualified = match enclosing_class_name(node, text) {
                        Some(class) => format!("{class}.{name}"),
                        None => name.clone(),
                    };
                    decls.push(make_decl(name, qualified, node, true, lang));
                }
            }
            (Lang::Python, "function_definition") => {
                if let Some(name) = field_text(node, "name", text) {
                    let class = enclosing_class_name(node, text);
                    let is_method = class.is_some();
                    let qualified = match class {
                        Some(class) => format!("{class}.{name}"),
                        None => name.clone(),
                    };
                    decls.push(make_decl(name, qualified, node, is_method, lang));
                }
            }
            _ => {}
        }
        Visit::Descend
    });
    decls
}

fn make_decl<'tree>(
    name: String,
    qualified: String,
    node: Node<'tree>,
    is_method: bool,
    lang: Lang,
) -> FunctionDecl<'tree> {
    let exported = lang.is_exported_name(&name);
    FunctionDecl {
        name,
        qualified,
        node,
        is_method,
        exported,
    }
}

/// Text of a node's named field, if present.
pub(crate) fn field_text(node: Node, field: &str, text: &str) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| tree::node_text(n, text).to_string())
        .filter(|s| !s.is_empty())
}

/// The receiver type name of a Go method, e.g. `Server` for
/// `func (s *Server) Start()`.
fn receiver_type(node: Node, text: &str) -> Option<String> {
    let receiver = node.child_by_field_name("receiver")?;
    let mut found = None;
    tree::traverse(receiver, &mut |n| {
        if found.is_none() && n.kind() == "type_identifier" {
            found = Some(tree::node_text(n, text).to_string());
            return Visit::Skip;
        }
        Visit::Descend
    });
    found
}

/// Name of the nearest enclosing class declaration, if any.
fn enclosing_class_name(node: Node, text: &str) -> Option<String> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if matches!(parent.kind(), "class_declaration" | "class_definition" | "class") {
            return field_text(parent, "name", text);
        }
        current = parent.parent();
    }
    None
}

/// The callee name of a call expression: the identifier for direct calls,
/// the selected field for method/attribute calls.
pub(crate) fn callee_name(call: Node, text: &str) -> Option<(String, bool)> {
    let function = call.child_by_field_name("function")?;
    match function.kind() {
        "identifier" => Some((tree::node_text(function, text).to_string(), true)),
        "selector_expression" => {
            field_text(function, "field", text).map(|name| (name, false))
        }
        "member_expression" => {
            field_text(function, "property", text).map(|name| (name, false))
        }
        "attribute" => field_text(function, "attribute", text).map(|name| (name, false)),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn parse_for_tests(lang: Lang, text: &str) -> tree_sitter::Tree {
    crate::lang::parse_source(lang, text).expect("test source parses")
}
