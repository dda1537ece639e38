//! Function inventory: list the functions a file defines, with their
//! signatures, for tooling that wants structure without findings.

use serde::{Deserialize, Serialize};
use tree_sitter::Node;

use crate::detect;
use crate::error::{AnalysisError, Result};
use crate::lang::Lang;
use crate::tree::{self, Span, Visit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Uppercase-first convention (Go, JS/TS classes and helpers).
    Exported,
    /// Python names without a leading underscore.
    Public,
    /// Everything else.
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Exported => "exported",
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    /// Receiver- or class-qualified name where applicable.
    pub qualified: String,
    pub language: Lang,
    pub span: Span,
    pub parameters: Vec<String>,
    pub visibility: Visibility,
    pub is_method: bool,
    /// First line of the definition.
    pub snippet: String,
}

/// Every function in the file, in source order. `filter` restricts the
/// list to names containing the given text, case-insensitively.
pub fn extract_functions(
    root: Node,
    text: &str,
    lang: Lang,
    filter: Option<&str>,
) -> Vec<FunctionInfo> {
    let needle = filter.map(str::to_ascii_lowercase);
    detect::collect_functions(root, text, lang)
        .into_iter()
        .filter(|decl| match needle.as_deref() {
            Some(needle) => decl.name.to_ascii_lowercase().contains(needle),
            None => true,
        })
        .map(|decl| {
            let visibility = if decl.exported {
                match lang {
                    Lang::Python => Visibility::Public,
                    _ => Visibility::Exported,
                }
            } else {
                Visibility::Private
            };
            FunctionInfo {
                name: decl.name,
                qualified: decl.qualified,
                language: lang,
                span: Span::from_node(&decl.node),
                parameters: parameter_names(decl.node, text),
                visibility,
                is_method: decl.is_method,
                snippet: first_line(tree::node_text(decl.node, text)),
            }
        })
        .collect()
}

/// Exact-name lookup. Methods match on their bare name.
pub fn extract_function_by_name(
    root: Node,
    text: &str,
    lang: Lang,
    name: &str,
) -> Result<FunctionInfo> {
    extract_functions(root, text, lang, None)
        .into_iter()
        .find(|f| f.name == name)
        .ok_or_else(|| AnalysisError::FunctionNotFound(name.to_string()))
}

fn parameter_names(function: Node, text: &str) -> Vec<String> {
    let Some(params) = function.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut names = Vec::new();
    let mut push = |name: String| {
        if name != "self" && name != "cls" {
            names.push(name);
        }
    };
    tree::traverse(params, &mut |node| match node.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            push(tree::node_text(node, text).to_string());
            Visit::Descend
        }
        // Only the name side of defaulted or typed parameters counts.
        "default_parameter" | "typed_parameter" => {
            if let Some(inner) = node
                .child_by_field_name("name")
                .or_else(|| node.named_child(0))
            {
                if inner.kind() == "identifier" {
                    push(tree::node_text(inner, text).to_string());
                }
            }
            Visit::Skip
        }
        "assignment_pattern" => {
            if let Some(left) = node.child_by_field_name("left") {
                if left.kind() == "identifier" {
                    push(tree::node_text(left, text).to_string());
                }
            }
            Visit::Skip
        }
        "type_identifier" => Visit::Skip,
        _ => Visit::Descend,
    });
    names
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").trim_end().to_string()
}
