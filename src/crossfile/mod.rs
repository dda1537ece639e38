//! Cross-file analysis: project-wide symbols, imports, and the findings
//! that only make sense across file boundaries.
//!
//! Per-file extraction runs in parallel and feeds a shared symbol table
//! and dependency graph. The graph checks then report exports nothing
//! else imports, calls to names nothing defines, import cycles, and
//! (on request) functions defined identically in several files.

pub mod deps;
pub mod symbols;

pub use deps::DependencyGraph;
pub use symbols::{Reference, Symbol, SymbolKind, SymbolTable};

use phf::phf_set;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tree_sitter::Node;

use crate::detect::types::{DetectionConfig, Finding, FindingKind, FixKind, Severity};
use crate::detect::{self, CheckSet};
use crate::error::{AnalysisError, Result};
use crate::lang::{parse_source, Lang, LanguageRegistry};
use crate::tree::{self, Span, Visit};

/// Recognized cross-file check tokens.
pub const CROSS_FILE_CHECK_TOKENS: &[&str] = &[
    "unused_exports",
    "undefined_refs",
    "circular_deps",
    "cross_file_duplicates",
];

/// One file handed to cross-file analysis. Content travels with the path
/// so the analysis never touches the filesystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInput {
    pub path: String,
    pub content: String,
    /// Overrides extension-based language detection when set.
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossFileStats {
    pub files_analyzed: usize,
    pub files_skipped: usize,
    pub symbols: usize,
    pub references: usize,
    pub dependencies: usize,
}

#[derive(Debug, Serialize)]
pub struct CrossFileAnalysis {
    pub findings: Vec<Finding>,
    pub stats: CrossFileStats,
}

/// Analyze a set of files together.
///
/// The default check set is unused exports, undefined references, and
/// circular dependencies. Cross-file duplicate detection runs only when
/// named explicitly. Files whose language cannot be determined are
/// skipped and counted, never fatal.
pub fn analyze(
    files: &[FileInput],
    checks: &CheckSet,
    registry: &LanguageRegistry,
    config: &DetectionConfig,
) -> Result<CrossFileAnalysis> {
    if files.is_empty() {
        return Err(AnalysisError::EmptyInput("files"));
    }

    let known: HashSet<String> = files.iter().map(|f| normalize_path(&f.path)).collect();
    let table = SymbolTable::new();
    let graph = DependencyGraph::new();
    let analyzed = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);

    files.par_iter().for_each(|file| {
        let lang = file
            .language
            .as_deref()
            .and_then(|name| registry.resolve(name))
            .or_else(|| registry.resolve_path(&file.path));
        let Some(lang) = lang else {
            skipped.fetch_add(1, Ordering::Relaxed);
            return;
        };
        match parse_source(lang, &file.content) {
            Ok(parsed) => {
                extract_file(
                    &normalize_path(&file.path),
                    &file.content,
                    lang,
                    parsed.root_node(),
                    &known,
                    &table,
                    &graph,
                );
                analyzed.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                skipped.fetch_add(1, Ordering::Relaxed);
            }
        }
    });

    let mut findings = Vec::new();
    if checks.wants("unused_exports") {
        findings.extend(unused_exports(&table, config));
    }
    if checks.wants("undefined_refs") {
        findings.extend(undefined_references(&table));
    }
    if checks.wants("circular_deps") {
        findings.extend(circular_dependencies(&graph));
    }
    if checks.explicit("cross_file_duplicates") {
        findings.extend(cross_file_duplicates(&table, config));
    }
    findings.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.span.line.cmp(&b.span.line))
            .then(a.kind.as_str().cmp(b.kind.as_str()))
    });

    let stats = CrossFileStats {
        files_analyzed: analyzed.into_inner(),
        files_skipped: skipped.into_inner(),
        symbols: table.symbol_count(),
        references: table.reference_count(),
        dependencies: graph.edge_count(),
    };
    Ok(CrossFileAnalysis { findings, stats })
}

static GO_BUILTINS: phf::Set<&'static str> = phf_set! {
    "append", "cap", "close", "complex", "copy", "delete", "imag", "len",
    "make", "new", "panic", "print", "println", "real", "recover",
};

static JS_BUILTINS: phf::Set<&'static str> = phf_set! {
    "require", "fetch", "parseInt", "parseFloat", "isNaN", "isFinite",
    "setTimeout", "setInterval", "clearTimeout", "clearInterval",
    "encodeURIComponent", "decodeURIComponent", "encodeURI", "decodeURI",
    "alert", "confirm", "prompt", "structuredClone", "eval",
    "String", "Number", "Boolean", "Array", "Object", "Promise", "Error",
    "TypeError", "RangeError", "SyntaxError", "Symbol", "Date", "Map",
    "Set", "WeakMap", "WeakSet", "RegExp", "Proxy", "BigInt",
};

static PY_BUILTINS: phf::Set<&'static str> = phf_set! {
    "print", "len", "range", "int", "str", "float", "bool", "list", "dict",
    "set", "tuple", "open", "isinstance", "issubclass", "super", "enumerate",
    "zip", "map", "filter", "sorted", "reversed", "sum", "min", "max", "abs",
    "round", "type", "getattr", "setattr", "hasattr", "repr", "id", "input",
    "next", "iter", "format", "any", "all", "vars", "dir", "ord", "chr",
    "hash", "callable", "frozenset", "bytes", "bytearray", "object",
    "Exception", "ValueError", "TypeError", "KeyError", "IndexError",
    "RuntimeError", "StopIteration", "AttributeError", "NotImplementedError",
    "OSError", "IOError",
};

fn is_builtin(lang: Lang, name: &str) -> bool {
    match lang {
        Lang::Go => GO_BUILTINS.contains(name),
        Lang::Javascript | Lang::Typescript => JS_BUILTINS.contains(name),
        Lang::Python => PY_BUILTINS.contains(name),
    }
}

#[allow(clippy::too_many_arguments)]
fn extract_file(
    path: &str,
    text: &str,
    lang: Lang,
    root: Node,
    known: &HashSet<String>,
    table: &SymbolTable,
    graph: &DependencyGraph,
) {
    for decl in detect::collect_functions(root, text, lang) {
        if decl.is_method {
            continue;
        }
        table.add_symbol(Symbol {
            name: decl.name,
            kind: SymbolKind::Function,
            file: path.to_string(),
            span: Span::from_node(&decl.node),
            exported: decl.exported,
        });
    }

    tree::traverse(root, &mut |node| {
        match node.kind() {
            "class_declaration" | "class_definition" => {
                if let Some(name) = detect::field_text(node, "name", text) {
                    let exported = lang.is_exported_name(&name);
                    table.add_symbol(Symbol {
                        name,
                        kind: SymbolKind::Class,
                        file: path.to_string(),
                        span: Span::from_node(&node),
                        exported,
                    });
                }
            }
            "type_spec" => {
                if let Some(name) = detect::field_text(node, "name", text) {
                    let exported = lang.is_exported_name(&name);
                    table.add_symbol(Symbol {
                        name,
                        kind: SymbolKind::Type,
                        file: path.to_string(),
                        span: Span::from_node(&node),
                        exported,
                    });
                }
            }
            "short_var_declaration" | "range_clause" => {
                if let Some(left) = node.child_by_field_name("left") {
                    add_identifier_symbols(left, path, text, lang, table);
                }
            }
            "var_spec" | "const_spec" => {
                let mut cursor = node.walk();
                for name in node.children_by_field_name("name", &mut cursor) {
                    add_identifier_symbols(name, path, text, lang, table);
                }
            }
            "variable_declarator" => {
                if let Some(name) = node.child_by_field_name("name") {
                    add_identifier_symbols(name, path, text, lang, table);
                }
            }
            "assignment" => {
                if let Some(left) = node.child_by_field_name("left") {
                    add_identifier_symbols(left, path, text, lang, table);
                }
            }
            "for_statement" if lang == Lang::Python => {
                if let Some(left) = node.child_by_field_name("left") {
                    add_identifier_symbols(left, path, text, lang, table);
                }
            }
            // Parameters can hold callables; record them so later calls
            // through them do not read as undefined.
            "parameter_list" | "formal_parameters" | "parameters" => {
                add_identifier_symbols(node, path, text, lang, table);
                return Visit::Skip;
            }
            "call_expression" | "call" => {
                record_call(node, path, text, lang, known, table, graph);
            }
            "new_expression" => {
                if let Some(ctor) = node.child_by_field_name("constructor") {
                    if ctor.kind() == "identifier" {
                        let name = tree::node_text(ctor, text).to_string();
                        if !is_builtin(lang, &name) {
                            table.add_reference(Reference {
                                name,
                                file: path.to_string(),
                                span: Span::from_node(&ctor),
                            });
                        }
                    }
                }
            }
            // Go struct literals reference their type by bare name.
            "composite_literal" => {
                if let Some(ty) = node.child_by_field_name("type") {
                    if ty.kind() == "type_identifier" {
                        table.add_reference(Reference {
                            name: tree::node_text(ty, text).to_string(),
                            file: path.to_string(),
                            span: Span::from_node(&ty),
                        });
                    }
                }
            }
            "import_spec" => {
                if let Some(spec) = detect::field_text(node, "path", text) {
                    let spec = spec.trim_matches(['"', '\'', '`']).to_string();
                    for target in resolve_go_import(&spec, known) {
                        graph.add_dependency(path, &target);
                    }
                }
            }
            "import_statement" if lang.is_js_family() => {
                record_js_import(node, path, text, known, table, graph);
                return Visit::Skip;
            }
            "import_statement" | "import_from_statement" if lang == Lang::Python => {
                record_python_import(node, path, text, known, table, graph);
                return Visit::Skip;
            }
            _ => {}
        }
        Visit::Descend
    });
}

fn add_identifier_symbols(scope: Node, path: &str, text: &str, lang: Lang, table: &SymbolTable) {
    tree::traverse(scope, &mut |node| {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" => {
                let name = tree::node_text(node, text).to_string();
                if name != "_" {
                    let exported = lang.is_exported_name(&name) && is_module_level(node);
                    table.add_symbol(Symbol {
                        name,
                        kind: SymbolKind::Variable,
                        file: path.to_string(),
                        span: Span::from_node(&node),
                        exported,
                    });
                }
            }
            // Default values and type annotations are not declarations.
            "attribute" | "subscript" | "member_expression" | "subscript_expression" => {
                return Visit::Skip;
            }
            _ => {}
        }
        Visit::Descend
    });
}

const FUNCTION_SCOPES: &[&str] = &[
    "function_declaration",
    "method_declaration",
    "func_literal",
    "function_definition",
    "function_expression",
    "generator_function_declaration",
    "arrow_function",
    "method_definition",
];

fn is_module_level(node: Node) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if FUNCTION_SCOPES.contains(&parent.kind()) {
            return false;
        }
        current = parent.parent();
    }
    true
}

#[allow(clippy::too_many_arguments)]
fn record_call(
    node: Node,
    path: &str,
    text: &str,
    lang: Lang,
    known: &HashSet<String>,
    table: &SymbolTable,
    graph: &DependencyGraph,
) {
    let Some((name, direct)) = detect::callee_name(node, text) else {
        return;
    };
    if !direct {
        return;
    }
    // CommonJS requires double as import edges.
    if name == "require" && lang.is_js_family() {
        if let Some(spec) = first_string_argument(node, text) {
            if let Some(target) = resolve_relative_import(path, &spec, lang, known) {
                graph.add_dependency(path, &target);
            }
        }
        return;
    }
    if is_builtin(lang, &name) {
        return;
    }
    let span = node
        .child_by_field_name("function")
        .map(|f| Span::from_node(&f))
        .unwrap_or_else(|| Span::from_node(&node));
    table.add_reference(Reference {
        name,
        file: path.to_string(),
        span,
    });
}

fn first_string_argument(call: Node, text: &str) -> Option<String> {
    let args = call.child_by_field_name("arguments")?;
    let mut cursor = args.walk();
    for child in args.named_children(&mut cursor) {
        if child.kind() == "string" {
            return Some(
                tree::node_text(child, text)
                    .trim_matches(['"', '\'', '`'])
                    .to_string(),
            );
        }
    }
    None
}

fn record_js_import(
    node: Node,
    path: &str,
    text: &str,
    known: &HashSet<String>,
    table: &SymbolTable,
    graph: &DependencyGraph,
) {
    let spec = detect::field_text(node, "source", text)
        .map(|s| s.trim_matches(['"', '\'', '`']).to_string());
    let resolved = spec
        .as_deref()
        .and_then(|s| resolve_relative_import(path, s, Lang::Javascript, known));
    if let Some(target) = resolved.as_deref() {
        graph.add_dependency(path, target);
    }

    let mut imported: Vec<(String, Span)> = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "import_clause" {
            continue;
        }
        tree::traverse(child, &mut |n| {
            if n.kind() == "identifier" {
                imported.push((tree::node_text(n, text).to_string(), Span::from_node(&n)));
            }
            Visit::Descend
        });
    }
    bind_imported_names(imported, resolved.is_some(), path, table);
}

fn record_python_import(
    node: Node,
    path: &str,
    text: &str,
    known: &HashSet<String>,
    table: &SymbolTable,
    graph: &DependencyGraph,
) {
    let module = detect::field_text(node, "module_name", text)
        .or_else(|| detect::field_text(node, "name", text));
    let resolved = module
        .as_deref()
        .and_then(|m| resolve_relative_import(path, m, Lang::Python, known));
    if let Some(target) = resolved.as_deref() {
        graph.add_dependency(path, target);
    }

    if node.kind() != "import_from_statement" {
        return;
    }
    let mut imported: Vec<(String, Span)> = Vec::new();
    let mut cursor = node.walk();
    for name_node in node.children_by_field_name("name", &mut cursor) {
        let span = Span::from_node(&name_node);
        match name_node.kind() {
            "dotted_name" => {
                imported.push((tree::node_text(name_node, text).to_string(), span));
            }
            "aliased_import" => {
                if let Some(alias) = detect::field_text(name_node, "alias", text) {
                    imported.push((alias, span));
                }
            }
            _ => {}
        }
    }
    bind_imported_names(imported, resolved.is_some(), path, table);
}

/// Imports from files in the analyzed set become references (so the
/// source file's export counts as used). Imports from outside the set
/// become local symbols instead, so calls through them are not reported
/// as undefined.
fn bind_imported_names(
    imported: Vec<(String, Span)>,
    resolved: bool,
    path: &str,
    table: &SymbolTable,
) {
    for (name, span) in imported {
        if resolved {
            table.add_reference(Reference {
                name,
                file: path.to_string(),
                span,
            });
        } else {
            table.add_symbol(Symbol {
                name,
                kind: SymbolKind::Variable,
                file: path.to_string(),
                span,
                exported: false,
            });
        }
    }
}

fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let mut parts: Vec<&str> = Vec::new();
    for part in unified.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

fn dirname(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn resolve_relative_import(
    importer: &str,
    spec: &str,
    lang: Lang,
    known: &HashSet<String>,
) -> Option<String> {
    match lang {
        Lang::Javascript | Lang::Typescript => {
            if !spec.starts_with('.') {
                return None;
            }
            let base = normalize_path(&format!("{}/{}", dirname(importer), spec));
            let mut candidates = vec![base.clone()];
            for ext in ["js", "jsx", "ts", "tsx", "mjs", "cjs"] {
                candidates.push(format!("{base}.{ext}"));
            }
            candidates.push(format!("{base}/index.js"));
            candidates.push(format!("{base}/index.ts"));
            candidates.into_iter().find(|c| known.contains(c))
        }
        Lang::Python => {
            let dots = spec.chars().take_while(|c| *c == '.').count();
            let rest = spec[dots..].replace('.', "/");
            let mut base = dirname(importer).to_string();
            for _ in 1..dots {
                base = dirname(&base).to_string();
            }
            let mut candidates = Vec::new();
            if !rest.is_empty() {
                candidates.push(normalize_path(&format!("{base}/{rest}.py")));
                candidates.push(normalize_path(&format!("{base}/{rest}/__init__.py")));
                if dots == 0 {
                    candidates.push(format!("{rest}.py"));
                    candidates.push(format!("{rest}/__init__.py"));
                }
            }
            candidates.into_iter().find(|c| known.contains(c))
        }
        Lang::Go => None,
    }
}

/// Go imports name a package directory, so an import may map to several
/// files in the analyzed set.
fn resolve_go_import(spec: &str, known: &HashSet<String>) -> Vec<String> {
    let mut targets: Vec<String> = known
        .iter()
        .filter(|file| {
            let dir = dirname(file);
            dir == spec || dir.ends_with(&format!("/{spec}"))
        })
        .cloned()
        .collect();
    targets.sort();
    targets
}

fn unused_exports(table: &SymbolTable, config: &DetectionConfig) -> Vec<Finding> {
    let mut findings = Vec::new();
    for symbol in table.all_symbols() {
        if !symbol.exported || config.is_excluded(&symbol.name) {
            continue;
        }
        let used_elsewhere = table
            .references_to(&symbol.name)
            .iter()
            .any(|r| r.file != symbol.file);
        if used_elsewhere {
            continue;
        }
        let mut finding = Finding::new(
            FindingKind::UnusedExport,
            Severity::Warning,
            symbol.span,
            format!(
                "Unused export: '{}' is exported but never used by other files",
                symbol.name
            ),
        )
        .with_confidence(0.9)
        .with_fix(FixKind::Delete);
        finding.file = symbol.file.clone();
        finding.reasoning = "No references from other files in the analyzed set".to_string();
        finding.validated = true;
        findings.push(finding);
    }
    findings
}

fn undefined_references(table: &SymbolTable) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut all_refs = table.all_references();
    all_refs.sort_by(|a, b| a.file.cmp(&b.file).then(a.span.line.cmp(&b.span.line)));

    for reference in &all_refs {
        if !table.lookup(&reference.name).is_empty() {
            continue;
        }
        let key = format!("{}:{}:{}", reference.file, reference.span.line, reference.name);
        if !seen.insert(key) {
            continue;
        }
        let mut finding = Finding::new(
            FindingKind::UndefinedReference,
            Severity::Error,
            reference.span,
            format!(
                "Undefined reference: '{}' is called but never defined",
                reference.name
            ),
        )
        .with_confidence(0.95)
        .with_fix(FixKind::Error);
        finding.file = reference.file.clone();
        finding.reasoning = "No definition found in the analyzed set".to_string();
        finding.validated = true;
        findings.push(finding);
    }
    findings
}

fn circular_dependencies(graph: &DependencyGraph) -> Vec<Finding> {
    graph
        .find_cycles()
        .into_iter()
        .map(|cycle| {
            let chain = cycle.join(" -> ");
            let mut finding = Finding::new(
                FindingKind::CircularDependency,
                Severity::Error,
                Span::point(1, 1),
                format!("Circular dependency: {chain}"),
            )
            .with_confidence(1.0)
            .with_fix(FixKind::Error);
            finding.file = cycle.first().cloned().unwrap_or_default();
            finding.reasoning = "Import cycle confirmed by dependency graph traversal".to_string();
            finding.validated = true;
            finding
        })
        .collect()
}

fn cross_file_duplicates(table: &SymbolTable, config: &DetectionConfig) -> Vec<Finding> {
    let mut by_name: BTreeMap<String, Vec<Symbol>> = BTreeMap::new();
    for symbol in table.all_symbols() {
        if symbol.kind == SymbolKind::Function {
            by_name.entry(symbol.name.clone()).or_default().push(symbol);
        }
    }

    let mut findings = Vec::new();
    for (name, symbols) in by_name {
        if config.is_excluded(&name) {
            continue;
        }
        let files: HashSet<&str> = symbols.iter().map(|s| s.file.as_str()).collect();
        if files.len() < 2 {
            continue;
        }
        for symbol in &symbols {
            let mut finding = Finding::new(
                FindingKind::CrossFileDuplicate,
                Severity::Warning,
                symbol.span,
                format!(
                    "Duplicate function across files: '{}' is defined in {} files",
                    name,
                    files.len()
                ),
            )
            .with_confidence(0.8)
            .with_fix(FixKind::Refactor);
            finding.file = symbol.file.clone();
            finding.reasoning = "Same function name defined in multiple files".to_string();
            finding.validated = true;
            findings.push(finding);
        }
    }
    findings
}
