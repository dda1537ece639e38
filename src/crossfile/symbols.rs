//! Project-wide symbol table.
//!
//! Symbols and references accumulate from concurrent per-file extraction,
//! so the table is internally locked. Lookups hand out clones; the table
//! is small relative to the trees it summarizes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::tree::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Type,
    Class,
    Variable,
}

/// A named declaration somewhere in the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub file: String,
    pub span: Span,
    pub exported: bool,
}

/// A use of a name: a direct call or an imported binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub file: String,
    pub span: Span,
}

#[derive(Default)]
struct TableInner {
    by_name: HashMap<String, Vec<Symbol>>,
    by_file: HashMap<String, Vec<Symbol>>,
    refs_by_name: HashMap<String, Vec<Reference>>,
}

#[derive(Default)]
pub struct SymbolTable {
    inner: RwLock<TableInner>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    pub fn add_symbol(&self, symbol: Symbol) {
        if symbol.name.is_empty() {
            return;
        }
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner
            .by_file
            .entry(symbol.file.clone())
            .or_default()
            .push(symbol.clone());
        inner.by_name.entry(symbol.name.clone()).or_default().push(symbol);
    }

    pub fn add_reference(&self, reference: Reference) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner
            .refs_by_name
            .entry(reference.name.clone())
            .or_default()
            .push(reference);
    }

    pub fn lookup(&self, name: &str) -> Vec<Symbol> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.by_name.get(name).cloned().unwrap_or_default()
    }

    pub fn symbols_in_file(&self, file: &str) -> Vec<Symbol> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.by_file.get(file).cloned().unwrap_or_default()
    }

    pub fn references_to(&self, name: &str) -> Vec<Reference> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.refs_by_name.get(name).cloned().unwrap_or_default()
    }

    /// Every symbol, ordered by file then line for stable reporting.
    pub fn all_symbols(&self) -> Vec<Symbol> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<Symbol> = inner.by_name.values().flatten().cloned().collect();
        all.sort_by(|a, b| a.file.cmp(&b.file).then(a.span.line.cmp(&b.span.line)));
        all
    }

    pub fn symbol_count(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.by_name.values().map(Vec::len).sum()
    }

    pub fn all_references(&self) -> Vec<Reference> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.refs_by_name.values().flatten().cloned().collect()
    }

    pub fn reference_count(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        inner.refs_by_name.values().map(Vec::len).sum()
    }
}
