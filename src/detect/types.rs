//! Finding model shared by every detector.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tree::Span;

/// What a finding is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    DuplicateFunction,
    UnusedVariable,
    UnreachableCode,
    OrphanedFunction,
    EmptyCatch,
    MissingAwait,
    DelimiterMismatch,
    UnusedExport,
    UndefinedReference,
    CircularDependency,
    CrossFileDuplicate,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingKind::DuplicateFunction => "duplicate_function",
            FindingKind::UnusedVariable => "unused_variable",
            FindingKind::UnreachableCode => "unreachable_code",
            FindingKind::OrphanedFunction => "orphaned_function",
            FindingKind::EmptyCatch => "empty_catch",
            FindingKind::MissingAwait => "missing_await",
            FindingKind::DelimiterMismatch => "delimiter_mismatch",
            FindingKind::UnusedExport => "unused_export",
            FindingKind::UndefinedReference => "undefined_reference",
            FindingKind::CircularDependency => "circular_dependency",
            FindingKind::CrossFileDuplicate => "cross_file_duplicate",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a finding could be resolved automatically, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixKind {
    /// Safe to delete the offending code.
    Delete,
    /// Needs restructuring, not plain deletion.
    Refactor,
    /// Best resolved by a human-written comment or review.
    Comment,
    /// Must be fixed manually; never auto-applied.
    Error,
}

/// A single reported issue. Identity is (kind, span).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    /// File attribution; empty for single-file analysis.
    #[serde(default)]
    pub file: String,
    pub span: Span,
    pub message: String,
    pub snippet: String,
    pub suggestion: String,
    pub confidence: f64,
    pub auto_fix_safe: bool,
    pub fix_kind: FixKind,
    pub reasoning: String,
    pub validated: bool,
}

impl Finding {
    pub fn new(kind: FindingKind, severity: Severity, span: Span, message: String) -> Self {
        Finding {
            kind,
            severity,
            file: String::new(),
            span,
            message,
            snippet: String::new(),
            suggestion: String::new(),
            confidence: 0.5,
            auto_fix_safe: false,
            fix_kind: FixKind::Comment,
            reasoning: "Pending codebase validation".to_string(),
            validated: false,
        }
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = snippet.into();
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_fix(mut self, fix_kind: FixKind) -> Self {
        self.fix_kind = fix_kind;
        self
    }

    /// Deduplication key: kind plus location.
    pub fn key(&self) -> String {
        format!("{}:{}:{}", self.kind, self.span.line, self.span.column)
    }
}

/// Suppression knobs for orphan detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Exact names never reported (entrypoints).
    pub excluded_names: Vec<String>,
    /// Name prefixes never reported (test-framework conventions).
    pub excluded_prefixes: Vec<String>,
    /// Treat exported identifiers as externally used.
    pub trust_exported: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            excluded_names: vec!["main".to_string(), "init".to_string()],
            excluded_prefixes: vec![
                "Test".to_string(),
                "Example".to_string(),
                "Benchmark".to_string(),
            ],
            trust_exported: true,
        }
    }
}

impl DetectionConfig {
    pub fn is_excluded(&self, name: &str) -> bool {
        if self.excluded_names.iter().any(|n| n == name) {
            return true;
        }
        self.excluded_prefixes
            .iter()
            .any(|p| name.starts_with(p.as_str()))
    }
}
