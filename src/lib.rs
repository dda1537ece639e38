//! Crosslint - multi-language static analysis with codebase validation.
//!
//! Crosslint parses Go, JavaScript, TypeScript, and Python with
//! tree-sitter and runs quality and security detectors over the syntax
//! tree. Findings are then validated against the rest of the project:
//! a function that looks orphaned in one file but is called elsewhere is
//! downgraded instead of reported for deletion.
//!
//! # Architecture
//!
//! - `lang`: supported languages, parsing, and the language registry
//! - `tree`: fuzz-safe tree traversal and position helpers
//! - `detect`: per-file quality detectors (duplicates, unused variables,
//!   unreachable code, empty handlers, missing await, delimiters, orphans)
//! - `security`: vulnerability detectors and the middleware inventory
//! - `validate`: codebase search, confidence scoring, and concurrent
//!   validation of findings
//! - `crossfile`: project-wide symbol table, dependency graph, and the
//!   findings that only exist across files
//! - `analysis`: the `Analyzer` facade wiring everything together
//! - `cache`: TTL cache for repeated analysis of identical input
//! - `report`: output formatting (pretty, JSON)

pub mod analysis;
pub mod cache;
pub mod cli;
pub mod crossfile;
pub mod detect;
pub mod error;
pub mod extract;
pub mod lang;
pub mod report;
pub mod security;
pub mod tree;
pub mod validate;

pub use analysis::{AnalysisOutput, AnalysisStats, Analyzer, MultiFileOutput};
pub use crossfile::{CrossFileAnalysis, CrossFileStats, FileInput};
pub use detect::{CheckSet, DetectionConfig, Finding, FindingKind, FixKind, Severity};
pub use error::{AnalysisError, Result};
pub use extract::{FunctionInfo, Visibility};
pub use lang::{Lang, LanguageBundle, LanguageRegistry};
pub use security::{SecurityReport, SecurityVulnerability, VulnKind, VulnSeverity};
pub use tree::Span;
pub use validate::{CodebaseSearch, SearchHit};
