//! Codebase validation of detector findings.
//!
//! Detection is single-file and syntactic; validation asks the rest of
//! the project whether the finding holds up. An "orphaned" function that
//! other files call, or an exported symbol, is downgraded to zero
//! confidence rather than deleted from the report.

pub mod concurrent;
pub mod confidence;
pub mod patterns;
pub mod search;

pub use concurrent::{validate_concurrently, validate_with_timeout};
pub use confidence::{EdgeSignals, ValidationResult};
pub use search::{CodebaseSearch, SearchHit};

use std::collections::HashSet;
use std::path::Path;

use crate::detect::types::{Finding, FindingKind};
use crate::error::Result;
use crate::lang::Lang;

const INTENT_WINDOW: usize = 3;

/// Re-score a finding against the codebase under `root`. Mutates the
/// finding's confidence, fix kind, reasoning, and validated flag.
pub fn validate_finding(
    search: &CodebaseSearch,
    finding: &mut Finding,
    file: &Path,
    root: &Path,
    lang: Lang,
) -> Result<()> {
    let mut result = ValidationResult::default();
    let subject = patterns::extract_quoted_name(&finding.message);

    match finding.kind {
        FindingKind::OrphanedFunction | FindingKind::UnusedVariable => {
            if let Some(name) = subject.as_deref() {
                result.is_exported = lang.is_exported_name(name);
                if result.is_exported {
                    result.details.push(format!("'{name}' follows the export convention"));
                }
                if patterns::is_valid_identifier(name, lang) {
                    // A function can be referenced as a value without ever
                    // being called, so orphans get both searches; the
                    // file:line dedupe collapses the overlap.
                    let mut hits: Vec<SearchHit> = Vec::new();
                    if finding.kind == FindingKind::OrphanedFunction {
                        hits.extend(search.search(&patterns::call_pattern(name), root)?.iter().cloned());
                    }
                    hits.extend(
                        search
                            .search(&patterns::reference_pattern(name), root)?
                            .iter()
                            .cloned(),
                    );
                    let count = external_reference_count(&hits, file);
                    result.reference_count = count;
                    result.found_in_codebase = count > 0;
                    if count > 0 {
                        result
                            .details
                            .push(format!("Found {count} reference(s) elsewhere in the codebase"));
                    } else {
                        result.details.push("No references found outside this file".to_string());
                    }
                } else {
                    result.details.push("Name is not a searchable identifier".to_string());
                }
            } else {
                result.details.push("Could not determine the symbol name".to_string());
            }
        }
        FindingKind::EmptyCatch => {
            result.has_intent = search::has_intent_comment(file, finding.span.line, INTENT_WINDOW);
            if result.has_intent {
                result.details.push("An intent comment marks this handler as deliberate".to_string());
            } else {
                result.details.push("No intent comment near the empty handler".to_string());
            }
        }
        FindingKind::DuplicateFunction => {
            result.details.push("Duplicate definitions confirmed within the file".to_string());
        }
        _ => {}
    }

    let mut score = confidence::calculate_confidence(finding, &result);
    // Dynamic dispatch in the same file can hide real callers from a
    // text search, so only a positive verdict is discounted.
    if score > 0.0
        && matches!(
            finding.kind,
            FindingKind::OrphanedFunction | FindingKind::UnusedVariable
        )
    {
        let signals = detect_edge_signals(file);
        let adjusted = confidence::apply_penalties(score, signals);
        if adjusted < score {
            result
                .details
                .push("Dynamic dispatch nearby limits text-search certainty".to_string());
        }
        score = adjusted;
    }

    finding.confidence = score;
    finding.auto_fix_safe = confidence::is_auto_fix_safe(finding.kind, score);
    finding.fix_kind = confidence::fix_kind_for(finding.kind, score);
    finding.reasoning = confidence::reasoning_text(&result.details, score, finding.auto_fix_safe);
    finding.validated = true;
    Ok(())
}

/// Matches outside the originating file, deduplicated per file:line.
fn external_reference_count(hits: &[SearchHit], origin: &Path) -> usize {
    let origin = origin.canonicalize().unwrap_or_else(|_| origin.to_path_buf());
    let mut seen: HashSet<String> = HashSet::new();
    let mut count = 0;
    for hit in hits {
        let hit_path = hit.file.canonicalize().unwrap_or_else(|_| hit.file.clone());
        if hit_path == origin {
            continue;
        }
        let key = format!("{}:{}", hit_path.display(), hit.line);
        if seen.insert(key) {
            count += 1;
        }
    }
    count
}

const REFLECTION_MARKERS: &[&str] = &["reflect.", "getattr(", "Reflect."];
const DYNAMIC_IMPORT_MARKERS: &[&str] = &["import(", "importlib", "__import__"];
const PLUGIN_MARKERS: &[&str] = &["plugin"];
const GENERATED_MARKERS: &[&str] = &["Code generated", "DO NOT EDIT", "@generated"];

fn detect_edge_signals(file: &Path) -> EdgeSignals {
    let Ok(content) = std::fs::read_to_string(file) else {
        return EdgeSignals::default();
    };
    let lowered = content.to_ascii_lowercase();
    EdgeSignals {
        reflection: REFLECTION_MARKERS
            .iter()
            .any(|m| lowered.contains(&m.to_ascii_lowercase())),
        dynamic_import: DYNAMIC_IMPORT_MARKERS
            .iter()
            .any(|m| lowered.contains(&m.to_ascii_lowercase())),
        plugin_registry: PLUGIN_MARKERS.iter().any(|m| lowered.contains(m)),
        generated_code: GENERATED_MARKERS
            .iter()
            .any(|m| content.contains(m)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::types::{FixKind, Severity};
    use crate::tree::Span;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn orphan(name: &str) -> Finding {
        Finding::new(
            FindingKind::OrphanedFunction,
            Severity::Info,
            Span::point(2, 1),
            format!("Orphaned function: '{name}' is never called within this file"),
        )
    }

    #[test]
    fn orphan_called_elsewhere_drops_to_zero() {
        let dir = TempDir::new().unwrap();
        let origin = write(&dir, "util.go", "package util\nfunc helper() {}\n");
        write(&dir, "main.go", "package main\nfunc main() { helper() }\n");

        let search = CodebaseSearch::new();
        let mut finding = orphan("helper");
        validate_finding(&search, &mut finding, &origin, dir.path(), Lang::Go).unwrap();

        assert!(finding.validated);
        assert_eq!(finding.confidence, 0.0);
        assert!(!finding.auto_fix_safe);
        assert!(finding.reasoning.contains("reference"));
    }

    #[test]
    fn orphan_referenced_as_a_value_drops_to_zero() {
        let dir = TempDir::new().unwrap();
        let origin = write(&dir, "util.go", "package util\nfunc helper() {}\n");
        // No call anywhere: the function is only taken as a value.
        write(&dir, "main.go", "package main\nvar callback = helper\n");

        let search = CodebaseSearch::new();
        let mut finding = orphan("helper");
        validate_finding(&search, &mut finding, &origin, dir.path(), Lang::Go).unwrap();

        assert_eq!(finding.confidence, 0.0);
        assert!(!finding.auto_fix_safe);
        assert!(finding.reasoning.contains("reference"));
    }

    #[test]
    fn exported_orphan_drops_to_zero() {
        let dir = TempDir::new().unwrap();
        let origin = write(&dir, "util.go", "package util\nfunc Helper() {}\n");

        let search = CodebaseSearch::new();
        let mut finding = orphan("Helper");
        validate_finding(&search, &mut finding, &origin, dir.path(), Lang::Go).unwrap();
        assert_eq!(finding.confidence, 0.0);
        assert!(finding.reasoning.contains("export convention"));
    }

    #[test]
    fn truly_orphaned_function_is_high_confidence_and_deletable() {
        let dir = TempDir::new().unwrap();
        let origin = write(&dir, "util.go", "package util\nfunc helper() {}\n");

        let search = CodebaseSearch::new();
        let mut finding = orphan("helper");
        validate_finding(&search, &mut finding, &origin, dir.path(), Lang::Go).unwrap();
        assert!(finding.confidence >= 0.95);
        assert!(finding.auto_fix_safe);
        assert_eq!(finding.fix_kind, FixKind::Delete);
        assert!(finding.reasoning.ends_with("Safe for automated refactoring"));
    }

    #[test]
    fn plugin_registry_discounts_the_verdict() {
        let dir = TempDir::new().unwrap();
        let origin = write(
            &dir,
            "util.py",
            "# plugin entrypoints resolved at runtime\ndef handler():\n    pass\n",
        );

        let search = CodebaseSearch::new();
        let mut finding = orphan("handler");
        validate_finding(&search, &mut finding, &origin, dir.path(), Lang::Python).unwrap();
        assert!(finding.confidence < 0.95);
        assert!(!finding.auto_fix_safe);
    }

    #[test]
    fn empty_catch_with_intent_comment_is_zeroed() {
        let dir = TempDir::new().unwrap();
        let origin = write(
            &dir,
            "h.py",
            "def f():\n    try:\n        risky()\n    except Exception:\n        # intentional: best effort\n        pass\n",
        );

        let search = CodebaseSearch::new();
        let mut finding = Finding::new(
            FindingKind::EmptyCatch,
            Severity::Warning,
            Span::point(4, 5),
            "Empty except block swallows errors".to_string(),
        );
        validate_finding(&search, &mut finding, &origin, dir.path(), Lang::Python).unwrap();
        assert_eq!(finding.confidence, 0.0);
    }

    #[test]
    fn duplicate_stays_at_fixed_confidence_and_never_auto_fixes() {
        let dir = TempDir::new().unwrap();
        let origin = write(&dir, "a.js", "function f() {}\nfunction f() {}\n");

        let search = CodebaseSearch::new();
        let mut finding = Finding::new(
            FindingKind::DuplicateFunction,
            Severity::Error,
            Span::point(1, 1),
            "Duplicate function definition: 'f' is defined 2 times".to_string(),
        );
        validate_finding(&search, &mut finding, &origin, dir.path(), Lang::Javascript).unwrap();
        assert_eq!(finding.confidence, 0.80);
        assert!(!finding.auto_fix_safe);
        assert_eq!(finding.fix_kind, FixKind::Refactor);
    }
}
