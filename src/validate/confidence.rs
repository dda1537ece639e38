//! Confidence scoring for validated findings.
//!
//! The score says how sure we are that the finding is a true positive
//! after checking the wider codebase. Exported symbols and symbols found
//! elsewhere zero out orphan/unused reports; intent comments zero out
//! empty-handler reports. Dynamic-dispatch signals in the surrounding
//! code apply fixed penalties because text search cannot see through
//! reflection or plugin registries.

use crate::detect::types::{Finding, FindingKind, FixKind};

/// What the codebase check learned about a finding's subject.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// The subject appears somewhere outside its own file.
    pub found_in_codebase: bool,
    /// Number of matching locations outside the originating file.
    pub reference_count: usize,
    /// An intent comment sits near the flagged code.
    pub has_intent: bool,
    /// The subject follows the language's export convention.
    pub is_exported: bool,
    /// Human-readable notes accumulated during validation.
    pub details: Vec<String>,
}

/// Dynamic-dispatch signals that weaken any text-search verdict.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeSignals {
    pub reflection: bool,
    pub dynamic_import: bool,
    pub plugin_registry: bool,
    pub generated_code: bool,
}

/// Base confidence before edge-case penalties.
pub fn calculate_confidence(finding: &Finding, result: &ValidationResult) -> f64 {
    match finding.kind {
        FindingKind::OrphanedFunction | FindingKind::UnusedVariable => {
            if result.is_exported || result.found_in_codebase {
                0.0
            } else {
                0.95
            }
        }
        FindingKind::EmptyCatch => {
            if result.has_intent {
                0.0
            } else {
                0.85
            }
        }
        FindingKind::DuplicateFunction => 0.80,
        _ => 0.50,
    }
}

/// Subtract penalties for each dynamic-dispatch signal, flooring at zero.
/// Generated code drops straight to zero.
pub fn apply_penalties(confidence: f64, signals: EdgeSignals) -> f64 {
    let mut adjusted = confidence;
    if signals.generated_code {
        return 0.0;
    }
    if signals.reflection {
        adjusted -= 0.30;
    }
    if signals.dynamic_import {
        adjusted -= 0.20;
    }
    if signals.plugin_registry {
        adjusted -= 0.25;
    }
    adjusted.max(0.0)
}

/// Only near-certain findings with mechanical fixes are auto-applicable.
pub fn is_auto_fix_safe(kind: FindingKind, confidence: f64) -> bool {
    if confidence < 0.95 {
        return false;
    }
    !matches!(
        kind,
        FindingKind::DuplicateFunction | FindingKind::DelimiterMismatch
    )
}

pub fn fix_kind_for(kind: FindingKind, confidence: f64) -> FixKind {
    match kind {
        FindingKind::OrphanedFunction | FindingKind::UnusedVariable => {
            if confidence >= 0.95 {
                FixKind::Delete
            } else {
                FixKind::Comment
            }
        }
        FindingKind::DuplicateFunction | FindingKind::EmptyCatch => FixKind::Refactor,
        FindingKind::DelimiterMismatch | FindingKind::UndefinedReference
        | FindingKind::CircularDependency => FixKind::Error,
        _ => FixKind::Comment,
    }
}

/// Joins the validation notes into the reasoning string stored on the
/// finding, ending with the percentage and the review verdict.
pub fn reasoning_text(details: &[String], confidence: f64, auto_fix_safe: bool) -> String {
    let mut parts: Vec<String> = details.to_vec();
    parts.push(format!("Confidence: {}%", (confidence * 100.0).round() as i64));
    parts.push(
        if auto_fix_safe {
            "Safe for automated refactoring"
        } else {
            "Requires human review"
        }
        .to_string(),
    );
    parts.join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::types::Severity;
    use crate::tree::Span;

    fn finding(kind: FindingKind) -> Finding {
        Finding::new(kind, Severity::Warning, Span::point(1, 1), "t 'x' t".to_string())
    }

    #[test]
    fn exported_orphan_scores_zero() {
        let result = ValidationResult {
            is_exported: true,
            ..Default::default()
        };
        assert_eq!(
            calculate_confidence(&finding(FindingKind::OrphanedFunction), &result),
            0.0
        );
    }

    #[test]
    fn unreferenced_unexported_orphan_scores_high() {
        let result = ValidationResult::default();
        let conf = calculate_confidence(&finding(FindingKind::OrphanedFunction), &result);
        assert!(conf >= 0.95);
    }

    #[test]
    fn found_in_codebase_zeroes_unused_variable() {
        let result = ValidationResult {
            found_in_codebase: true,
            reference_count: 2,
            ..Default::default()
        };
        assert_eq!(
            calculate_confidence(&finding(FindingKind::UnusedVariable), &result),
            0.0
        );
    }

    #[test]
    fn intent_comment_zeroes_empty_catch() {
        let with_intent = ValidationResult {
            has_intent: true,
            ..Default::default()
        };
        assert_eq!(
            calculate_confidence(&finding(FindingKind::EmptyCatch), &with_intent),
            0.0
        );
        let without = ValidationResult::default();
        assert_eq!(
            calculate_confidence(&finding(FindingKind::EmptyCatch), &without),
            0.85
        );
    }

    #[test]
    fn duplicates_and_defaults() {
        let result = ValidationResult::default();
        assert_eq!(
            calculate_confidence(&finding(FindingKind::DuplicateFunction), &result),
            0.80
        );
        assert_eq!(
            calculate_confidence(&finding(FindingKind::UnreachableCode), &result),
            0.50
        );
    }

    #[test]
    fn penalties_stack_and_floor_at_zero() {
        let signals = EdgeSignals {
            reflection: true,
            dynamic_import: true,
            plugin_registry: true,
            generated_code: false,
        };
        let adjusted = apply_penalties(0.95, signals);
        assert!((adjusted - 0.20).abs() < 1e-9);
        assert_eq!(apply_penalties(0.10, signals), 0.0);
    }

    #[test]
    fn generated_code_is_always_zero() {
        let signals = EdgeSignals {
            generated_code: true,
            ..Default::default()
        };
        assert_eq!(apply_penalties(0.95, signals), 0.0);
    }

    #[test]
    fn auto_fix_gate() {
        assert!(is_auto_fix_safe(FindingKind::UnusedVariable, 0.95));
        assert!(!is_auto_fix_safe(FindingKind::UnusedVariable, 0.94));
        assert!(!is_auto_fix_safe(FindingKind::DuplicateFunction, 1.0));
        assert!(!is_auto_fix_safe(FindingKind::DelimiterMismatch, 1.0));
    }

    #[test]
    fn reasoning_includes_percent_and_verdict() {
        let text = reasoning_text(
            &["No references found".to_string()],
            0.95,
            true,
        );
        assert!(text.contains("No references found"));
        assert!(text.contains("Confidence: 95%"));
        assert!(text.ends_with("Safe for automated refactoring"));
        let text = reasoning_text(&[], 0.5, false);
        assert!(text.ends_with("Requires human review"));
    }
}
