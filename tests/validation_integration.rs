//! Findings validated against a real project tree on disk.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crosslint::{Analyzer, FindingKind, FixKind};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn orphan_with_an_external_caller_is_downgraded_to_zero() {
    let dir = TempDir::new().unwrap();
    let lib = write(
        &dir,
        "lib.js",
        "function helper() { return 1; }\nfunction entry() { return 2; }\nentry();\n",
    );
    write(&dir, "main.js", "helper();\n");

    let analyzer = Analyzer::new();
    let content = fs::read_to_string(&lib).unwrap();
    let output = analyzer.analyze(&content, "js", &[]).unwrap();
    let mut findings: Vec<_> = output
        .findings
        .into_iter()
        .filter(|f| f.kind == FindingKind::OrphanedFunction)
        .collect();
    assert!(
        findings.iter().any(|f| f.message.contains("'helper'")),
        "helper looks orphaned before validation"
    );

    analyzer
        .validate(&mut findings, &lib, dir.path(), "js")
        .unwrap();

    let helper = findings
        .iter()
        .find(|f| f.message.contains("'helper'"))
        .unwrap();
    assert!(helper.validated);
    assert_eq!(helper.confidence, 0.0);
    assert!(!helper.auto_fix_safe);
}

#[test]
fn truly_dead_code_is_safe_to_delete() {
    let dir = TempDir::new().unwrap();
    let lib = write(
        &dir,
        "lib.js",
        "function graveyard() { return 1; }\nfunction entry() { return 2; }\nentry();\n",
    );
    write(&dir, "main.js", "entry();\n");

    let analyzer = Analyzer::new();
    let content = fs::read_to_string(&lib).unwrap();
    let output = analyzer.analyze(&content, "js", &[]).unwrap();
    let mut findings: Vec<_> = output
        .findings
        .into_iter()
        .filter(|f| f.kind == FindingKind::OrphanedFunction && f.message.contains("'graveyard'"))
        .collect();
    assert_eq!(findings.len(), 1);

    analyzer
        .validate(&mut findings, &lib, dir.path(), "js")
        .unwrap();

    assert!(findings[0].confidence >= 0.95);
    assert!(findings[0].auto_fix_safe);
    assert_eq!(findings[0].fix_kind, FixKind::Delete);
    assert!(findings[0]
        .reasoning
        .ends_with("Safe for automated refactoring"));
}

#[test]
fn unexported_go_function_stays_high_confidence() {
    let dir = TempDir::new().unwrap();
    let lib = write(&dir, "lib.go", "package lib\n\nfunc unusedLocal() {}\n");

    // Lowercase Go names are package-private, so neither the detector nor
    // the validator trusts them as externally used.
    let analyzer = Analyzer::new();
    let content = fs::read_to_string(&lib).unwrap();
    let output = analyzer.analyze(&content, "go", &[]).unwrap();
    let mut findings: Vec<_> = output
        .findings
        .into_iter()
        .filter(|f| f.kind == FindingKind::OrphanedFunction)
        .collect();
    assert_eq!(findings.len(), 1);

    analyzer
        .validate(&mut findings, &lib, dir.path(), "go")
        .unwrap();
    assert!(findings[0].confidence >= 0.95);
}

#[test]
fn empty_catch_with_intent_marker_is_dismissed() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "worker.py",
        "def poll():\n    try:\n        tick()\n    except Exception:\n        # NOTE: polling is best effort\n        pass\n\npoll()\n",
    );

    let analyzer = Analyzer::new();
    let content = fs::read_to_string(&file).unwrap();
    let output = analyzer.analyze(&content, "python", &[]).unwrap();
    let mut findings: Vec<_> = output
        .findings
        .into_iter()
        .filter(|f| f.kind == FindingKind::EmptyCatch)
        .collect();
    assert_eq!(findings.len(), 1);

    analyzer
        .validate(&mut findings, &file, dir.path(), "python")
        .unwrap();
    assert_eq!(findings[0].confidence, 0.0);
    assert!(findings[0].reasoning.contains("intent comment"));
}

#[test]
fn timeout_validation_returns_within_a_generous_deadline() {
    let dir = TempDir::new().unwrap();
    let lib = write(
        &dir,
        "lib.js",
        "function lonely() { return 1; }\nfunction entry() {}\nentry();\n",
    );

    let analyzer = Analyzer::new();
    let content = fs::read_to_string(&lib).unwrap();
    let output = analyzer.analyze(&content, "js", &[]).unwrap();
    let findings: Vec<_> = output
        .findings
        .into_iter()
        .filter(|f| f.kind == FindingKind::OrphanedFunction)
        .collect();
    assert!(!findings.is_empty());

    let validated = analyzer
        .validate_with_timeout(findings, &lib, dir.path(), "js", Duration::from_secs(30))
        .unwrap();
    assert!(validated.iter().all(|f| f.validated));
}
