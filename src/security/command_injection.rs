//! Command injection detection.
//!
//! Flags process-execution calls fed by user-input-looking values with no
//! validate/sanitize/quote marker in sight.

use std::collections::HashSet;
use tree_sitter::Node;

use super::first_line;
use super::types::{SecurityVulnerability, VulnKind, VulnSeverity};
use crate::lang::Lang;
use crate::tree::{self, Span, Visit};

/// Lowercased substrings that mark a process-execution callee.
const EXEC_MARKERS: &[&str] = &[
    "exec.command",
    "syscall.exec",
    "os.system",
    "os.popen",
    "subprocess.call",
    "subprocess.popen",
    "subprocess.run",
    "subprocess.check_output",
    "child_process",
    "execsync",
    "execfile",
    "spawn",
    "popen",
];

const USER_INPUT_MARKERS: &[&str] = &[
    "req.",
    "request.",
    "params.",
    "query.",
    "body.",
    "form.",
    "input.",
    "user.",
    "sys.argv",
    "process.argv",
    "argv",
    "user_input",
    "userinput",
];

const SANITIZE_MARKERS: &[&str] = &["validate", "sanitize", "whitelist", "allowlist", "shlex.quote"];

pub fn detect(root: Node, text: &str, lang: Lang) -> Vec<SecurityVulnerability> {
    let mut vulnerabilities = Vec::new();
    let mut reported_lines: HashSet<usize> = HashSet::new();

    tree::traverse(root, &mut |node| {
        if !matches!(node.kind(), "call_expression" | "call") {
            return Visit::Descend;
        }
        let snippet = tree::node_text(node, text);
        let lowered = snippet.to_ascii_lowercase();
        let callee = node
            .child_by_field_name("function")
            .map(|f| tree::node_text(f, text).to_ascii_lowercase())
            .unwrap_or_default();

        let is_exec = EXEC_MARKERS
            .iter()
            .any(|m| callee.contains(m) || lowered.starts_with(m));
        if !is_exec {
            return Visit::Descend;
        }
        if SANITIZE_MARKERS.iter().any(|m| lowered.contains(m)) {
            return Visit::Descend;
        }
        let has_user_input = USER_INPUT_MARKERS.iter().any(|m| lowered.contains(m));
        let builds_command = snippet.contains('+') || snippet.contains("${")
            || snippet.contains("f\"") || snippet.contains("f'")
            || lowered.contains("shell=true");
        if !(has_user_input || builds_command) {
            return Visit::Descend;
        }

        let span = Span::from_node(&node);
        if reported_lines.insert(span.line) {
            vulnerabilities.push(SecurityVulnerability {
                kind: VulnKind::CommandInjection,
                severity: VulnSeverity::Critical,
                file: String::new(),
                span,
                message: "Potential command injection: user input in shell command".to_string(),
                snippet: first_line(snippet),
                description:
                    "User input used in a shell command without validation or quoting"
                        .to_string(),
                remediation: remediation_for(lang).to_string(),
                confidence: if has_user_input { 0.9 } else { 0.85 },
            });
        }
        // The callee chain would re-report inner calls on the same line.
        Visit::Skip
    });
    vulnerabilities
}

fn remediation_for(lang: Lang) -> &'static str {
    match lang {
        Lang::Go => "Use exec.Command with separate arguments and validate the input",
        Lang::Javascript | Lang::Typescript => {
            "Use child_process.spawn with array arguments and validate the input"
        }
        Lang::Python => "Use subprocess.run with list arguments (shell=False) and validate the input",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::parse_for_tests;

    fn run(lang: Lang, src: &str) -> Vec<SecurityVulnerability> {
        let tree = parse_for_tests(lang, src);
        detect(tree.root_node(), src, lang)
    }

    #[test]
    fn python_os_system_with_user_input_is_critical() {
        let src = "import os, sys\nos.system(\"ping \" + sys.argv[1])\n";
        let vulns = run(Lang::Python, src);
        assert_eq!(vulns.len(), 1);
        assert_eq!(vulns[0].kind, VulnKind::CommandInjection);
        assert_eq!(vulns[0].severity, VulnSeverity::Critical);
    }

    #[test]
    fn python_subprocess_shell_true_is_flagged() {
        let src = "import subprocess\nsubprocess.run(cmd, shell=True)\n";
        let vulns = run(Lang::Python, src);
        assert_eq!(vulns.len(), 1);
    }

    #[test]
    fn python_list_arguments_are_clean() {
        let src = "import subprocess\nsubprocess.run([\"ls\", \"-l\"])\n";
        assert!(run(Lang::Python, src).is_empty());
    }

    #[test]
    fn js_exec_with_request_data_is_flagged() {
        let src = "const { execSync } = require('child_process');\nfunction f(req) { execSync('convert ' + req.query.file); }\n";
        let vulns = run(Lang::Javascript, src);
        assert!(!vulns.is_empty());
    }

    #[test]
    fn go_exec_command_with_concatenation_is_flagged() {
        let src = "package main\nfunc f(name string) {\n\texec.Command(\"sh\", \"-c\", \"grep \"+name)\n}\n";
        let vulns = run(Lang::Go, src);
        assert_eq!(vulns.len(), 1);
    }

    #[test]
    fn sanitized_input_is_clean() {
        let src = "import shlex, os, sys\nos.system(\"ping \" + shlex.quote(sys.argv[1]))\n";
        assert!(run(Lang::Python, src).is_empty());
    }
}
