//! Rendering of findings and reports for the CLI.

use anyhow::Result;
use colored::Colorize;
use std::fmt::Write as _;

use crate::analysis::MultiFileOutput;
use crate::crossfile::CrossFileAnalysis;
use crate::detect::types::{Finding, Severity};
use crate::extract::FunctionInfo;
use crate::security::{SecurityReport, VulnSeverity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OutputFormat::Pretty => "pretty",
            OutputFormat::Json => "json",
        })
    }
}

fn severity_label(severity: Severity) -> String {
    match severity {
        Severity::Error => "error".red().bold().to_string(),
        Severity::Warning => "warning".yellow().bold().to_string(),
        Severity::Info => "info".blue().to_string(),
    }
}

fn vuln_severity_label(severity: VulnSeverity) -> String {
    match severity {
        VulnSeverity::Critical => "critical".red().bold().to_string(),
        VulnSeverity::High => "high".red().to_string(),
        VulnSeverity::Medium => "medium".yellow().to_string(),
        VulnSeverity::Low => "low".blue().to_string(),
    }
}

pub fn render_findings(findings: &[Finding], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(findings)?);
    }
    let mut out = String::new();
    for finding in findings {
        let location = if finding.file.is_empty() {
            format!("{}", finding.span)
        } else {
            format!("{}:{}", finding.file, finding.span)
        };
        writeln!(
            out,
            "{} {} {}",
            severity_label(finding.severity),
            finding.kind.as_str().bold(),
            location.dimmed()
        )?;
        writeln!(out, "  {}", finding.message)?;
        if !finding.snippet.is_empty() {
            writeln!(out, "  > {}", finding.snippet.dimmed())?;
        }
        if finding.validated {
            writeln!(
                out,
                "  {} {}",
                format!("confidence {:.0}%", finding.confidence * 100.0).cyan(),
                finding.reasoning.dimmed()
            )?;
        }
    }
    if findings.is_empty() {
        writeln!(out, "{}", "No findings.".green())?;
    } else {
        let errors = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        writeln!(
            out,
            "\n{} finding(s), {} error(s)",
            findings.len(),
            errors
        )?;
    }
    Ok(out)
}

pub fn render_cross_file(analysis: &CrossFileAnalysis, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(analysis)?);
    }
    let mut out = render_findings(&analysis.findings, format)?;
    let stats = &analysis.stats;
    writeln!(
        out,
        "{}",
        format!(
            "{} file(s) analyzed, {} skipped | {} symbols, {} references, {} import edges",
            stats.files_analyzed,
            stats.files_skipped,
            stats.symbols,
            stats.references,
            stats.dependencies
        )
        .dimmed()
    )?;
    Ok(out)
}

pub fn render_multi_file(output: &MultiFileOutput, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(output)?);
    }
    let mut out = render_findings(&output.findings, format)?;
    writeln!(
        out,
        "{}",
        format!(
            "{} file(s) analyzed, {} skipped",
            output.stats.files_analyzed, output.stats.files_skipped
        )
        .dimmed()
    )?;
    if let Some(err) = &output.first_error {
        writeln!(out, "{} {err}", "warning:".yellow())?;
    }
    Ok(out)
}

pub fn render_security(file: &str, report: &SecurityReport, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    let mut out = String::new();
    for vuln in &report.vulnerabilities {
        writeln!(
            out,
            "{} {} {}",
            vuln_severity_label(vuln.severity),
            vuln.kind.as_str().bold(),
            format!("{}:{}", file, vuln.span).dimmed()
        )?;
        writeln!(out, "  {}", vuln.message)?;
        if !vuln.snippet.is_empty() {
            writeln!(out, "  > {}", vuln.snippet.dimmed())?;
        }
        writeln!(out, "  fix: {}", vuln.remediation.cyan())?;
    }
    for pattern in &report.middleware {
        writeln!(
            out,
            "{} {}",
            "middleware".green(),
            format!("{}:{} {}", file, pattern.span, pattern.message).dimmed()
        )?;
    }
    if report.vulnerabilities.is_empty() {
        writeln!(out, "{}", format!("{file}: no vulnerabilities found").green())?;
    }
    Ok(out)
}

pub fn render_functions(
    file: &str,
    functions: &[FunctionInfo],
    format: OutputFormat,
) -> Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(functions)?);
    }
    let mut out = String::new();
    for function in functions {
        writeln!(
            out,
            "{} {}({}) {}",
            function.visibility.as_str().dimmed(),
            function.qualified.bold(),
            function.parameters.join(", "),
            format!("{}:{}", file, function.span).dimmed()
        )?;
    }
    writeln!(out, "\n{} function(s)", functions.len())?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::types::{FindingKind, FixKind};
    use crate::tree::Span;

    fn finding() -> Finding {
        let mut f = Finding::new(
            FindingKind::UnusedVariable,
            Severity::Warning,
            Span::point(3, 5),
            "Unused variable: 'x' is declared but never used".to_string(),
        )
        .with_snippet("var x int")
        .with_fix(FixKind::Delete);
        f.file = "main.go".to_string();
        f
    }

    #[test]
    fn json_output_is_a_findings_array() {
        let rendered = render_findings(&[finding()], OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        assert_eq!(parsed[0]["kind"], "unused_variable");
        assert_eq!(parsed[0]["file"], "main.go");
    }

    #[test]
    fn pretty_output_names_the_location_and_message() {
        colored::control::set_override(false);
        let rendered = render_findings(&[finding()], OutputFormat::Pretty).unwrap();
        assert!(rendered.contains("main.go:3:5"));
        assert!(rendered.contains("Unused variable: 'x'"));
        assert!(rendered.contains("1 finding(s)"));
    }

    #[test]
    fn empty_findings_render_cleanly() {
        colored::control::set_override(false);
        let rendered = render_findings(&[], OutputFormat::Pretty).unwrap();
        assert!(rendered.contains("No findings."));
    }
}
