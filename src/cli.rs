//! Command-line interface for crosslint.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::analysis::Analyzer;
use crate::crossfile::FileInput;
use crate::detect::CheckSet;
use crate::error::AnalysisError;
use crate::report::{self, OutputFormat};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FINDINGS: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Directories never analyzed when walking a tree.
const SKIPPED_DIRS: &[&str] = &[".git", "node_modules", "vendor", "target", "testdata"];

/// Multi-language static analysis with codebase-aware validation.
///
/// Crosslint parses Go, JavaScript, TypeScript, and Python with
/// tree-sitter, runs quality and security detectors over the syntax
/// tree, and cross-checks findings against the rest of the project
/// before recommending a fix.
#[derive(Parser)]
#[command(name = "crosslint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run quality checks over a file or directory
    Analyze(AnalyzeArgs),
    /// Analyze a directory as one project: exports, references, cycles
    CrossFile(CrossFileArgs),
    /// Run the security detectors
    Security(SecurityArgs),
    /// List the functions a file defines
    Functions(FunctionsArgs),
}

#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Path to analyze (file or directory)
    pub path: PathBuf,

    /// Language override (go, js, ts, python); default: by extension
    #[arg(short, long)]
    pub language: Option<String>,

    /// Comma-separated checks (default: all)
    #[arg(short, long, value_delimiter = ',')]
    pub checks: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Cross-check findings against the project before reporting
    #[arg(long)]
    pub validate: bool,

    /// Project root for validation (default: the path's directory)
    #[arg(long)]
    pub project_root: Option<PathBuf>,
}

#[derive(Parser)]
pub struct CrossFileArgs {
    /// Directory to analyze as one project
    pub path: PathBuf,

    /// Comma-separated cross-file checks (default: unused_exports,
    /// undefined_refs, circular_deps)
    #[arg(short, long, value_delimiter = ',')]
    pub checks: Vec<String>,

    /// Also run the per-file quality checks
    #[arg(long)]
    pub with_file_checks: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

#[derive(Parser)]
pub struct SecurityArgs {
    /// Path to scan (file or directory)
    pub path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

#[derive(Parser)]
pub struct FunctionsArgs {
    /// File to inventory
    pub path: PathBuf,

    /// Only list functions whose name contains this text
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

pub fn run_analyze(args: &AnalyzeArgs) -> Result<i32> {
    let analyzer = Analyzer::new();
    let files = collect_source_files(&args.path)?;
    if files.is_empty() {
        bail!("no source files found under {}", args.path.display());
    }

    let mut all_findings = Vec::new();
    for file in &files {
        let content = read_source(file)?;
        let language = match resolve_language(&analyzer, args.language.as_deref(), file)? {
            Some(language) => language,
            None => continue,
        };
        let mut output = analyzer.analyze(&content, &language, &args.checks)?;
        if args.validate {
            let root = args
                .project_root
                .clone()
                .or_else(|| file.parent().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."));
            analyzer.validate(&mut output.findings, file, &root, &language)?;
        }
        for mut finding in output.findings {
            finding.file = file.display().to_string();
            all_findings.push(finding);
        }
    }

    print!("{}", report::render_findings(&all_findings, args.format)?);
    Ok(exit_code_for(&all_findings))
}

/// Findings fail the run only at error severity; warnings and info
/// report but exit clean.
fn exit_code_for(findings: &[crate::detect::Finding]) -> i32 {
    if findings
        .iter()
        .any(|f| f.severity == crate::detect::Severity::Error)
    {
        EXIT_FINDINGS
    } else {
        EXIT_SUCCESS
    }
}

pub fn run_cross_file(args: &CrossFileArgs) -> Result<i32> {
    let analyzer = Analyzer::new();
    let files = collect_source_files(&args.path)?;
    if files.is_empty() {
        bail!("no source files found under {}", args.path.display());
    }
    let inputs: Vec<FileInput> = files
        .iter()
        .map(|file| {
            let content = read_source(file)?;
            Ok(FileInput {
                path: file.display().to_string(),
                content,
                language: None,
            })
        })
        .collect::<Result<_>>()?;

    let checks = CheckSet::from_tokens(&args.checks);
    let (rendered, code) = if args.with_file_checks {
        let output = analyzer.analyze_multi_file(&inputs, &[], &checks)?;
        (
            report::render_multi_file(&output, args.format)?,
            exit_code_for(&output.findings),
        )
    } else {
        let analysis = analyzer.analyze_cross_file(&inputs, &checks)?;
        (
            report::render_cross_file(&analysis, args.format)?,
            exit_code_for(&analysis.findings),
        )
    };
    print!("{rendered}");
    Ok(code)
}

pub fn run_security(args: &SecurityArgs) -> Result<i32> {
    let analyzer = Analyzer::new();
    let files = collect_source_files(&args.path)?;
    if files.is_empty() {
        bail!("no source files found under {}", args.path.display());
    }

    let mut vulnerable = false;
    for file in &files {
        let content = read_source(file)?;
        let Some(language) = resolve_language(&analyzer, None, file)? else {
            continue;
        };
        let mut scan = analyzer.scan_security(&content, &language)?;
        let name = file.display().to_string();
        for vuln in &mut scan.vulnerabilities {
            vuln.file = name.clone();
        }
        vulnerable |= !scan.vulnerabilities.is_empty();
        print!("{}", report::render_security(&name, &scan, args.format)?);
    }
    Ok(if vulnerable { EXIT_FINDINGS } else { EXIT_SUCCESS })
}

pub fn run_functions(args: &FunctionsArgs) -> Result<i32> {
    let analyzer = Analyzer::new();
    let content = read_source(&args.path)?;
    let language = resolve_language(&analyzer, None, &args.path)?
        .ok_or_else(|| anyhow::anyhow!("unsupported file type: {}", args.path.display()))?;
    let functions = analyzer.extract_functions(&content, &language, args.name.as_deref())?;
    print!(
        "{}",
        report::render_functions(&args.path.display().to_string(), &functions, args.format)?
    );
    Ok(EXIT_SUCCESS)
}

fn read_source(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path).map_err(|source| AnalysisError::Io {
        path: path.display().to_string(),
        source,
    })?)
}

fn resolve_language(
    analyzer: &Analyzer,
    flag: Option<&str>,
    file: &Path,
) -> Result<Option<String>> {
    if let Some(language) = flag {
        return Ok(Some(language.to_string()));
    }
    Ok(analyzer
        .registry()
        .resolve_path(&file.display().to_string())
        .map(|lang| lang.as_str().to_string()))
}

/// Every analyzable source file under `path`, in stable order.
fn collect_source_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        bail!("path does not exist: {}", path.display());
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            // The root itself is exempt: `analyze .` and dot-named
            // project directories must still walk.
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_dir() {
                !SKIPPED_DIRS.contains(&name.as_ref()) && !name.starts_with('.')
            } else {
                true
            }
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|file| {
            crate::lang::Lang::from_path(&file.display().to_string()).is_some()
        })
        .collect();
    files.sort();
    Ok(files)
}
