//! The analysis entry point tying parsing, detection, caching,
//! validation, and cross-file analysis together.

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::ParseCache;
use crate::crossfile::{self, CrossFileAnalysis, CrossFileStats, FileInput};
use crate::detect::types::{DetectionConfig, Finding};
use crate::detect::{run_checks, CheckSet};
use crate::error::{AnalysisError, Result};
use crate::extract::{self, FunctionInfo};
use crate::lang::{parse_source, Lang, LanguageRegistry};
use crate::security::{self, SecurityReport};
use crate::tree;
use crate::validate::{self, concurrent::DEFAULT_MAX_CONCURRENCY, CodebaseSearch};

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisStats {
    pub parse_ms: u64,
    pub analysis_ms: u64,
    pub node_count: usize,
    pub finding_count: usize,
}

#[derive(Debug, Serialize)]
pub struct AnalysisOutput {
    pub language: Lang,
    pub findings: Vec<Finding>,
    pub stats: AnalysisStats,
    pub from_cache: bool,
}

#[derive(Debug, Serialize)]
pub struct MultiFileOutput {
    /// Per-file and cross-file findings merged, each attributed to its file.
    pub findings: Vec<Finding>,
    pub stats: CrossFileStats,
    /// First per-file failure, if any file could not be analyzed.
    pub first_error: Option<String>,
}

/// Stateful analyzer. Construction wires the registry, result cache,
/// codebase search, and detection config; each analysis call is
/// independent after that.
pub struct Analyzer {
    registry: LanguageRegistry,
    cache: ParseCache,
    search: Arc<CodebaseSearch>,
    config: DetectionConfig,
}

impl Analyzer {
    pub fn new() -> Self {
        Analyzer::with_config(DetectionConfig::default())
    }

    pub fn with_config(config: DetectionConfig) -> Self {
        Analyzer {
            registry: LanguageRegistry::with_builtin_languages(),
            cache: ParseCache::new(),
            search: Arc::new(CodebaseSearch::new()),
            config,
        }
    }

    pub fn registry(&self) -> &LanguageRegistry {
        &self.registry
    }

    fn resolve(&self, language: &str) -> Result<Lang> {
        self.registry
            .resolve(language)
            .ok_or_else(|| AnalysisError::UnsupportedLanguage(language.to_string()))
    }

    /// Run the requested quality checks over one source text. Identical
    /// input within the cache TTL returns the stored findings.
    pub fn analyze(&self, text: &str, language: &str, checks: &[String]) -> Result<AnalysisOutput> {
        let lang = self.resolve(language)?;
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput("source"));
        }

        let key = ParseCache::key(text, lang, checks);
        if let Some(findings) = self.cache.get(key) {
            let stats = AnalysisStats {
                finding_count: findings.len(),
                ..AnalysisStats::default()
            };
            return Ok(AnalysisOutput {
                language: lang,
                findings,
                stats,
                from_cache: true,
            });
        }

        let parse_start = Instant::now();
        let parsed = parse_source(lang, text)?;
        let parse_ms = parse_start.elapsed().as_millis() as u64;

        let check_set = CheckSet::from_tokens(checks);
        let analysis_start = Instant::now();
        let findings = run_checks(parsed.root_node(), text, lang, &check_set, &self.config);
        let analysis_ms = analysis_start.elapsed().as_millis() as u64;

        self.cache.put(key, findings.clone());
        let stats = AnalysisStats {
            parse_ms,
            analysis_ms,
            node_count: tree::count_nodes(parsed.root_node()),
            finding_count: findings.len(),
        };
        Ok(AnalysisOutput {
            language: lang,
            findings,
            stats,
            from_cache: false,
        })
    }

    /// Run the security detectors over one source text.
    pub fn scan_security(&self, text: &str, language: &str) -> Result<SecurityReport> {
        let lang = self.resolve(language)?;
        if text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput("source"));
        }
        let parsed = parse_source(lang, text)?;
        Ok(security::scan(parsed.root_node(), text, lang))
    }

    pub fn extract_functions(
        &self,
        text: &str,
        language: &str,
        filter: Option<&str>,
    ) -> Result<Vec<FunctionInfo>> {
        let lang = self.resolve(language)?;
        let parsed = parse_source(lang, text)?;
        Ok(extract::extract_functions(parsed.root_node(), text, lang, filter))
    }

    pub fn extract_function_by_name(
        &self,
        text: &str,
        language: &str,
        name: &str,
    ) -> Result<FunctionInfo> {
        let lang = self.resolve(language)?;
        let parsed = parse_source(lang, text)?;
        extract::extract_function_by_name(parsed.root_node(), text, lang, name)
    }

    /// Graph analysis over a set of files.
    pub fn analyze_cross_file(
        &self,
        files: &[FileInput],
        checks: &CheckSet,
    ) -> Result<CrossFileAnalysis> {
        crossfile::analyze(files, checks, &self.registry, &self.config)
    }

    /// Per-file checks plus cross-file analysis over the same set, merged
    /// with file attribution. Files that fail per-file analysis are still
    /// part of the cross-file pass.
    pub fn analyze_multi_file(
        &self,
        files: &[FileInput],
        checks: &[String],
        cross_checks: &CheckSet,
    ) -> Result<MultiFileOutput> {
        if files.is_empty() {
            return Err(AnalysisError::EmptyInput("files"));
        }
        let mut findings = Vec::new();
        let mut first_error = None;
        for file in files {
            let language = file
                .language
                .clone()
                .or_else(|| self.registry.resolve_path(&file.path).map(|l| l.as_str().to_string()));
            let Some(language) = language else {
                continue;
            };
            match self.analyze(&file.content, &language, checks) {
                Ok(output) => {
                    findings.extend(output.findings.into_iter().map(|mut f| {
                        f.file = file.path.clone();
                        f
                    }));
                }
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(format!("{}: {e}", file.path));
                    }
                }
            }
        }

        let cross = self.analyze_cross_file(files, cross_checks)?;
        findings.extend(cross.findings);
        findings.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then(a.span.line.cmp(&b.span.line))
                .then(a.kind.as_str().cmp(b.kind.as_str()))
        });
        Ok(MultiFileOutput {
            findings,
            stats: cross.stats,
            first_error,
        })
    }

    /// Re-score findings against the codebase under `root`.
    pub fn validate(
        &self,
        findings: &mut [Finding],
        file: &Path,
        root: &Path,
        language: &str,
    ) -> Result<()> {
        let lang = self.resolve(language)?;
        validate::validate_concurrently(
            &self.search,
            findings,
            file,
            root,
            lang,
            DEFAULT_MAX_CONCURRENCY,
        )
    }

    /// Validation with a wall-clock bound.
    pub fn validate_with_timeout(
        &self,
        findings: Vec<Finding>,
        file: &Path,
        root: &Path,
        language: &str,
        timeout: Duration,
    ) -> Result<Vec<Finding>> {
        let lang = self.resolve(language)?;
        validate::validate_with_timeout(
            Arc::clone(&self.search),
            findings,
            file.to_path_buf(),
            root.to_path_buf(),
            lang,
            DEFAULT_MAX_CONCURRENCY,
            timeout,
        )
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer::new()
    }
}
