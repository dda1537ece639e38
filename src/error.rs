//! Error taxonomy for the analysis engine.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by analysis entry points.
///
/// A detector returning no findings is not an error; callers distinguish
/// "no issues" from "analysis failed" only through this type.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unsupported language: {0:?}")]
    UnsupportedLanguage(String),

    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("parser returned no tree for {language}")]
    Parse { language: &'static str },

    #[error("language {0:?} is already registered")]
    DuplicateLanguage(String),

    #[error("invalid language bundle: {0}")]
    InvalidBundle(&'static str),

    #[error("function not found: {0:?}")]
    FunctionNotFound(String),

    #[error("codebase search failed: {0}")]
    Search(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("validation timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
