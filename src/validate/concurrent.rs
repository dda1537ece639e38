//! Bounded-concurrency validation.
//!
//! Findings are independent, so validation fans out across a sized rayon
//! pool. The first error encountered is kept; successfully validated
//! findings are kept regardless. The timeout variant runs the batch on a
//! worker thread and gives up waiting after the deadline; the worker is
//! not forcibly cancelled.

use rayon::ThreadPoolBuilder;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use super::{validate_finding, CodebaseSearch};
use crate::detect::types::Finding;
use crate::error::{AnalysisError, Result};
use crate::lang::Lang;

pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Validate every finding in place, at most `max_concurrency` at a time.
pub fn validate_concurrently(
    search: &CodebaseSearch,
    findings: &mut [Finding],
    file: &Path,
    root: &Path,
    lang: Lang,
    max_concurrency: usize,
) -> Result<()> {
    if findings.is_empty() {
        return Ok(());
    }
    let threads = max_concurrency.max(1);
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| AnalysisError::Search(format!("validation pool: {e}")))?;

    let first_error: Mutex<Option<AnalysisError>> = Mutex::new(None);
    pool.install(|| {
        use rayon::prelude::*;
        findings.par_iter_mut().for_each(|finding| {
            if let Err(e) = validate_finding(search, finding, file, root, lang) {
                let mut slot = first_error.lock().unwrap_or_else(PoisonError::into_inner);
                if slot.is_none() {
                    *slot = Some(e);
                }
            }
        });
    });

    match first_error.into_inner().unwrap_or_else(PoisonError::into_inner) {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Like [`validate_concurrently`], but abandons the wait after `timeout`.
/// Returns the validated findings on success.
pub fn validate_with_timeout(
    search: Arc<CodebaseSearch>,
    mut findings: Vec<Finding>,
    file: PathBuf,
    root: PathBuf,
    lang: Lang,
    max_concurrency: usize,
    timeout: Duration,
) -> Result<Vec<Finding>> {
    if findings.is_empty() {
        return Ok(findings);
    }
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let outcome =
            validate_concurrently(&search, &mut findings, &file, &root, lang, max_concurrency)
                .map(|_| findings);
        // The receiver may have timed out and dropped; nothing to do then.
        let _ = tx.send(outcome);
    });

    match rx.recv_timeout(timeout) {
        Ok(outcome) => outcome,
        Err(_) => Err(AnalysisError::Timeout(timeout)),
    }
}
