//! Codebase search collaborator.
//!
//! A grep-style regex search over the project's source files, with the
//! usual build/vendor/VCS directories excluded. A clean no-match returns
//! an empty result, never an error. Results are cached per (root,
//! pattern) with a short TTL because validation fires the same patterns
//! repeatedly within one run.

use globset::{Glob, GlobSet, GlobSetBuilder};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

use crate::error::{AnalysisError, Result};

const EXCLUDED_DIRS: &[&str] = &[".git", "node_modules", "vendor", "target", "testdata", ".cursor"];

const SEARCH_CACHE_TTL: Duration = Duration::from_secs(300);

static SOURCE_GLOBS: Lazy<GlobSet> = Lazy::new(|| {
    let mut builder = GlobSetBuilder::new();
    for pattern in ["*.go", "*.js", "*.jsx", "*.ts", "*.tsx", "*.py"] {
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().expect("static source globs")
});

/// One match from the codebase search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub content: String,
}

struct CacheEntry {
    inserted: Instant,
    hits: Arc<Vec<SearchHit>>,
}

/// Regex search over a project tree with per-pattern caching.
pub struct CodebaseSearch {
    cache: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl CodebaseSearch {
    pub fn new() -> Self {
        CodebaseSearch {
            cache: RwLock::new(HashMap::new()),
            ttl: SEARCH_CACHE_TTL,
        }
    }

    #[cfg(test)]
    fn with_ttl(ttl: Duration) -> Self {
        CodebaseSearch {
            cache: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// All matches for `pattern` under `root`. No match is `Ok` and empty.
    pub fn search(&self, pattern: &str, root: &Path) -> Result<Arc<Vec<SearchHit>>> {
        let key = format!("{}::{}", root.display(), pattern);
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = cache.get(&key) {
                if entry.inserted.elapsed() < self.ttl {
                    return Ok(Arc::clone(&entry.hits));
                }
            }
        }

        let regex =
            Regex::new(pattern).map_err(|e| AnalysisError::Search(format!("bad pattern: {e}")))?;
        let hits = Arc::new(run_search(&regex, root));

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.retain(|_, entry| entry.inserted.elapsed() < self.ttl);
        cache.insert(
            key,
            CacheEntry {
                inserted: Instant::now(),
                hits: Arc::clone(&hits),
            },
        );
        Ok(hits)
    }

    /// Word-boundary reference count for an identifier.
    pub fn count_references(&self, name: &str, root: &Path) -> Result<usize> {
        let pattern = format!(r"\b{}\b", regex::escape(name));
        Ok(self.search(&pattern, root)?.len())
    }
}

impl Default for CodebaseSearch {
    fn default() -> Self {
        CodebaseSearch::new()
    }
}

fn run_search(regex: &Regex, root: &Path) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    let walker = WalkDir::new(root).follow_links(false).into_iter().filter_entry(|e| {
        let name = e.file_name().to_string_lossy();
        !(e.file_type().is_dir() && EXCLUDED_DIRS.contains(&name.as_ref()))
    });

    for entry in walker.flatten() {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let file_name = path.file_name().map(|n| n.to_string_lossy().to_string());
        let matches_glob = file_name
            .as_deref()
            .map(|n| SOURCE_GLOBS.is_match(n))
            .unwrap_or(false);
        if !matches_glob {
            continue;
        }
        // Binary or unreadable files are skipped, not fatal.
        let Ok(content) = std::fs::read_to_string(path) else {
            continue;
        };
        for (idx, line) in content.lines().enumerate() {
            if let Some(m) = regex.find(line) {
                hits.push(SearchHit {
                    file: path.to_path_buf(),
                    line: idx + 1,
                    column: m.start() + 1,
                    content: line.trim().to_string(),
                });
            }
        }
    }
    hits.sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)));
    hits
}

/// Intent markers a human leaves near deliberately-empty handlers.
const INTENT_MARKERS: &[&str] = &["TODO", "FIXME", "HACK", "XXX", "NOTE", "INTENTIONAL", "IGNORE"];

/// Whether an intent comment sits within `window` lines of `line` in the
/// given file. Unreadable files count as "no intent".
pub fn has_intent_comment(path: &Path, line: usize, window: usize) -> bool {
    let Ok(content) = std::fs::read_to_string(path) else {
        return false;
    };
    let lines: Vec<&str> = content.lines().collect();
    let start = line.saturating_sub(window + 1);
    let end = (line + window).min(lines.len());
    lines[start..end].iter().any(|l| {
        let upper = l.to_ascii_uppercase();
        INTENT_MARKERS.iter().any(|m| upper.contains(m))
    })
}
