//! Result cache for repeated analysis of identical input.
//!
//! Keyed by a hash of (source, language, requested checks) so the same
//! text analyzed twice returns the stored findings. Entries expire after
//! a TTL; expired entries are swept lazily once the map grows past a
//! bound, so the hot path never pays for a full scan.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::detect::types::Finding;
use crate::lang::Lang;

const DEFAULT_TTL: Duration = Duration::from_secs(300);
const SWEEP_THRESHOLD: usize = 1000;

struct CacheEntry {
    inserted: Instant,
    findings: Vec<Finding>,
}

pub struct ParseCache {
    entries: RwLock<HashMap<u64, CacheEntry>>,
    ttl: Duration,
    last_sweep: Mutex<Instant>,
    max_entries: usize,
}

impl ParseCache {
    pub fn new() -> Self {
        ParseCache::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        ParseCache {
            entries: RwLock::new(HashMap::new()),
            ttl,
            last_sweep: Mutex::new(Instant::now()),
            max_entries: SWEEP_THRESHOLD,
        }
    }

    /// Stable key over the text, the language, and the check tokens in
    /// sorted order so token ordering does not split the cache.
    pub fn key(text: &str, lang: Lang, checks: &[String]) -> u64 {
        let mut sorted: Vec<&str> = checks.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        lang.as_str().hash(&mut hasher);
        sorted.hash(&mut hasher);
        hasher.finish()
    }

    pub fn get(&self, key: u64) -> Option<Vec<Finding>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(&key)?;
        if entry.inserted.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.findings.clone())
    }

    pub fn put(&self, key: u64, findings: Vec<Finding>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.len() >= self.max_entries {
            let mut last_sweep = self.last_sweep.lock().unwrap_or_else(PoisonError::into_inner);
            if last_sweep.elapsed() >= self.ttl {
                entries.retain(|_, e| e.inserted.elapsed() < self.ttl);
                *last_sweep = Instant::now();
            }
        }
        entries.insert(
            key,
            CacheEntry {
                inserted: Instant::now(),
                findings,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for ParseCache {
    fn default() -> Self {
        ParseCache::new()
    }
}
