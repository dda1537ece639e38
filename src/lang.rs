//! Supported languages and the registry that maps names to them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use crate::error::{AnalysisError, Result};

/// Languages the engine can analyze.
///
/// A closed enum keeps per-language dispatch exhaustive; the registry is
/// the extension point for wiring new names to a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Go,
    Javascript,
    Typescript,
    Python,
}

impl Lang {
    /// Canonicalize a language name, accepting common aliases
    /// (js/jsx, ts/tsx, py, golang).
    pub fn normalize(name: &str) -> Option<Lang> {
        match name.trim().to_ascii_lowercase().as_str() {
            "go" | "golang" => Some(Lang::Go),
            "javascript" | "js" | "jsx" => Some(Lang::Javascript),
            "typescript" | "ts" | "tsx" => Some(Lang::Typescript),
            "python" | "py" => Some(Lang::Python),
            _ => None,
        }
    }

    /// Infer the language from a file path's extension.
    pub fn from_path(path: &str) -> Option<Lang> {
        let ext = path.rsplit('.').next()?;
        match ext {
            "go" => Some(Lang::Go),
            "js" | "jsx" | "mjs" | "cjs" => Some(Lang::Javascript),
            "ts" | "tsx" => Some(Lang::Typescript),
            "py" => Some(Lang::Python),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Go => "go",
            Lang::Javascript => "javascript",
            Lang::Typescript => "typescript",
            Lang::Python => "python",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Lang::Go => &["go"],
            Lang::Javascript => &["js", "jsx", "mjs", "cjs"],
            Lang::Typescript => &["ts", "tsx"],
            Lang::Python => &["py"],
        }
    }

    /// The grammar for this language. Parser instances are created per
    /// call because `tree_sitter::Parser` is not `Sync`.
    pub fn grammar(&self) -> tree_sitter::Language {
        match self {
            Lang::Go => tree_sitter_go::LANGUAGE.into(),
            Lang::Javascript => tree_sitter_javascript::LANGUAGE.into(),
            Lang::Typescript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Lang::Python => tree_sitter_python::LANGUAGE.into(),
        }
    }

    /// Whether a name is public API by this language's convention:
    /// leading uppercase for Go/JS/TS, no leading underscore for Python.
    pub fn is_exported_name(&self, name: &str) -> bool {
        match self {
            Lang::Python => !name.starts_with('_') && !name.is_empty(),
            _ => name
                .chars()
                .next()
                .map(|c| c.is_uppercase())
                .unwrap_or(false),
        }
    }

    /// True for the JavaScript family (TypeScript shares its grammar shape).
    pub fn is_js_family(&self) -> bool {
        matches!(self, Lang::Javascript | Lang::Typescript)
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse source text with a fresh parser instance.
pub fn parse_source(lang: Lang, text: &str) -> Result<tree_sitter::Tree> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&lang.grammar())
        .map_err(|_| AnalysisError::Parse {
            language: lang.as_str(),
        })?;
    parser.parse(text, None).ok_or(AnalysisError::Parse {
        language: lang.as_str(),
    })
}

/// What a registered name resolves to.
#[derive(Debug, Clone)]
pub struct LanguageBundle {
    pub lang: Lang,
    pub extensions: &'static [&'static str],
}

impl LanguageBundle {
    pub fn for_lang(lang: Lang) -> Self {
        LanguageBundle {
            lang,
            extensions: lang.extensions(),
        }
    }
}

/// Maps language names to bundles.
///
/// An explicit context object rather than a process-wide static, so tests
/// can build isolated instances. Lookups are safe before registration and
/// under concurrent registration.
pub struct LanguageRegistry {
    bundles: RwLock<HashMap<String, LanguageBundle>>,
}

impl LanguageRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        LanguageRegistry {
            bundles: RwLock::new(HashMap::new()),
        }
    }

    /// A registry with the four built-in languages registered.
    pub fn with_builtin_languages() -> Self {
        let registry = LanguageRegistry::new();
        for lang in [Lang::Go, Lang::Javascript, Lang::Typescript, Lang::Python] {
            // Fresh registry, canonical names: cannot collide.
            let _ = registry.register(lang.as_str(), LanguageBundle::for_lang(lang));
        }
        registry
    }

    /// Register a bundle under a canonical name. Fails on an empty name,
    /// an empty extension list, or a name that is already present.
    pub fn register(&self, name: &str, bundle: LanguageBundle) -> Result<()> {
        if name.trim().is_empty() {
            return Err(AnalysisError::InvalidBundle("name is empty"));
        }
        if bundle.extensions.is_empty() {
            return Err(AnalysisError::InvalidBundle("no file extensions"));
        }
        let mut bundles = self
            .bundles
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if bundles.contains_key(name) {
            return Err(AnalysisError::DuplicateLanguage(name.to_string()));
        }
        bundles.insert(name.to_string(), bundle);
        Ok(())
    }

    /// Resolve a possibly-aliased language name to a registered language.
    /// Returns `None` for unknown names rather than failing.
    pub fn resolve(&self, name: &str) -> Option<Lang> {
        let canonical = Lang::normalize(name)
            .map(|l| l.as_str().to_string())
            .unwrap_or_else(|| name.trim().to_ascii_lowercase());
        let bundles = self.bundles.read().unwrap_or_else(PoisonError::into_inner);
        bundles.get(&canonical).map(|b| b.lang)
    }

    /// Resolve a language from a file path via registered extensions.
    pub fn resolve_path(&self, path: &str) -> Option<Lang> {
        let ext = path.rsplit('.').next()?;
        let bundles = self.bundles.read().unwrap_or_else(PoisonError::into_inner);
        bundles
            .values()
            .find(|b| b.extensions.contains(&ext))
            .map(|b| b.lang)
    }

    pub fn registered_names(&self) -> Vec<String> {
        let bundles = self.bundles.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = bundles.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        LanguageRegistry::with_builtin_languages()
    }
}
