//! Language-aware regex templates for codebase validation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lang::Lang;

/// `name(` with a word boundary, tolerating space before the paren.
pub fn call_pattern(name: &str) -> String {
    format!(r"\b{}\s*\(", regex::escape(name))
}

/// A bare word-boundary reference.
pub fn reference_pattern(name: &str) -> String {
    format!(r"\b{}\b", regex::escape(name))
}

static IDENT_DEFAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static identifier pattern"));
static IDENT_JS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("static identifier pattern"));

/// Guard before interpolating a name into a search pattern. JavaScript
/// additionally allows `$`.
pub fn is_valid_identifier(name: &str, lang: Lang) -> bool {
    if name.is_empty() {
        return false;
    }
    match lang {
        Lang::Javascript | Lang::Typescript => IDENT_JS.is_match(name),
        _ => IDENT_DEFAULT.is_match(name),
    }
}

/// The subject of a finding: the text between the first pair of single
/// quotes in its message.
pub fn extract_quoted_name(message: &str) -> Option<String> {
    let start = message.find('\'')?;
    let rest = &message[start + 1..];
    let end = rest.find('\'')?;
    let name = &rest[..end];
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_pattern_escapes_metacharacters() {
        assert_eq!(call_pattern("run"), r"\brun\s*\(");
        assert!(call_pattern("a.b").contains(r"a\.b"));
    }

    #[test]
    fn identifier_validation_per_language() {
        assert!(is_valid_identifier("snake_case", Lang::Go));
        assert!(is_valid_identifier("_private", Lang::Python));
        assert!(is_valid_identifier("$el", Lang::Javascript));
        assert!(!is_valid_identifier("$el", Lang::Go));
        assert!(!is_valid_identifier("1abc", Lang::Python));
        assert!(!is_valid_identifier("a b", Lang::Go));
        assert!(!is_valid_identifier("", Lang::Go));
    }

    #[test]
    fn quoted_name_extraction() {
        assert_eq!(
            extract_quoted_name("Unused variable: 'x' is declared but never used"),
            Some("x".to_string())
        );
        assert_eq!(extract_quoted_name("no quotes here"), None);
        assert_eq!(extract_quoted_name("empty '' quotes"), None);
    }
}
