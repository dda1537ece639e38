//! Security detectors.
//!
//! An independent pipeline from the quality checks: results are
//! [`SecurityVulnerability`] values plus an informational middleware
//! inventory, and are never auto-applied.

pub mod command_injection;
pub mod crypto;
pub mod middleware;
pub mod secrets;
pub mod sql_injection;
pub mod types;
pub mod xss;

pub use types::{
    MiddlewareKind, MiddlewarePattern, SecurityReport, SecurityVulnerability, VulnKind,
    VulnSeverity,
};

use tree_sitter::Node;

use crate::lang::Lang;

/// Run every security detector over one parsed file.
pub fn scan(root: Node, text: &str, lang: Lang) -> SecurityReport {
    let mut vulnerabilities = Vec::new();
    vulnerabilities.extend(secrets::detect(root, text, lang));
    vulnerabilities.extend(crypto::detect(text));
    vulnerabilities.extend(sql_injection::detect(root, text, lang));
    vulnerabilities.extend(command_injection::detect(root, text, lang));
    vulnerabilities.extend(xss::detect(root, text, lang));

    SecurityReport {
        vulnerabilities,
        middleware: middleware::detect(text),
    }
}

pub(crate) fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or("").trim().to_string()
}
