//! Security finding model.
//!
//! Security vulnerabilities carry a description and remediation instead of
//! auto-fix metadata: they are never auto-applied.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tree::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VulnSeverity {
    Critical,
    High,
    Medium,
    Low,
}

impl VulnSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            VulnSeverity::Critical => "critical",
            VulnSeverity::High => "high",
            VulnSeverity::Medium => "medium",
            VulnSeverity::Low => "low",
        }
    }
}

impl fmt::Display for VulnSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VulnKind {
    HardcodedSecret,
    SqlInjection,
    CommandInjection,
    InsecureCrypto,
    Xss,
}

impl VulnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VulnKind::HardcodedSecret => "hardcoded_secret",
            VulnKind::SqlInjection => "sql_injection",
            VulnKind::CommandInjection => "command_injection",
            VulnKind::InsecureCrypto => "insecure_crypto",
            VulnKind::Xss => "xss",
        }
    }
}

impl fmt::Display for VulnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityVulnerability {
    pub kind: VulnKind,
    pub severity: VulnSeverity,
    #[serde(default)]
    pub file: String,
    pub span: Span,
    pub message: String,
    pub snippet: String,
    pub description: String,
    pub remediation: String,
    pub confidence: f64,
}

/// Authentication/authorization middleware schemes the inventory can spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiddlewareKind {
    Jwt,
    ApiKey,
    Oauth,
    Rbac,
    RateLimit,
    Cors,
    Generic,
}

impl MiddlewareKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MiddlewareKind::Jwt => "jwt_middleware",
            MiddlewareKind::ApiKey => "apikey_middleware",
            MiddlewareKind::Oauth => "oauth_middleware",
            MiddlewareKind::Rbac => "rbac_middleware",
            MiddlewareKind::RateLimit => "ratelimit_middleware",
            MiddlewareKind::Cors => "cors_middleware",
            MiddlewareKind::Generic => "generic_middleware",
        }
    }
}

/// Informational inventory entry, not a defect report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewarePattern {
    pub kind: MiddlewareKind,
    pub span: Span,
    pub message: String,
    pub snippet: String,
    pub confidence: f64,
}

/// Everything the security suite produced for one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityReport {
    pub vulnerabilities: Vec<SecurityVulnerability>,
    pub middleware: Vec<MiddlewarePattern>,
}

impl SecurityReport {
    pub fn is_empty(&self) -> bool {
        self.vulnerabilities.is_empty() && self.middleware.is_empty()
    }
}
