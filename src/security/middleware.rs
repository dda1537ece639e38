//! Security-middleware inventory.
//!
//! Informational recognition of authentication/authorization machinery:
//! JWT/bearer handling, API-key headers, OAuth, RBAC, rate limiting, CORS.
//! Presence is reported so a reviewer can see what protections exist; this
//! is not a defect report.

use std::collections::HashSet;

use super::types::{MiddlewareKind, MiddlewarePattern};
use crate::tree::Span;

struct SchemeMarkers {
    kind: MiddlewareKind,
    markers: &'static [&'static str],
    confidence: f64,
    label: &'static str,
}

const SCHEMES: &[SchemeMarkers] = &[
    SchemeMarkers {
        kind: MiddlewareKind::Jwt,
        markers: &["jwt", "bearer "],
        confidence: 0.85,
        label: "JWT/bearer authentication",
    },
    SchemeMarkers {
        kind: MiddlewareKind::ApiKey,
        markers: &["x-api-key", "api-key", "apikeyauth"],
        confidence: 0.8,
        label: "API-key authentication",
    },
    SchemeMarkers {
        kind: MiddlewareKind::Oauth,
        markers: &["oauth"],
        confidence: 0.8,
        label: "OAuth",
    },
    SchemeMarkers {
        kind: MiddlewareKind::Rbac,
        markers: &["rbac", "hasrole", "requirerole", "haspermission"],
        confidence: 0.8,
        label: "role-based access control",
    },
    SchemeMarkers {
        kind: MiddlewareKind::RateLimit,
        markers: &["ratelimit", "rate_limit", "throttle"],
        confidence: 0.8,
        label: "rate limiting",
    },
    SchemeMarkers {
        kind: MiddlewareKind::Cors,
        markers: &["cors"],
        confidence: 0.85,
        label: "CORS handling",
    },
];

pub fn detect(text: &str) -> Vec<MiddlewarePattern> {
    let mut patterns = Vec::new();
    let mut seen: HashSet<MiddlewareKind> = HashSet::new();

    for (idx, line) in text.lines().enumerate() {
        let lowered = line.to_ascii_lowercase();
        for scheme in SCHEMES {
            if seen.contains(&scheme.kind) {
                continue;
            }
            if scheme.markers.iter().any(|m| lowered.contains(m)) {
                seen.insert(scheme.kind);
                patterns.push(MiddlewarePattern {
                    kind: scheme.kind,
                    span: Span::point(idx + 1, 1),
                    message: format!("Security middleware detected: {}", scheme.label),
                    snippet: line.trim().to_string(),
                    confidence: scheme.confidence,
                });
            }
        }
        // A generic auth middleware only counts when nothing specific hit
        // on the same line.
        if !seen.contains(&MiddlewareKind::Generic)
            && lowered.contains("middleware")
            && lowered.contains("auth")
            && !SCHEMES
                .iter()
                .any(|s| s.markers.iter().any(|m| lowered.contains(m)))
        {
            seen.insert(MiddlewareKind::Generic);
            patterns.push(MiddlewarePattern {
                kind: MiddlewareKind::Generic,
                span: Span::point(idx + 1, 1),
                message: "Security middleware detected: generic authentication".to_string(),
                snippet: line.trim().to_string(),
                confidence: 0.8,
            });
        }
    }
    patterns
}
