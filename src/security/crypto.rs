//! Insecure cryptography detection: MD5/SHA-1 usage.

use phf::phf_set;
use std::collections::HashSet;

use super::types::{SecurityVulnerability, VulnKind, VulnSeverity};
use crate::tree::Span;

/// Lowercased markers of broken hash functions.
static WEAK_HASH_MARKERS: phf::Set<&'static str> = phf_set! {
    "crypto/md5",
    "crypto/sha1",
    "md5.new(",
    "sha1.new(",
    "md5.sum(",
    "sha1.sum(",
    "hashlib.md5",
    "hashlib.sha1",
    "createhash('md5')",
    "createhash(\"md5\")",
    "createhash('sha1')",
    "createhash(\"sha1\")",
    "md5(",
    "sha1(",
};

pub fn detect(text: &str) -> Vec<SecurityVulnerability> {
    let mut vulnerabilities = Vec::new();
    let mut reported_lines: HashSet<usize> = HashSet::new();

    for (idx, line) in text.lines().enumerate() {
        let lowered = line.to_ascii_lowercase();
        let weak = WEAK_HASH_MARKERS.iter().any(|m| lowered.contains(m));
        if !weak {
            continue;
        }
        let line_no = idx + 1;
        if !reported_lines.insert(line_no) {
            continue;
        }
        vulnerabilities.push(SecurityVulnerability {
            kind: VulnKind::InsecureCrypto,
            severity: VulnSeverity::High,
            file: String::new(),
            span: Span::point(line_no, 1),
            message: "Insecure cryptographic hash function detected (MD5 or SHA-1)"
                .to_string(),
            snippet: line.trim().to_string(),
            description: "MD5 and SHA-1 are cryptographically broken and must not be used"
                .to_string(),
            remediation: "Use SHA-256 or SHA-512, and a dedicated KDF for passwords"
                .to_string(),
            confidence: 0.95,
        });
    }
    vulnerabilities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_md5_import_is_flagged() {
        let src = "import \"crypto/md5\"\n";
        let vulns = detect(src);
        assert_eq!(vulns.len(), 1);
        assert_eq!(vulns[0].kind, VulnKind::InsecureCrypto);
        assert_eq!(vulns[0].severity, VulnSeverity::High);
    }

    #[test]
    fn python_hashlib_sha1_is_flagged() {
        let src = "import hashlib\nh = hashlib.sha1(data)\n";
        let vulns = detect(src);
        assert_eq!(vulns.len(), 1);
        assert_eq!(vulns[0].span.line, 2);
    }

    #[test]
    fn node_createhash_md5_is_flagged() {
        let src = "const h = crypto.createHash('md5');\n";
        assert_eq!(detect(src).len(), 1);
    }

    #[test]
    fn sha256_is_clean() {
        let src = "import hashlib\nh = hashlib.sha256(data)\n";
        assert!(detect(src).is_empty());
    }

    #[test]
    fn one_report_per_line() {
        let src = "h = hashlib.md5(hashlib.md5(x).digest())\n";
        assert_eq!(detect(src).len(), 1);
    }
}
