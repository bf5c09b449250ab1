//! Severity factor tables
//!
//! Four ordered bands, each defined by disjoint keyword sets for
//! vulnerability type, impact, and access context. The keyword sets are a
//! starting configuration distilled from common advisory wording, not a
//! fixed oracle; the band structure itself is closed.

use crate::extractors::severity::SeverityLevel;
use regex::Regex;

/// One keyword with its compiled word-boundary pattern.
pub struct FactorKeyword {
    pub text: &'static str,
    pub pattern: Regex,
}

/// One severity band with its score range and factor keyword sets.
pub struct SeverityBand {
    pub level: SeverityLevel,
    /// Inclusive lower score bound
    pub floor: f64,
    /// Exclusive upper score bound (10.0 itself is reachable for critical)
    pub ceiling: f64,
    pub vuln_types: Vec<FactorKeyword>,
    pub impacts: Vec<FactorKeyword>,
    pub accesses: Vec<FactorKeyword>,
}

/// The four bands, ordered most severe first.
pub struct SeverityTable {
    pub bands: Vec<SeverityBand>,
}

fn compile(words: &[&'static str]) -> Vec<FactorKeyword> {
    words
        .iter()
        .map(|w| FactorKeyword {
            text: w,
            pattern: Regex::new(&format!(r"(?i)\b{}\b", regex::escape(w))).expect("valid regex"),
        })
        .collect()
}

impl SeverityTable {
    pub fn with_defaults() -> Self {
        let bands = vec![
            SeverityBand {
                level: SeverityLevel::Critical,
                floor: 9.0,
                ceiling: 10.0,
                vuln_types: compile(&[
                    "remote code execution",
                    "rce",
                    "command injection",
                    "command execution",
                    "arbitrary code execution",
                    "unrestricted file upload",
                ]),
                impacts: compile(&[
                    "full compromise",
                    "system takeover",
                    "root access",
                    "admin panel",
                    "complete control",
                ]),
                accesses: compile(&[
                    "unauthenticated",
                    "pre-auth",
                    "without authentication",
                    "no authentication",
                ]),
            },
            SeverityBand {
                level: SeverityLevel::High,
                floor: 7.0,
                ceiling: 9.0,
                vuln_types: compile(&[
                    "sql injection",
                    "sqli",
                    "authentication bypass",
                    "privilege escalation",
                    "insecure deserialization",
                    "remote file inclusion",
                ]),
                impacts: compile(&[
                    "database access",
                    "credential theft",
                    "account takeover",
                    "data exfiltration",
                    "arbitrary file read",
                ]),
                accesses: compile(&["remote", "network"]),
            },
            SeverityBand {
                level: SeverityLevel::Medium,
                floor: 4.0,
                ceiling: 7.0,
                vuln_types: compile(&[
                    "cross-site scripting",
                    "xss",
                    "cross-site request forgery",
                    "csrf",
                    "directory traversal",
                    "open redirect",
                ]),
                impacts: compile(&[
                    "session hijacking",
                    "cookie theft",
                    "information disclosure",
                    "sensitive data",
                ]),
                accesses: compile(&["authenticated", "user interaction"]),
            },
            SeverityBand {
                level: SeverityLevel::Low,
                floor: 0.0,
                ceiling: 4.0,
                vuln_types: compile(&[
                    "denial of service",
                    "dos",
                    "clickjacking",
                    "full path disclosure",
                    "version disclosure",
                ]),
                impacts: compile(&["service disruption", "crash", "resource exhaustion"]),
                accesses: compile(&["local", "physical"]),
            },
        ];

        Self { bands }
    }

    pub fn band(&self, level: SeverityLevel) -> &SeverityBand {
        self.bands
            .iter()
            .find(|b| b.level == level)
            .expect("all four bands are always present")
    }
}
