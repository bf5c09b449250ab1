//! Language detection and lightweight source analysis
//!
//! The corpus is dominated by exploit code in C, PHP, Perl, Python, Ruby
//! and shell. Each language gets a small analyzer that pulls out
//! import/include statements, top-level function and type names, and any
//! string literals that look like version numbers or CVE identifiers.
//! Analysis is regex-driven and intentionally shallow; it produces signal
//! for the extractors, not an AST.

mod c;
mod perl;
mod php;
mod python;
mod registry;
mod ruby;
mod shell;

pub use c::CAnalyzer;
pub use perl::PerlAnalyzer;
pub use php::PhpAnalyzer;
pub use python::PythonAnalyzer;
pub use registry::AnalyzerRegistry;
pub use ruby::RubyAnalyzer;
pub use shell::ShellAnalyzer;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Sources larger than this are rejected by the analyzers.
pub const MAX_ANALYZE_BYTES: usize = 1_048_576;

/// Identifier for a supported source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageId {
    C,
    Python,
    Php,
    Perl,
    Ruby,
    Shell,
}

impl LanguageId {
    pub fn name(&self) -> &'static str {
        match self {
            LanguageId::C => "c",
            LanguageId::Python => "python",
            LanguageId::Php => "php",
            LanguageId::Perl => "perl",
            LanguageId::Ruby => "ruby",
            LanguageId::Shell => "shell",
        }
    }

    /// Parses a language name as used in configuration overrides.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "c" => Some(LanguageId::C),
            "python" => Some(LanguageId::Python),
            "php" => Some(LanguageId::Php),
            "perl" => Some(LanguageId::Perl),
            "ruby" => Some(LanguageId::Ruby),
            "shell" | "sh" | "bash" => Some(LanguageId::Shell),
            _ => None,
        }
    }
}

/// What a lightweight analyzer found in one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAnalysis {
    pub language: LanguageId,
    pub imports: Vec<String>,
    pub functions: Vec<String>,
    pub types: Vec<String>,
    /// String literals resembling version numbers or CVE identifiers
    pub signal_literals: Vec<String>,
}

impl SourceAnalysis {
    pub fn new(language: LanguageId) -> Self {
        Self {
            language,
            imports: Vec::new(),
            functions: Vec::new(),
            types: Vec::new(),
            signal_literals: Vec::new(),
        }
    }
}

/// Per-language lightweight source analyzer.
pub trait SourceAnalyzer: Send + Sync {
    fn language(&self) -> LanguageId;

    /// File extensions associated with this language (without the dot)
    fn extensions(&self) -> &[&str];

    /// Interpreter names matched against a shebang line
    fn shebang_hints(&self) -> &[&str];

    /// Keyword probes used when extension and shebang are both absent
    fn content_hints(&self) -> &[&str];

    /// Runs the analysis. Fails on oversized input; partial results are
    /// never returned from here - a failure means no analysis at all.
    fn analyze(&self, source: &str) -> Result<SourceAnalysis>;
}

/// String literals that carry version- or CVE-shaped content.
///
/// Shared by every analyzer; the extractors treat these as additional
/// text to scan, so precision matters more than recall.
pub fn signal_literals(source: &str) -> Vec<String> {
    let quoted = Regex::new(r#"["']([^"'\r\n]{1,120})["']"#).expect("valid regex");
    let versionish = Regex::new(r"(?i)\d+\.\d+|\bCVE-\d{4}-\d{4,7}\b").expect("valid regex");

    let mut out: Vec<String> = Vec::new();
    for caps in quoted.captures_iter(source) {
        let literal = caps[1].trim().to_string();
        if versionish.is_match(&literal) && !out.contains(&literal) {
            out.push(literal);
        }
    }
    out
}

/// Pushes a capture into `out`, dropping duplicates.
pub(crate) fn push_unique(out: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() && !out.iter().any(|v| v == value) {
        out.push(value.to_string());
    }
}
