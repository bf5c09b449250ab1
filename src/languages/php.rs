//! PHP source analyzer
//!
//! Covers the classic webshell/CMS-exploit shape: include/require pulls,
//! plain functions, the occasional class.

use super::{push_unique, signal_literals, LanguageId, SourceAnalysis, SourceAnalyzer, MAX_ANALYZE_BYTES};
use anyhow::{bail, Result};
use regex::Regex;

pub struct PhpAnalyzer;

impl SourceAnalyzer for PhpAnalyzer {
    fn language(&self) -> LanguageId {
        LanguageId::Php
    }

    fn extensions(&self) -> &[&str] {
        &["php", "php3", "php4", "php5", "phtml"]
    }

    fn shebang_hints(&self) -> &[&str] {
        &["php"]
    }

    fn content_hints(&self) -> &[&str] {
        &["<?php", "$_GET", "$_POST", "->"]
    }

    fn analyze(&self, source: &str) -> Result<SourceAnalysis> {
        if source.len() > MAX_ANALYZE_BYTES {
            bail!("source exceeds analyzer limit ({} bytes)", source.len());
        }

        let include_re = Regex::new(
            r#"(?i)\b(?:include|require)(?:_once)?\s*\(?\s*["']([^"']+)["']"#,
        )
        .expect("valid regex");
        let use_re = Regex::new(r"(?m)^\s*use\s+([\w\\]+)").expect("valid regex");
        let function_re =
            Regex::new(r"(?i)\bfunction\s+&?\s*([A-Za-z_]\w*)").expect("valid regex");
        let type_re = Regex::new(
            r"(?m)^\s*(?:abstract\s+|final\s+)?(?:class|interface|trait)\s+([A-Za-z_]\w*)",
        )
        .expect("valid regex");

        let mut analysis = SourceAnalysis::new(LanguageId::Php);
        for caps in include_re.captures_iter(source) {
            push_unique(&mut analysis.imports, &caps[1]);
        }
        for caps in use_re.captures_iter(source) {
            push_unique(&mut analysis.imports, &caps[1]);
        }
        for caps in function_re.captures_iter(source) {
            push_unique(&mut analysis.functions, &caps[1]);
        }
        for caps in type_re.captures_iter(source) {
            push_unique(&mut analysis.types, &caps[1]);
        }
        analysis.signal_literals = signal_literals(source);

        Ok(analysis)
    }
}
