//! Perl source analyzer

use super::{push_unique, signal_literals, LanguageId, SourceAnalysis, SourceAnalyzer, MAX_ANALYZE_BYTES};
use anyhow::{bail, Result};
use regex::Regex;

pub struct PerlAnalyzer;

impl SourceAnalyzer for PerlAnalyzer {
    fn language(&self) -> LanguageId {
        LanguageId::Perl
    }

    fn extensions(&self) -> &[&str] {
        &["pl", "pm", "cgi"]
    }

    fn shebang_hints(&self) -> &[&str] {
        &["perl"]
    }

    fn content_hints(&self) -> &[&str] {
        &["use strict", "my $", "sub "]
    }

    fn analyze(&self, source: &str) -> Result<SourceAnalysis> {
        if source.len() > MAX_ANALYZE_BYTES {
            bail!("source exceeds analyzer limit ({} bytes)", source.len());
        }

        let use_re = Regex::new(r"(?m)^\s*(?:use|require)\s+([A-Za-z][\w:]*)").expect("valid regex");
        let sub_re = Regex::new(r"(?m)^\s*sub\s+([A-Za-z_]\w*)").expect("valid regex");
        let package_re = Regex::new(r"(?m)^\s*package\s+([A-Za-z][\w:]*)").expect("valid regex");

        let mut analysis = SourceAnalysis::new(LanguageId::Perl);
        for caps in use_re.captures_iter(source) {
            // `use strict`/`use warnings` are pragmas, not dependencies.
            if &caps[1] != "strict" && &caps[1] != "warnings" {
                push_unique(&mut analysis.imports, &caps[1]);
            }
        }
        for caps in sub_re.captures_iter(source) {
            push_unique(&mut analysis.functions, &caps[1]);
        }
        for caps in package_re.captures_iter(source) {
            push_unique(&mut analysis.types, &caps[1]);
        }
        analysis.signal_literals = signal_literals(source);

        Ok(analysis)
    }
}
