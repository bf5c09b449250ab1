//! Shell script analyzer

use super::{push_unique, signal_literals, LanguageId, SourceAnalysis, SourceAnalyzer, MAX_ANALYZE_BYTES};
use anyhow::{bail, Result};
use regex::Regex;

pub struct ShellAnalyzer;

impl SourceAnalyzer for ShellAnalyzer {
    fn language(&self) -> LanguageId {
        LanguageId::Shell
    }

    fn extensions(&self) -> &[&str] {
        &["sh", "bash"]
    }

    fn shebang_hints(&self) -> &[&str] {
        &["sh", "bash", "zsh", "ksh"]
    }

    fn content_hints(&self) -> &[&str] {
        &["echo ", "fi", "esac"]
    }

    fn analyze(&self, source: &str) -> Result<SourceAnalysis> {
        if source.len() > MAX_ANALYZE_BYTES {
            bail!("source exceeds analyzer limit ({} bytes)", source.len());
        }

        let source_re =
            Regex::new(r"(?m)^\s*(?:source|\.)\s+(\S+)").expect("valid regex");
        let function_re =
            Regex::new(r"(?m)^\s*(?:function\s+)?([A-Za-z_]\w*)\s*\(\)\s*\{?").expect("valid regex");

        let mut analysis = SourceAnalysis::new(LanguageId::Shell);
        for caps in source_re.captures_iter(source) {
            push_unique(&mut analysis.imports, &caps[1]);
        }
        for caps in function_re.captures_iter(source) {
            push_unique(&mut analysis.functions, &caps[1]);
        }
        analysis.signal_literals = signal_literals(source);

        Ok(analysis)
    }
}
