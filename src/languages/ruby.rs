//! Ruby source analyzer

use super::{push_unique, signal_literals, LanguageId, SourceAnalysis, SourceAnalyzer, MAX_ANALYZE_BYTES};
use anyhow::{bail, Result};
use regex::Regex;

pub struct RubyAnalyzer;

impl SourceAnalyzer for RubyAnalyzer {
    fn language(&self) -> LanguageId {
        LanguageId::Ruby
    }

    fn extensions(&self) -> &[&str] {
        &["rb"]
    }

    fn shebang_hints(&self) -> &[&str] {
        &["ruby"]
    }

    fn content_hints(&self) -> &[&str] {
        &["require ", "def ", "@"]
    }

    fn analyze(&self, source: &str) -> Result<SourceAnalysis> {
        if source.len() > MAX_ANALYZE_BYTES {
            bail!("source exceeds analyzer limit ({} bytes)", source.len());
        }

        let require_re =
            Regex::new(r#"(?m)^\s*require(?:_relative)?\s+["']([^"']+)["']"#).expect("valid regex");
        let def_re = Regex::new(r"(?m)^\s*def\s+([A-Za-z_]\w*[?!]?)").expect("valid regex");
        let class_re =
            Regex::new(r"(?m)^\s*(?:class|module)\s+([A-Z]\w*)").expect("valid regex");

        let mut analysis = SourceAnalysis::new(LanguageId::Ruby);
        for caps in require_re.captures_iter(source) {
            push_unique(&mut analysis.imports, &caps[1]);
        }
        for caps in def_re.captures_iter(source) {
            push_unique(&mut analysis.functions, &caps[1]);
        }
        for caps in class_re.captures_iter(source) {
            push_unique(&mut analysis.types, &caps[1]);
        }
        analysis.signal_literals = signal_literals(source);

        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_requires_and_defs() {
        let source = r#"
require 'net/http'

module Sploit
  class Runner
    def exploit!
      "targets 3.2.1"
    end
  end
end
"#;
        let analysis = RubyAnalyzer.analyze(source).unwrap();
        assert_eq!(analysis.imports, vec!["net/http"]);
        assert_eq!(analysis.functions, vec!["exploit!"]);
        assert_eq!(analysis.types, vec!["Sploit", "Runner"]);
        assert!(analysis.signal_literals.iter().any(|l| l.contains("3.2.1")));
    }

    #[test]
    fn test_analyze_rejects_oversized_input() {
        let big = "x".repeat(MAX_ANALYZE_BYTES + 1);
        assert!(RubyAnalyzer.analyze(&big).is_err());
    }
}
