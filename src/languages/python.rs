//! Python source analyzer

use super::{push_unique, signal_literals, LanguageId, SourceAnalysis, SourceAnalyzer, MAX_ANALYZE_BYTES};
use anyhow::{bail, Result};
use regex::Regex;

pub struct PythonAnalyzer;

impl SourceAnalyzer for PythonAnalyzer {
    fn language(&self) -> LanguageId {
        LanguageId::Python
    }

    fn extensions(&self) -> &[&str] {
        &["py"]
    }

    fn shebang_hints(&self) -> &[&str] {
        &["python"]
    }

    fn content_hints(&self) -> &[&str] {
        &["import ", "def ", "__main__"]
    }

    fn analyze(&self, source: &str) -> Result<SourceAnalysis> {
        if source.len() > MAX_ANALYZE_BYTES {
            bail!("source exceeds analyzer limit ({} bytes)", source.len());
        }

        let import_re = Regex::new(r"(?m)^\s*(?:from\s+([\w.]+)\s+import|import\s+([\w.]+))")
            .expect("valid regex");
        let function_re = Regex::new(r"(?m)^\s*def\s+([A-Za-z_]\w*)").expect("valid regex");
        let class_re = Regex::new(r"(?m)^\s*class\s+([A-Za-z_]\w*)").expect("valid regex");

        let mut analysis = SourceAnalysis::new(LanguageId::Python);
        for caps in import_re.captures_iter(source) {
            if let Some(m) = caps.get(1).or_else(|| caps.get(2)) {
                push_unique(&mut analysis.imports, m.as_str());
            }
        }
        for caps in function_re.captures_iter(source) {
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
    fn test_analyze_imports_functions_classes() {
        let source = r#"
import socket
from urllib.parse import quote

TARGET_VERSION = "1.3.37"

class Exploit:
    def run(self):
        pass

def main():
    pass
"#;
        let analysis = PythonAnalyzer.analyze(source).unwrap();
        assert_eq!(analysis.imports, vec!["socket", "urllib.parse"]);
        assert!(analysis.functions.contains(&"run".to_string()));
        assert!(analysis.functions.contains(&"main".to_string()));
        assert_eq!(analysis.types, vec!["Exploit"]);
        assert_eq!(analysis.signal_literals, vec!["1.3.37"]);
    }

    #[test]
    fn test_analyze_rejects_oversized_input() {
        let big = "x".repeat(MAX_ANALYZE_BYTES + 1);
        assert!(PythonAnalyzer.analyze(&big).is_err());
    }
}
