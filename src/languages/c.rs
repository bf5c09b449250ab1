//! C/C++ source analyzer
//!
//! The exploit corpus is full of standalone C proof-of-concept programs,
//! usually a single translation unit with a handful of helpers.

use super::{push_unique, signal_literals, LanguageId, SourceAnalysis, SourceAnalyzer, MAX_ANALYZE_BYTES};
use anyhow::{bail, Result};
use regex::Regex;

pub struct CAnalyzer;

impl SourceAnalyzer for CAnalyzer {
    fn language(&self) -> LanguageId {
        LanguageId::C
    }

    fn extensions(&self) -> &[&str] {
        &["c", "h", "cpp", "cc", "cxx", "hpp"]
    }

    fn shebang_hints(&self) -> &[&str] {
        &[]
    }

    fn content_hints(&self) -> &[&str] {
        &["#include", "int main(", "void main("]
    }

    fn analyze(&self, source: &str) -> Result<SourceAnalysis> {
        if source.len() > MAX_ANALYZE_BYTES {
            bail!("source exceeds analyzer limit ({} bytes)", source.len());
        }

        let include_re =
            Regex::new(r#"(?m)^\s*#\s*include\s*[<"]([^>"]+)[>"]"#).expect("valid regex");
        let function_re =
            Regex::new(r"(?m)^[A-Za-z_][\w\s\*]*?\b([A-Za-z_]\w*)\s*\([^;{}]*\)\s*\{")
                .expect("valid regex");
        let type_re =
            Regex::new(r"\b(?:struct|union|enum)\s+([A-Za-z_]\w*)").expect("valid regex");
        let typedef_re =
            Regex::new(r"(?m)^\s*typedef\s+[^;]*?\b([A-Za-z_]\w*)\s*;").expect("valid regex");

        let mut analysis = SourceAnalysis::new(LanguageId::C);
        for caps in include_re.captures_iter(source) {
            push_unique(&mut analysis.imports, &caps[1]);
        }
        for caps in function_re.captures_iter(source) {
            push_unique(&mut analysis.functions, &caps[1]);
        }
        for caps in type_re.captures_iter(source) {
            push_unique(&mut analysis.types, &caps[1]);
        }
        for caps in typedef_re.captures_iter(source) {
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
    fn test_analyze_includes_and_functions() {
        let source = r#"
#include <stdio.h>
#include "shellcode.h"

struct target {
    char *name;
};

int build_payload(char *buf, int len) {
    return 0;
}

int main(int argc, char **argv) {
    printf("exploit for httpd 2.4.49\n");
    return 0;
}
"#;
        let analysis = CAnalyzer.analyze(source).unwrap();
        assert_eq!(analysis.imports, vec!["stdio.h", "shellcode.h"]);
        assert!(analysis.functions.contains(&"build_payload".to_string()));
        assert!(analysis.functions.contains(&"main".to_string()));
        assert!(analysis.types.contains(&"target".to_string()));
        assert!(analysis
            .signal_literals
            .iter()
            .any(|l| l.contains("2.4.49")));
    }

    #[test]
    fn test_analyze_rejects_oversized_input() {
        let big = "x".repeat(MAX_ANALYZE_BYTES + 1);
        assert!(CAnalyzer.analyze(&big).is_err());
    }
}
