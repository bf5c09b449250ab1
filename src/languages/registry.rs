use super::{
    CAnalyzer, LanguageId, PerlAnalyzer, PhpAnalyzer, PythonAnalyzer, RubyAnalyzer, ShellAnalyzer,
    SourceAnalyzer,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// A content probe needs at least this many distinct hint hits to claim a
/// language; single-keyword coincidences are too common in advisory text.
const MIN_CONTENT_HINTS: usize = 2;

#[derive(Clone)]
pub struct AnalyzerRegistry {
    analyzers: Vec<Arc<dyn SourceAnalyzer>>,
    extension_overrides: HashMap<String, LanguageId>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self {
            analyzers: Vec::new(),
            extension_overrides: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CAnalyzer));
        registry.register(Arc::new(PythonAnalyzer));
        registry.register(Arc::new(PhpAnalyzer));
        registry.register(Arc::new(PerlAnalyzer));
        registry.register(Arc::new(RubyAnalyzer));
        registry.register(Arc::new(ShellAnalyzer));
        registry
    }

    pub fn register(&mut self, analyzer: Arc<dyn SourceAnalyzer>) {
        self.analyzers.push(analyzer);
    }

    /// Merges caller-supplied `extension -> language name` mappings over the
    /// defaults. Unknown language names are skipped with a warning.
    pub fn apply_extension_overrides(&mut self, overrides: &[(String, String)]) {
        for (ext, lang) in overrides {
            match LanguageId::from_name(lang) {
                Some(id) => {
                    self.extension_overrides.insert(ext.to_lowercase(), id);
                }
                None => {
                    warn!(extension = %ext, language = %lang, "Unknown language in extension override");
                }
            }
        }
    }

    pub fn analyzer_for(&self, id: LanguageId) -> Option<&dyn SourceAnalyzer> {
        self.analyzers
            .iter()
            .find(|a| a.language() == id)
            .map(|a| a.as_ref())
    }

    pub fn language_for_extension(&self, ext: &str) -> Option<LanguageId> {
        let ext = ext.to_lowercase();
        if let Some(id) = self.extension_overrides.get(&ext) {
            return Some(*id);
        }
        self.analyzers
            .iter()
            .find(|a| a.extensions().contains(&ext.as_str()))
            .map(|a| a.language())
    }

    /// Matches a `#!` interpreter line, handling `/usr/bin/env` indirection.
    pub fn language_for_shebang(&self, first_line: &str) -> Option<LanguageId> {
        let rest = first_line.strip_prefix("#!")?;
        let mut tokens = rest.split_whitespace();
        let mut interpreter = tokens.next()?.rsplit('/').next()?;
        if interpreter == "env" {
            interpreter = tokens.next()?;
        }
        self.analyzers
            .iter()
            .find(|a| {
                a.shebang_hints()
                    .iter()
                    .any(|hint| interpreter.starts_with(hint))
            })
            .map(|a| a.language())
    }

    /// Keyword-probe fallback for extensionless files without a shebang.
    pub fn language_for_content(&self, source: &str) -> Option<LanguageId> {
        let mut best: Option<(LanguageId, usize)> = None;
        for analyzer in &self.analyzers {
            let hits = analyzer
                .content_hints()
                .iter()
                .filter(|hint| source.contains(*hint))
                .count();
            if hits >= MIN_CONTENT_HINTS && best.map(|(_, b)| hits > b).unwrap_or(true) {
                best = Some((analyzer.language(), hits));
            }
        }
        best.map(|(id, _)| id)
    }

    /// MIME types commonly declared for source files in corpus indexes.
    pub fn language_for_mime(&self, mime: &str) -> Option<LanguageId> {
        match mime.to_lowercase().as_str() {
            "text/x-c" | "text/x-csrc" | "text/x-chdr" | "text/x-c++src" => Some(LanguageId::C),
            "text/x-python" | "text/x-script.python" | "application/x-python" => {
                Some(LanguageId::Python)
            }
            "text/x-php" | "application/x-php" | "application/x-httpd-php" => Some(LanguageId::Php),
            "text/x-perl" | "application/x-perl" => Some(LanguageId::Perl),
            "text/x-ruby" | "application/x-ruby" => Some(LanguageId::Ruby),
            "text/x-shellscript" | "application/x-sh" | "application/x-shellscript" => {
                Some(LanguageId::Shell)
            }
            _ => None,
        }
    }

    /// Extension -> shebang -> content probe, in that order.
    pub fn detect(&self, path: &Path, source: &str) -> Option<LanguageId> {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if let Some(id) = self.language_for_extension(ext) {
                return Some(id);
            }
        }
        if let Some(first_line) = source.lines().next() {
            if let Some(id) = self.language_for_shebang(first_line) {
                return Some(id);
            }
        }
        self.language_for_content(source)
    }

    pub fn known_extension(&self, ext: &str) -> bool {
        self.language_for_extension(ext).is_some()
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_extension_detection() {
        let registry = AnalyzerRegistry::with_defaults();
        assert_eq!(registry.language_for_extension("c"), Some(LanguageId::C));
        assert_eq!(registry.language_for_extension("PY"), Some(LanguageId::Python));
        assert_eq!(registry.language_for_extension("txt"), None);
    }

    #[test]
    fn test_extension_overrides() {
        let mut registry = AnalyzerRegistry::with_defaults();
        registry.apply_extension_overrides(&[
            ("inc".to_string(), "php".to_string()),
            ("weird".to_string(), "klingon".to_string()),
        ]);
        assert_eq!(registry.language_for_extension("inc"), Some(LanguageId::Php));
        assert_eq!(registry.language_for_extension("weird"), None);
    }

    #[test]
    fn test_shebang_detection() {
        let registry = AnalyzerRegistry::with_defaults();
        assert_eq!(
            registry.language_for_shebang("#!/usr/bin/perl -w"),
            Some(LanguageId::Perl)
        );
        assert_eq!(
            registry.language_for_shebang("#!/usr/bin/env python3"),
            Some(LanguageId::Python)
        );
        assert_eq!(
            registry.language_for_shebang("#!/bin/bash"),
            Some(LanguageId::Shell)
        );
        assert_eq!(registry.language_for_shebang("plain text"), None);
    }

    #[test]
    fn test_content_probe_requires_two_hints() {
        let registry = AnalyzerRegistry::with_defaults();
        assert_eq!(
            registry.language_for_content("import socket\ndef main():\n    pass"),
            Some(LanguageId::Python)
        );
        // One coincidental keyword is not enough.
        assert_eq!(registry.language_for_content("def is short for definition"), None);
    }

    #[test]
    fn test_detect_prefers_extension() {
        let registry = AnalyzerRegistry::with_defaults();
        // Extension says C even though the content smells like Python.
        let id = registry.detect(
            &PathBuf::from("exploit.c"),
            "import os\ndef main():\n    pass",
        );
        assert_eq!(id, Some(LanguageId::C));
    }

    #[test]
    fn test_detect_falls_back_to_shebang() {
        let registry = AnalyzerRegistry::with_defaults();
        let id = registry.detect(&PathBuf::from("exploit"), "#!/usr/bin/ruby\nputs 'x'");
        assert_eq!(id, Some(LanguageId::Ruby));
    }

    #[test]
    fn test_mime_detection() {
        let registry = AnalyzerRegistry::with_defaults();
        assert_eq!(
            registry.language_for_mime("application/x-perl"),
            Some(LanguageId::Perl)
        );
        assert_eq!(registry.language_for_mime("text/plain"), None);
    }

    #[test]
    fn test_analyzer_for_every_language() {
        let registry = AnalyzerRegistry::with_defaults();
        for id in [
            LanguageId::C,
            LanguageId::Python,
            LanguageId::Php,
            LanguageId::Perl,
            LanguageId::Ruby,
            LanguageId::Shell,
        ] {
            assert!(registry.analyzer_for(id).is_some());
        }
    }
}
