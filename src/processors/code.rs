//! Source-code tier processor
//!
//! Detects the language, runs the matching lightweight analyzer, and feeds
//! version/CVE-looking string literals back into the software extractor as
//! additional signal. An analyzer failure is recorded but never blocks the
//! partial result; the decoded text itself is always returned as content.

use super::{
    heuristic_metadata, ErrorRecord, ProcessingResult, ProcessorContext, SourceSummary, Stage,
};
use crate::annotations::Annotation;
use crate::classifier::{FileDescriptor, Tier};
use crate::util::decode_lossy;
use tracing::debug;

pub(super) fn process(
    ctx: &ProcessorContext,
    descriptor: &FileDescriptor,
    _annotation: Option<&Annotation>,
    raw: &[u8],
) -> ProcessingResult {
    let decoded = decode_lossy(raw);
    let path_str = descriptor.path.to_string_lossy();
    let mut errors = Vec::new();

    let mut summary = None;
    let mut signal = String::new();

    match ctx.analyzers.detect(&descriptor.path, &decoded) {
        Some(language) => {
            debug!(
                path = %descriptor.path.display(),
                language = language.name(),
                "source analysis"
            );
            if let Some(analyzer) = ctx.analyzers.analyzer_for(language) {
                match analyzer.analyze(&decoded) {
                    Ok(analysis) => {
                        signal = analysis.signal_literals.join("\n");
                        summary = Some(SourceSummary::from(&analysis));
                    }
                    Err(err) => {
                        errors.push(ErrorRecord::fatal(
                            Stage::Analyze,
                            format!("{} analyzer failed: {:#}", language.name(), err),
                        ));
                    }
                }
            }
        }
        None => {
            debug!(path = %descriptor.path.display(), "no language detected, plain extraction");
        }
    }

    let mut metadata = if signal.is_empty() {
        heuristic_metadata(ctx, Tier::SourceCode, &decoded, &path_str)
    } else {
        let combined = format!("{}\n{}", decoded, signal);
        heuristic_metadata(ctx, Tier::SourceCode, &combined, &path_str)
    };
    metadata.source = summary;

    ProcessingResult {
        content: decoded,
        metadata,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::{AnalyzerRegistry, MAX_ANALYZE_BYTES};
    use crate::patterns::PatternLibrary;
    use std::sync::Arc;

    fn context() -> ProcessorContext {
        ProcessorContext::new(
            Arc::new(PatternLibrary::with_defaults()),
            Arc::new(AnalyzerRegistry::with_defaults()),
        )
    }

    #[test]
    fn test_python_exploit_analysis() {
        let source = br#"#!/usr/bin/env python
import requests

TARGET = "phpMyAdmin 4.8.1"

def exploit(url):
    pass
"#;
        let descriptor = FileDescriptor::new("exploits/pma.py");
        let result = process(&context(), &descriptor, None, source);

        assert!(result.errors.is_empty());
        let summary = result.metadata.source.as_ref().unwrap();
        assert_eq!(summary.language, "python");
        assert!(summary.imports.contains(&"requests".to_string()));
        assert!(summary.functions.contains(&"exploit".to_string()));
        assert_eq!(result.metadata.processing_tier, Tier::SourceCode);
    }

    #[test]
    fn test_string_literal_feeds_extractor() {
        // The version is only inside a string literal; the literal pass
        // re-exposes it next to the application name for the window scan.
        let source = br#"
import socket
banner = "phpmyadmin 4.8.1"
def run():
    pass
"#;
        let descriptor = FileDescriptor::new("exploits/pma.py");
        let result = process(&context(), &descriptor, None, source);

        let app = result
            .metadata
            .components
            .iter()
            .find(|c| c.name == "phpmyadmin")
            .expect("application detected");
        assert_eq!(app.version.as_deref(), Some("4.8.1"));
    }

    #[test]
    fn test_analyzer_failure_still_returns_partial_result() {
        let mut source = vec![b'#'; 16];
        source.extend(std::iter::repeat(b'x').take(MAX_ANALYZE_BYTES + 1));
        let descriptor = FileDescriptor::new("huge.py");
        let result = process(&context(), &descriptor, None, &source);

        assert!(result.has_fatal_errors());
        assert_eq!(result.errors[0].stage, Stage::Analyze);
        // Best-effort content is still the decoded text.
        assert_eq!(result.content.len(), source.len());
        assert!(result.metadata.source.is_none());
    }

    #[test]
    fn test_undetectable_language_is_not_an_error() {
        let descriptor = FileDescriptor::new("strange.xyz");
        let result = process(&context(), &descriptor, None, b"nothing recognizable here");

        assert!(result.errors.is_empty());
        assert!(result.metadata.source.is_none());
    }
}
