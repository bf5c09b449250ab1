//! Generic-tier processor: the guaranteed-success fallback
//!
//! Extracts printable text with a permissive decode and reruns the shared
//! pattern extraction over it. This strategy must never fail: a file that
//! decodes to nothing useful yields an empty-content result with a
//! recoverable decode record, not an error.

use super::{heuristic_metadata, ErrorRecord, ProcessingResult, ProcessorContext, Stage};
use crate::annotations::Annotation;
use crate::classifier::{FileDescriptor, Tier};
use crate::util::{clean_text, decode_lossy, printable_ratio};
use tracing::trace;

/// Below this printable fraction the decoded text is treated as binary.
const MIN_PRINTABLE_RATIO: f64 = 0.7;

pub(super) fn process(
    ctx: &ProcessorContext,
    descriptor: &FileDescriptor,
    _annotation: Option<&Annotation>,
    raw: &[u8],
) -> ProcessingResult {
    let decoded = decode_lossy(raw);
    let mut errors = Vec::new();

    // Extraction runs over the raw decoded text so line-anchored header
    // patterns still see the original structure; the stored content is the
    // whitespace-collapsed cleanup.
    let (content, extraction_text) = if decoded.is_empty() {
        (String::new(), String::new())
    } else if printable_ratio(&decoded) < MIN_PRINTABLE_RATIO {
        errors.push(ErrorRecord::recoverable(
            Stage::Decode,
            "content does not decode to printable text",
        ));
        (String::new(), String::new())
    } else {
        (clean_text(&decoded), decoded)
    };

    trace!(
        path = %descriptor.path.display(),
        bytes = raw.len(),
        chars = content.len(),
        "generic tier decode"
    );

    let path_str = descriptor.path.to_string_lossy();
    let metadata = heuristic_metadata(ctx, Tier::Generic, &extraction_text, &path_str);

    ProcessingResult {
        content,
        metadata,
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::AnalyzerRegistry;
    use crate::patterns::PatternLibrary;
    use std::sync::Arc;

    fn context() -> ProcessorContext {
        ProcessorContext::new(
            Arc::new(PatternLibrary::with_defaults()),
            Arc::new(AnalyzerRegistry::with_defaults()),
        )
    }

    #[test]
    fn test_plain_text_extraction() {
        let descriptor = FileDescriptor::new("advisory.txt");
        let raw = b"Remote SQL injection in phpBB giving database access.";
        let result = process(&context(), &descriptor, None, raw);

        assert!(result.errors.is_empty());
        assert!(result.content.contains("SQL injection"));
        assert_eq!(result.metadata.processing_tier, Tier::Generic);
        assert!(result.metadata.severity.is_some());
        assert!(result
            .metadata
            .components
            .iter()
            .any(|c| c.name == "phpbb"));
    }

    #[test]
    fn test_binary_degrades_without_raising() {
        let descriptor = FileDescriptor::new("payload.bin");
        let raw: Vec<u8> = (0u8..=255).cycle().take(2048).collect();
        let result = process(&context(), &descriptor, None, &raw);

        assert!(result.content.is_empty());
        assert!(result.metadata.components.is_empty());
        // The decode record is recoverable; nothing fatal happened.
        assert!(!result.has_fatal_errors());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].stage, Stage::Decode);
    }

    #[test]
    fn test_empty_file_is_clean_empty_result() {
        let descriptor = FileDescriptor::new("empty.dat");
        let result = process(&context(), &descriptor, None, b"");

        assert!(result.content.is_empty());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_header_fields_survive_whitespace_cleanup() {
        let descriptor = FileDescriptor::new("wp-content/plugins/contact-form-7/readme.txt");
        let raw = b"Contact Form 7\nVersion: 5.1.2\nAuthor: Takayuki Miyoshi\n";
        let result = process(&context(), &descriptor, None, raw);

        // Content is collapsed, but extraction saw the line structure.
        assert!(!result.content.contains('\n'));
        let plugin = result
            .metadata
            .components
            .iter()
            .find(|c| c.name == "contact-form-7")
            .unwrap();
        assert_eq!(plugin.version.as_deref(), Some("5.1.2"));
        assert_eq!(plugin.author.as_deref(), Some("Takayuki Miyoshi"));
    }

    #[test]
    fn test_path_patterns_still_apply_to_binary() {
        // Even an undecodable plugin archive is attributed by its path.
        let descriptor = FileDescriptor::new("wp-content/plugins/evil-plugin/evil.bin");
        let raw = vec![0u8; 512];
        let result = process(&context(), &descriptor, None, &raw);

        assert!(result
            .metadata
            .components
            .iter()
            .any(|c| c.name == "evil-plugin"));
    }
}
