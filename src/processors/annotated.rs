//! Annotated-tier processor
//!
//! Curated annotation fields are merged into the document first and are
//! never overwritten by heuristics; extraction then runs over the
//! annotation's description plus the decoded text to fill the gaps.

use super::{
    heuristic_metadata, merge_curated, ErrorRecord, ProcessingResult, ProcessorContext, Stage,
};
use crate::annotations::Annotation;
use crate::classifier::{FileDescriptor, Tier};
use crate::util::decode_lossy;

pub(super) fn process(
    ctx: &ProcessorContext,
    descriptor: &FileDescriptor,
    annotation: Option<&Annotation>,
    raw: &[u8],
) -> ProcessingResult {
    let decoded = decode_lossy(raw);
    let path_str = descriptor.path.to_string_lossy();

    match annotation {
        Some(annotation) => {
            let combined = format!("{}\n{}", annotation.description, decoded);
            let heuristic = heuristic_metadata(ctx, Tier::Annotated, &combined, &path_str);
            let metadata = merge_curated(annotation, heuristic);

            ProcessingResult {
                content: decoded,
                metadata,
                errors: Vec::new(),
            }
        }
        None => {
            // Scheduled as annotated but the index entry vanished between
            // classification and processing: degrade to plain extraction.
            let metadata = heuristic_metadata(ctx, Tier::Annotated, &decoded, &path_str);
            ProcessingResult {
                content: decoded,
                metadata,
                errors: vec![ErrorRecord::recoverable(
                    Stage::Lookup,
                    "annotation missing at processing time",
                )],
            }
        }
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

    fn annotation() -> Annotation {
        let mut annotation = Annotation::new(
            "Unauthenticated remote code execution in the admin panel of WordPress 5.5",
            "corpus/exploits/index_.txt",
        );
        annotation.author = Some("Curator".to_string());
        annotation.category = Some("exploit".to_string());
        annotation.tags = vec!["remote".to_string(), "rce".to_string()];
        annotation.systems = vec!["linux".to_string()];
        annotation
    }

    #[test]
    fn test_curated_fields_never_overwritten() {
        let descriptor = FileDescriptor::new("exploits/wp55.txt");
        // The file body names a different author; the curated one must win.
        let raw = b"Author: Somebody Else\nWordPress 5.5 exploit code";
        let result = process(&context(), &descriptor, Some(&annotation()), raw);

        assert_eq!(result.metadata.author.as_deref(), Some("Curator"));
        assert_eq!(result.metadata.category.as_deref(), Some("exploit"));
        assert_eq!(result.metadata.tags, vec!["remote", "rce"]);
    }

    #[test]
    fn test_extraction_runs_over_description_and_content() {
        let descriptor = FileDescriptor::new("exploits/wp55.txt");
        // The CVE only exists in the file body, the severity keywords only
        // in the curated description; both must land in the document.
        let raw = b"see also CVE-2020-1234";
        let result = process(&context(), &descriptor, Some(&annotation()), raw);

        assert_eq!(result.metadata.cve_ids, vec!["CVE-2020-1234"]);
        let severity = result.metadata.severity.expect("description classifies");
        assert!(severity.score >= 9.0);
        assert!(result
            .metadata
            .components
            .iter()
            .any(|c| c.name == "wordpress"));
        assert_eq!(result.metadata.processing_tier, Tier::Annotated);
    }

    #[test]
    fn test_missing_annotation_degrades_recoverably() {
        let descriptor = FileDescriptor::new("exploits/wp55.txt");
        let result = process(&context(), &descriptor, None, b"some text");

        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].recoverable);
        assert_eq!(result.errors[0].stage, Stage::Lookup);
        assert_eq!(result.content, "some text");
    }
}
