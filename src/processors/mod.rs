//! Tier processors and the processing result model
//!
//! Three interchangeable strategies share one signature and are selected by
//! `Tier` alone; callers never inspect which variant ran. The tier set is
//! closed, so dispatch is a plain match rather than an open trait object.

mod annotated;
mod basic;
mod code;

use crate::annotations::Annotation;
use crate::classifier::{FileDescriptor, Tier};
use crate::extractors::relations::runtime_subject;
use crate::extractors::{
    ComponentKind, ExtractedComponent, RelationResolver, RelationSet, SeverityAssessment,
    SeverityClassifier, SoftwareExtractor,
};
use crate::languages::{AnalyzerRegistry, SourceAnalysis};
use crate::patterns::PatternLibrary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Where in the per-file pipeline an error was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Lookup,
    Read,
    Decode,
    Analyze,
    Schedule,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Lookup => "lookup",
            Stage::Read => "read",
            Stage::Decode => "decode",
            Stage::Analyze => "analyze",
            Stage::Schedule => "schedule",
        };
        write!(f, "{}", s)
    }
}

/// A failure attached to a result; never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub stage: Stage,
    pub message: String,
    pub recoverable: bool,
}

impl ErrorRecord {
    pub fn recoverable(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            recoverable: true,
        }
    }

    pub fn fatal(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            recoverable: false,
        }
    }
}

/// Condensed view of a source analysis, carried in the metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub language: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

impl From<&SourceAnalysis> for SourceSummary {
    fn from(analysis: &SourceAnalysis) -> Self {
        Self {
            language: analysis.language.name().to_string(),
            imports: analysis.imports.clone(),
            functions: analysis.functions.clone(),
            types: analysis.types.clone(),
        }
    }
}

/// The merged metadata document for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub components: Vec<ExtractedComponent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<SeverityAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relations: Option<RelationSet>,
    pub processing_tier: Tier,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cve_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub systems: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub declared_hashes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceSummary>,
}

impl DocumentMetadata {
    pub fn empty(tier: Tier) -> Self {
        Self {
            components: Vec::new(),
            severity: None,
            relations: None,
            processing_tier: tier,
            cve_ids: Vec::new(),
            tags: Vec::new(),
            systems: Vec::new(),
            category: None,
            author: None,
            declared_hashes: BTreeMap::new(),
            source: None,
        }
    }
}

/// Everything produced for one file. Owned by the caller; never shared
/// across files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub content: String,
    pub metadata: DocumentMetadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorRecord>,
}

impl ProcessingResult {
    /// Synthesized result for a file that could not be processed at all.
    pub fn failed(tier: Tier, stage: Stage, message: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            metadata: DocumentMetadata::empty(tier),
            errors: vec![ErrorRecord::fatal(stage, message)],
        }
    }

    pub fn has_fatal_errors(&self) -> bool {
        self.errors.iter().any(|e| !e.recoverable)
    }
}

/// Shared, read-only extraction machinery handed to every tier processor.
#[derive(Clone)]
pub struct ProcessorContext {
    pub patterns: Arc<PatternLibrary>,
    pub analyzers: Arc<AnalyzerRegistry>,
    pub software: SoftwareExtractor,
    pub severity: SeverityClassifier,
    pub relations: RelationResolver,
}

impl ProcessorContext {
    pub fn new(patterns: Arc<PatternLibrary>, analyzers: Arc<AnalyzerRegistry>) -> Self {
        let software = SoftwareExtractor::new(Arc::clone(&patterns));
        let severity = SeverityClassifier::new(Arc::clone(&patterns));
        Self {
            patterns,
            analyzers,
            software,
            severity,
            relations: RelationResolver::new(),
        }
    }
}

/// Dispatches one file to its tier's strategy.
pub fn process(
    tier: Tier,
    ctx: &ProcessorContext,
    descriptor: &FileDescriptor,
    annotation: Option<&Annotation>,
    raw: &[u8],
) -> ProcessingResult {
    match tier {
        Tier::Annotated => annotated::process(ctx, descriptor, annotation, raw),
        Tier::SourceCode => code::process(ctx, descriptor, annotation, raw),
        Tier::Generic => basic::process(ctx, descriptor, annotation, raw),
    }
}

/// Runs the extraction sub-algorithms over `text` and assembles the
/// heuristic side of the metadata document.
pub(crate) fn heuristic_metadata(
    ctx: &ProcessorContext,
    tier: Tier,
    text: &str,
    path: &str,
) -> DocumentMetadata {
    let components = ctx.software.extract(text, path);
    let severity = ctx.severity.classify(&components, text);
    let relations = resolve_primary_relations(ctx, &components);
    let cve_ids = ctx.patterns.find_cve_ids(text);
    let author = ctx.software.author_of(text);

    DocumentMetadata {
        components,
        severity,
        relations,
        cve_ids,
        author,
        ..DocumentMetadata::empty(tier)
    }
}

/// Resolves relations for the first detected CMS or application. The known
/// runtime version, when the text also names the platform's language with a
/// version, narrows the incompatibility list.
fn resolve_primary_relations(
    ctx: &ProcessorContext,
    components: &[ExtractedComponent],
) -> Option<RelationSet> {
    let primary = components
        .iter()
        .find(|c| matches!(c.kind, ComponentKind::Cms | ComponentKind::Application))?;

    let known_runtime = runtime_subject(&primary.name).and_then(|subject| {
        components
            .iter()
            .find(|c| c.kind == ComponentKind::Language && c.name == subject)
            .and_then(|c| c.version.as_deref())
    });

    ctx.relations.resolve(&primary.name, known_runtime)
}

/// Overlays curated annotation fields on top of a heuristic document.
///
/// Precedence is fixed: a curated field always wins over a heuristic one,
/// and heuristics only fill gaps the annotation leaves open. This is the
/// single merge point for the annotated tier, kept separate so the
/// ordering rule is testable in isolation.
pub fn merge_curated(annotation: &Annotation, heuristic: DocumentMetadata) -> DocumentMetadata {
    let mut merged = heuristic;

    if !annotation.tags.is_empty() {
        merged.tags = annotation.tags.clone();
    }
    if !annotation.systems.is_empty() {
        merged.systems = annotation.systems.clone();
    }
    if annotation.category.is_some() {
        merged.category = annotation.category.clone();
    }
    if annotation.author.is_some() {
        merged.author = annotation.author.clone();
    }
    if !annotation.hashes.is_empty() {
        merged.declared_hashes = annotation.hashes.clone();
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ProcessorContext {
        ProcessorContext::new(
            Arc::new(PatternLibrary::with_defaults()),
            Arc::new(AnalyzerRegistry::with_defaults()),
        )
    }

    fn annotation_with_everything() -> Annotation {
        let mut annotation = Annotation::new("curated description", "index_.txt");
        annotation.tags = vec!["remote".to_string()];
        annotation.systems = vec!["linux".to_string()];
        annotation.author = Some("Curator".to_string());
        annotation.category = Some("exploit".to_string());
        annotation
            .hashes
            .insert("MD5".to_string(), "abc".to_string());
        annotation
    }

    #[test]
    fn test_merge_curated_fields_win() {
        let mut heuristic = DocumentMetadata::empty(Tier::Annotated);
        heuristic.author = Some("guessed author".to_string());
        heuristic.category = Some("guessed".to_string());
        heuristic.tags = vec!["heuristic-tag".to_string()];

        let merged = merge_curated(&annotation_with_everything(), heuristic);
        assert_eq!(merged.author.as_deref(), Some("Curator"));
        assert_eq!(merged.category.as_deref(), Some("exploit"));
        assert_eq!(merged.tags, vec!["remote"]);
        assert_eq!(merged.systems, vec!["linux"]);
        assert_eq!(merged.declared_hashes.get("MD5").map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_merge_heuristics_fill_gaps() {
        let mut annotation = Annotation::new("sparse", "index_.txt");
        annotation.tags = Vec::new();
        let mut heuristic = DocumentMetadata::empty(Tier::Annotated);
        heuristic.author = Some("Heuristic Author".to_string());
        heuristic.tags = vec!["kept".to_string()];

        let merged = merge_curated(&annotation, heuristic);
        assert_eq!(merged.author.as_deref(), Some("Heuristic Author"));
        assert_eq!(merged.tags, vec!["kept"]);
    }

    #[test]
    fn test_heuristic_metadata_wires_all_extractors() {
        let ctx = context();
        let metadata = heuristic_metadata(
            &ctx,
            Tier::Generic,
            "WordPress 5.5 with PHP 5.5: unauthenticated remote code execution, CVE-2019-6977",
            "advisory.txt",
        );

        assert!(metadata
            .components
            .iter()
            .any(|c| c.kind == ComponentKind::Cms && c.name == "wordpress"));
        assert!(metadata.severity.is_some());
        let relations = metadata.relations.expect("wordpress is in the table");
        assert!(relations
            .incompatible
            .iter()
            .any(|r| r.constraint == "php < 5.6" && r.verified));
        assert_eq!(metadata.cve_ids, vec!["CVE-2019-6977"]);
        assert_eq!(metadata.processing_tier, Tier::Generic);
    }

    #[test]
    fn test_failed_result_shape() {
        let result = ProcessingResult::failed(Tier::Generic, Stage::Read, "boom");
        assert!(result.content.is_empty());
        assert!(result.metadata.components.is_empty());
        assert!(result.has_fatal_errors());
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].stage, Stage::Read);
    }

    #[test]
    fn test_result_serializes_to_json() {
        let result = ProcessingResult::failed(Tier::SourceCode, Stage::Read, "io");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"source_code\""));
        let back: ProcessingResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
