//! corpusmill - classification and extraction pipeline for security file corpora
//!
//! This library ingests large, heterogeneous file corpora (exploit archives,
//! advisories, source code, binary artifacts) and produces structured
//! records suitable for downstream search, classification, and dataset
//! assembly.
//!
//! # Core Concepts
//!
//! - **Tiers**: every file is assigned exactly one processing strategy -
//!   `Annotated` (a curated index entry exists), `SourceCode` (a known
//!   programming language), or `Generic` (everything else). Curated
//!   annotations always dominate automatic detection.
//! - **Extraction**: pattern-driven detection of software components
//!   (CMS, plugins, themes, languages, servers), severity classification
//!   over a four-band factor table, and dependency resolution against a
//!   static compatibility table.
//! - **Batch orchestration**: a bounded worker pool drains a
//!   priority-ordered queue; per-file failures become error records on the
//!   file's own result and never abort the batch. Output order always
//!   matches input order.
//!
//! # Example Usage
//!
//! ```ignore
//! use corpusmill::{
//!     BatchOrchestrator, CorpusmillConfig, FileDescriptor,
//!     InMemoryAnnotationIndex, RealFileSource,
//! };
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! async fn run() -> anyhow::Result<()> {
//!     let config = CorpusmillConfig::default();
//!     let orchestrator = BatchOrchestrator::new(
//!         &config,
//!         Arc::new(InMemoryAnnotationIndex::new()),
//!         Arc::new(RealFileSource::new()),
//!     )?;
//!
//!     let descriptors = vec![FileDescriptor::new("corpus/exploits/sploit.c")];
//!     let results = orchestrator
//!         .process_batch(descriptors, &CancellationToken::new())
//!         .await?;
//!
//!     println!("processed {} files", results.len());
//!     Ok(())
//! }
//! ```

// Public modules
pub mod annotations;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod coverage;
pub mod extractors;
pub mod fs;
pub mod languages;
pub mod patterns;
pub mod pipeline;
pub mod processors;
pub mod sink;
pub mod stats;
pub mod util;

// Re-export key types for convenient access
pub use annotations::{Annotation, AnnotationIndex, IndexParser, InMemoryAnnotationIndex};
pub use classifier::{ContentClassifier, FileDescriptor, Tier};
pub use config::{ConfigError, CorpusmillConfig};
pub use extractors::{
    ComponentKind, ExtractedComponent, RelationResolver, RelationSet, SeverityAssessment,
    SeverityClassifier, SeverityLevel, SoftwareExtractor,
};
pub use fs::{FileSource, MockFileSource, RealFileSource};
pub use patterns::PatternLibrary;
pub use pipeline::{BatchOrchestrator, PipelineError};
pub use processors::{DocumentMetadata, ErrorRecord, ProcessingResult, ProcessorContext, Stage};
pub use sink::{JsonlSink, RecordIdentity, RecordSink};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_corpusmill() {
        assert_eq!(NAME, "corpusmill");
    }
}
