//! Bounded-concurrency batch orchestration
//!
//! Items drain through a priority-ordered queue into a bounded fan-out:
//! annotated files first, then source code, then everything else, ties
//! preserving input order. The output sequence always matches the input
//! order regardless of completion order; completed results land in a
//! write-once slot per input index. Per-item faults (I/O errors, timeouts,
//! worker panics) become synthesized failed results and never abort the
//! batch.

use super::progress::{ProgressEvent, ProgressHandler};
use super::PipelineError;
use crate::annotations::AnnotationIndex;
use crate::classifier::{ContentClassifier, FileDescriptor, Tier};
use crate::config::CorpusmillConfig;
use crate::fs::FileSource;
use crate::languages::AnalyzerRegistry;
use crate::patterns::PatternLibrary;
use crate::processors::{self, ProcessingResult, ProcessorContext, Stage};
use futures_util::stream::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct BatchOrchestrator {
    classifier: ContentClassifier,
    ctx: Arc<ProcessorContext>,
    annotations: Arc<dyn AnnotationIndex>,
    source: Arc<dyn FileSource>,
    concurrency_limit: usize,
    per_file_timeout: Duration,
    max_read_bytes: usize,
    progress: Option<Arc<dyn ProgressHandler>>,
}

impl BatchOrchestrator {
    pub fn new(
        config: &CorpusmillConfig,
        annotations: Arc<dyn AnnotationIndex>,
        source: Arc<dyn FileSource>,
    ) -> Result<Self, PipelineError> {
        config.validate()?;

        let patterns = Arc::new(PatternLibrary::with_defaults());
        let mut analyzers = AnalyzerRegistry::with_defaults();
        analyzers.apply_extension_overrides(&config.language_overrides);
        let analyzers = Arc::new(analyzers);

        Ok(Self {
            classifier: ContentClassifier::new(Arc::clone(&analyzers)),
            ctx: Arc::new(ProcessorContext::new(patterns, analyzers)),
            annotations,
            source,
            concurrency_limit: config.concurrency_limit,
            per_file_timeout: config.per_file_timeout(),
            max_read_bytes: config.max_read_bytes,
            progress: None,
        })
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress = Some(handler);
        self
    }

    fn emit(&self, event: &ProgressEvent) {
        if let Some(handler) = &self.progress {
            handler.on_progress(event);
        }
    }

    /// Processes every descriptor, returning exactly one result per input
    /// in input order. Queued items are dropped as failed when `cancel`
    /// fires; items already running finish normally.
    pub async fn process_batch(
        &self,
        descriptors: Vec<FileDescriptor>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProcessingResult>, PipelineError> {
        if descriptors.is_empty() {
            return Ok(Vec::new());
        }

        let total = descriptors.len();
        let start = Instant::now();
        info!(
            total,
            concurrency = self.concurrency_limit,
            "Starting batch processing"
        );
        self.emit(&ProgressEvent::BatchStarted { total });

        let order = schedule_order(&self.classifier, &descriptors);
        let descriptors = Arc::new(descriptors);
        let mut slots: Vec<Option<ProcessingResult>> = (0..total).map(|_| None).collect();
        let mut failed = 0usize;

        let mut completions = futures_util::stream::iter(order)
            .map(|index| {
                let descriptor = descriptors[index].clone();
                let classifier = self.classifier.clone();
                let ctx = Arc::clone(&self.ctx);
                let annotations = Arc::clone(&self.annotations);
                let source = Arc::clone(&self.source);
                let per_file_timeout = self.per_file_timeout;
                let max_read_bytes = self.max_read_bytes;
                let cancel = cancel.clone();

                async move {
                    if cancel.is_cancelled() {
                        let tier = classifier.classify(&descriptor, None);
                        return (
                            index,
                            ProcessingResult::failed(tier, Stage::Schedule, "batch cancelled"),
                        );
                    }

                    // One spawned task per admitted item keeps a panic
                    // contained at the join boundary.
                    let handle = tokio::spawn(process_one(
                        classifier,
                        ctx,
                        annotations,
                        source,
                        per_file_timeout,
                        max_read_bytes,
                        descriptor,
                    ));
                    match handle.await {
                        Ok(result) => (index, result),
                        Err(join_err) => (
                            index,
                            ProcessingResult::failed(
                                Tier::Generic,
                                Stage::Schedule,
                                format!("worker fault: {}", join_err),
                            ),
                        ),
                    }
                }
            })
            .buffer_unordered(self.concurrency_limit);

        while let Some((index, result)) = completions.next().await {
            let fatal = result.has_fatal_errors();
            if fatal {
                failed += 1;
            }
            self.emit(&ProgressEvent::FileCompleted {
                index,
                path: descriptors[index].path.display().to_string(),
                failed: fatal,
            });
            debug!(index, fatal, "Result slot filled");
            slots[index] = Some(result);
        }
        drop(completions);

        let results: Vec<ProcessingResult> = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    warn!(index, "Result slot was never filled");
                    ProcessingResult::failed(
                        Tier::Generic,
                        Stage::Schedule,
                        "result slot was never filled",
                    )
                })
            })
            .collect();

        let duration = start.elapsed();
        info!(
            total,
            failed,
            duration_ms = duration.as_millis() as u64,
            "Batch processing complete"
        );
        self.emit(&ProgressEvent::BatchCompleted {
            total,
            failed,
            duration,
        });

        Ok(results)
    }

    /// Runs the classify -> read -> process sequence for a single file.
    pub async fn process_one(&self, descriptor: FileDescriptor) -> ProcessingResult {
        process_one(
            self.classifier.clone(),
            Arc::clone(&self.ctx),
            Arc::clone(&self.annotations),
            Arc::clone(&self.source),
            self.per_file_timeout,
            self.max_read_bytes,
            descriptor,
        )
        .await
    }
}

/// Priority scheduling order: tier rank first, input order inside a tier.
fn schedule_order(classifier: &ContentClassifier, descriptors: &[FileDescriptor]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..descriptors.len()).collect();
    order.sort_by_key(|&i| (classifier.classify(&descriptors[i], None).priority(), i));
    order
}

async fn process_one(
    classifier: ContentClassifier,
    ctx: Arc<ProcessorContext>,
    annotations: Arc<dyn AnnotationIndex>,
    source: Arc<dyn FileSource>,
    per_file_timeout: Duration,
    max_read_bytes: usize,
    descriptor: FileDescriptor,
) -> ProcessingResult {
    let scheduled_tier = classifier.classify(&descriptor, None);

    let annotation = if descriptor.has_prior_annotation {
        match tokio::time::timeout(per_file_timeout, annotations.lookup(&descriptor.path)).await {
            Ok(found) => found,
            Err(_) => {
                return ProcessingResult::failed(
                    scheduled_tier,
                    Stage::Lookup,
                    format!(
                        "annotation lookup timed out after {}s",
                        per_file_timeout.as_secs()
                    ),
                )
            }
        }
    } else {
        None
    };

    let raw = match tokio::time::timeout(
        per_file_timeout,
        source.read(&descriptor.path, max_read_bytes),
    )
    .await
    {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(err)) => {
            return ProcessingResult::failed(scheduled_tier, Stage::Read, format!("{:#}", err))
        }
        Err(_) => {
            return ProcessingResult::failed(
                scheduled_tier,
                Stage::Read,
                format!("read timed out after {}s", per_file_timeout.as_secs()),
            )
        }
    };

    // Head bytes can upgrade Generic to SourceCode via the shebang check.
    let tier = classifier.classify(&descriptor, Some(&raw));
    processors::process(tier, &ctx, &descriptor, annotation.as_ref(), &raw)
}
