//! Batch pipeline: bounded fan-out over the classify/process sequence

pub mod orchestrator;
pub mod progress;

pub use orchestrator::BatchOrchestrator;
pub use progress::{LoggingHandler, ProgressEvent, ProgressHandler};

use thiserror::Error;

/// The only failure the batch call itself can propagate; everything else
/// is localized to a single file's result.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] crate::config::ConfigError),
}
