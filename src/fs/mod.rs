//! File byte-source abstraction for testable I/O

mod mock;
mod real;

pub use mock::MockFileSource;
pub use real::RealFileSource;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Reads raw bytes for the pipeline.
///
/// `max_bytes` bounds memory under large corpora; implementations return at
/// most that many bytes. A missing or unreadable file is an `Err`, which the
/// orchestrator surfaces as a non-recoverable error record rather than a
/// batch failure.
#[async_trait]
pub trait FileSource: Send + Sync {
    async fn read(&self, path: &Path, max_bytes: usize) -> Result<Vec<u8>>;
}
