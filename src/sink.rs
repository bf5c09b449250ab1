//! Persistence sink boundary
//!
//! The pipeline emits `(identity, result)` pairs; durable storage is an
//! external collaborator with its own transactional guarantees. The
//! bundled JSONL sink is enough for dataset assembly and for piping into a
//! loader.

use crate::processors::ProcessingResult;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// Stable identity for one processed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordIdentity {
    pub path: String,
    pub filename: String,
    /// SHA-256 over the extracted content, hex-encoded
    pub content_digest: String,
}

impl RecordIdentity {
    pub fn new(path: &Path, content: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let digest = hex::encode(hasher.finalize());

        Self {
            path: path.display().to_string(),
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            content_digest: digest,
        }
    }
}

/// Accepts processed records for persistence.
#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn accept(&self, identity: &RecordIdentity, result: &ProcessingResult) -> Result<()>;
}

#[derive(Serialize)]
struct JsonlRecord<'a> {
    file: &'a RecordIdentity,
    result: &'a ProcessingResult,
}

/// Writes one JSON object per line.
pub struct JsonlSink {
    writer: Mutex<BufWriter<std::fs::File>>,
}

impl JsonlSink {
    pub fn create(path: &Path) -> Result<Self> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .expect("sink lock poisoned")
            .flush()
            .context("Failed to flush record sink")
    }
}

#[async_trait]
impl RecordSink for JsonlSink {
    async fn accept(&self, identity: &RecordIdentity, result: &ProcessingResult) -> Result<()> {
        let line = serde_json::to_string(&JsonlRecord {
            file: identity,
            result,
        })
        .context("Failed to serialize record")?;

        let mut writer = self.writer.lock().expect("sink lock poisoned");
        writeln!(writer, "{}", line).context("Failed to write record")?;
        Ok(())
    }
}
