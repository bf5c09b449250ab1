use super::FileSource;
use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// In-memory file source for tests.
///
/// Paths can be registered with content, or marked to fail so I/O fault
/// handling can be exercised without touching the disk.
#[derive(Debug, Default)]
pub struct MockFileSource {
    files: Mutex<HashMap<PathBuf, Vec<u8>>>,
    failing: Mutex<HashSet<PathBuf>>,
}

impl MockFileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files
            .lock()
            .expect("mock lock poisoned")
            .insert(path.into(), content.into());
    }

    /// Marks a path so every read of it fails with an I/O error.
    pub fn fail_on(&self, path: impl Into<PathBuf>) {
        self.failing
            .lock()
            .expect("mock lock poisoned")
            .insert(path.into());
    }
}

#[async_trait]
impl FileSource for MockFileSource {
    async fn read(&self, path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
        if self
            .failing
            .lock()
            .expect("mock lock poisoned")
            .contains(path)
        {
            bail!("simulated I/O fault for {}", path.display());
        }

        let files = self.files.lock().expect("mock lock poisoned");
        match files.get(path) {
            Some(content) => Ok(content[..content.len().min(max_bytes)].to_vec()),
            None => bail!("no such file: {}", path.display()),
        }
    }
}
