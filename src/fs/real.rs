use super::FileSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Reads from the real file system via tokio.
#[derive(Debug, Default, Clone)]
pub struct RealFileSource;

impl RealFileSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileSource for RealFileSource {
    async fn read(&self, path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut buf = Vec::new();
        file.take(max_bytes as u64)
            .read_to_end(&mut buf)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_read_existing_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"corpus bytes").unwrap();

        let bytes = RealFileSource::new()
            .read(file.path(), 1024)
            .await
            .unwrap();
        assert_eq!(bytes, b"corpus bytes");
    }

    #[tokio::test]
    async fn test_read_truncates_at_max_bytes() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0x41u8; 100]).unwrap();

        let bytes = RealFileSource::new().read(file.path(), 10).await.unwrap();
        assert_eq!(bytes.len(), 10);
    }

    #[tokio::test]
    async fn test_read_missing_file_is_error() {
        let result = RealFileSource::new()
            .read(Path::new("/nonexistent/path/file.bin"), 1024)
            .await;
        assert!(result.is_err());
    }
}
