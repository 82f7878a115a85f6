//! Request-scoped temporary video files.

use std::path::Path;
use tempfile::{Builder, NamedTempFile};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::PipelineResult;

/// Extension used when the upload has none.
pub const DEFAULT_VIDEO_EXTENSION: &str = "mp4";

/// An uploaded video on disk, deleted when dropped.
#[derive(Debug)]
pub struct TempVideoFile {
    file: NamedTempFile,
    writer: tokio::fs::File,
    bytes_written: u64,
}

impl TempVideoFile {
    /// Create an empty temp file in `work_dir`, keeping the extension of
    /// `original_name` when it has a plausible one.
    pub fn create(work_dir: &Path, original_name: Option<&str>) -> PipelineResult<Self> {
        std::fs::create_dir_all(work_dir)?;

        let suffix = format!(".{}", extension_for(original_name));
        let file = Builder::new()
            .prefix("tsight-upload-")
            .suffix(&suffix)
            .tempfile_in(work_dir)?;

        let writer = tokio::fs::File::from_std(file.as_file().try_clone()?);

        debug!(path = %file.path().display(), "Created temp video file");
        Ok(Self {
            file,
            writer,
            bytes_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Append a chunk of the upload.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> PipelineResult<()> {
        self.writer.write_all(chunk).await?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    /// Flush buffered writes. Call before handing the path to a decoder.
    pub async fn finish(&mut self) -> PipelineResult<()> {
        self.writer.flush().await?;
        Ok(())
    }
}

impl Drop for TempVideoFile {
    fn drop(&mut self) {
        debug!(path = %self.file.path().display(), "Removing temp video file");
    }
}

fn extension_for(original_name: Option<&str>) -> String {
    original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_VIDEO_EXTENSION.to_string())
}
