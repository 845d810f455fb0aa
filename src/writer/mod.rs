//! # Log Writer Module
//!
//! The sink end of the pipeline: takes formatted record bytes and a
//! destination name and performs the write.
//!
//! A failed write surfaces as [`GeigerLogError::WriteFailed`] with no
//! internal retry; retry policy belongs to the surrounding scheduler. The
//! write is all-or-nothing from the caller's perspective: a truncated record
//! is never reported as success. Destination naming (rotating file names) is
//! owned by the surrounding system, not the sink.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{GeigerLogError, Result};

/// Destination for formatted log records.
#[async_trait]
pub trait LogSink: Send {
    /// Append one record to the named destination.
    ///
    /// # Errors
    ///
    /// Returns [`GeigerLogError::WriteFailed`] if the sink rejects the
    /// record (storage full, device absent, transport error)
    async fn write(&mut self, destination: &str, record: &[u8]) -> Result<()>;
}

/// File-backed sink appending records under a base directory.
#[derive(Debug)]
pub struct FileLogSink {
    base_dir: PathBuf,
}

impl FileLogSink {
    /// Create a sink rooted at `base_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }
}

#[async_trait]
impl LogSink for FileLogSink {
    async fn write(&mut self, destination: &str, record: &[u8]) -> Result<()> {
        let path = self.base_dir.join(destination);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                GeigerLogError::WriteFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        file.write_all(record).await.map_err(|e| {
            GeigerLogError::WriteFailed(format!("append to {} failed: {}", path.display(), e))
        })?;

        file.flush().await.map_err(|e| {
            GeigerLogError::WriteFailed(format!("flush of {} failed: {}", path.display(), e))
        })?;

        debug!("Appended {} bytes to {}", record.len(), path.display());
        Ok(())
    }
}
