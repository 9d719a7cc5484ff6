//! File-backed audit sink appending one text block per slice.

use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::error;

use crate::core::{AuditSink, SliceRecord};

/// Appends [`SliceRecord`] text blocks to a file.
///
/// The file is opened per record so external readers always see complete
/// blocks. Failures are logged and the record is dropped.
#[derive(Debug, Clone)]
pub struct FileAuditSink {
    path: PathBuf,
}

impl FileAuditSink {
    /// Sink writing to `path`; parent directories are created on first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Output file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record: &SliceRecord) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{record}")?;
        writeln!(file)
    }
}

impl AuditSink for FileAuditSink {
    fn record(&mut self, record: SliceRecord) {
        if let Err(e) = self.append(&record) {
            error!(
                path = %self.path.display(),
                pid = record.pid,
                error = %e,
                "audit write failed, record dropped"
            );
        }
    }
}
