use super::snapshot;
use crate::domain::Record;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Error, Debug)]
pub enum SpoolFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The on-disk snapshot at an explicitly configured path.
///
/// The path is injected rather than compiled in so multiple forwarder
/// instances or test runs never collide on the same file.
#[derive(Debug, Clone)]
pub struct SpoolFile {
    path: PathBuf,
}

impl SpoolFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load-then-delete the snapshot left by a previous run, if any.
    ///
    /// Called only before the shipper starts, so the returned records can be
    /// restored into the spool without contention. A malformed file degrades
    /// to fewer recovered records; a deletion failure is logged and tolerated,
    /// at worst re-delivering the same records on the next run, which stays
    /// within the at-least-once contract.
    pub async fn load(&self) -> Result<Vec<Record>, SpoolFileError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let bytes = fs::read(&self.path).await?;
        let records = snapshot::decode(&bytes);
        tracing::info!(
            path = %self.path.display(),
            records = records.len(),
            "recovered spool snapshot from disk"
        );

        if let Err(e) = fs::remove_file(&self.path).await {
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                "couldn't remove spool snapshot after load"
            );
        }
        Ok(records)
    }

    /// Persist undelivered records at shutdown.
    ///
    /// Called only after the shipper has fully stopped, so no lock is needed
    /// over the queue contents handed in. Nothing is written for an empty
    /// queue; a leftover file from a previous run is removed instead so a
    /// fully drained shutdown leaves no stale snapshot behind.
    pub async fn save(&self, records: &[Record]) -> Result<(), SpoolFileError> {
        if records.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path).await?;
            }
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let encoded = snapshot::encode(records);
        let mut file = fs::File::create(&self.path).await?;
        file.write_all(&encoded).await?;
        file.sync_all().await?;

        tracing::info!(
            path = %self.path.display(),
            records = records.len(),
            bytes = encoded.len(),
            "persisted undelivered records to spool snapshot"
        );
        Ok(())
    }
}
