//! Whole-state JSON snapshot on disk.
//!
//! Writes go to a sibling temp file that is then renamed over the target, so a
//! crash mid-write never leaves a truncated snapshot behind.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::session::InterviewStore;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone, Debug)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted store. Missing or unreadable snapshots yield an empty store.
    #[instrument(level = "info", skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> InterviewStore {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(target: "interview_backend", "No snapshot found; starting empty");
                return InterviewStore::new();
            }
            Err(e) => {
                error!(target: "interview_backend", error = %e, "Failed to read snapshot; starting empty");
                return InterviewStore::new();
            }
        };

        match serde_json::from_str::<InterviewStore>(&raw) {
            Ok(store) => {
                info!(target: "interview_backend", candidates = store.candidates().len(), "Snapshot loaded");
                store
            }
            Err(e) => {
                warn!(target: "interview_backend", error = %e, "Corrupt snapshot ignored; starting empty");
                InterviewStore::new()
            }
        }
    }

    #[instrument(level = "debug", skip(self, store), fields(path = %self.path.display()))]
    pub async fn save(&self, store: &InterviewStore) -> Result<(), SnapshotError> {
        let json = serde_json::to_vec_pretty(store)?;
        let io_err = |source: std::io::Error| SnapshotError::Io { path: self.path.clone(), source };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;

        debug!(target: "interview_backend", bytes = json.len(), "Snapshot written");
        Ok(())
    }
}
