//! JSON snapshot file for the tree store.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::infrastructure::error::{StoreError, StoreResult};
use crate::infrastructure::store::state::StoreState;

/// Snapshot location on disk.
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot; a missing file yields a fresh state.
    pub fn load(&self) -> StoreResult<StoreState> {
        if !self.path.exists() {
            debug!("load: no snapshot at {}, starting empty", self.path.display());
            return Ok(StoreState::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| StoreError::io(format!("read {}", self.path.display()), e))?;
        let mut state: StoreState =
            serde_json::from_str(&content).map_err(|e| StoreError::Serde {
                path: self.path.clone(),
                source: e,
            })?;
        state.reindex()?;
        Ok(state)
    }

    /// Write the snapshot to a temp file in the same directory, then rename
    /// it over the target.
    pub fn save(&self, state: &StoreState) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .map_err(|e| StoreError::io(format!("create {}", dir.display()), e))?;

        let json = serde_json::to_string_pretty(state).map_err(|e| StoreError::Serde {
            path: self.path.clone(),
            source: e,
        })?;

        let mut tmp = NamedTempFile::new_in(&dir)
            .map_err(|e| StoreError::io(format!("temp file in {}", dir.display()), e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| StoreError::io("write snapshot", e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(format!("replace {}", self.path.display()), e.error))?;
        debug!("save: wrote {}", self.path.display());
        Ok(())
    }
}
