pub mod queries;

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use lodge_types::error::WorkspaceError;
use lodge_types::models::{Conversation, User};

/// The whole workspace, loaded and saved as one unit.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WorkspaceData {
    pub users: Vec<User>,
    pub conversations: Vec<Conversation>,
}

/// Handle to the workspace state. The mutex is the single serialization
/// point: every operation is one `with_data` / `with_data_mut` call, and
/// mutations rewrite the whole backing file before returning.
pub struct Store {
    path: Option<PathBuf>,
    data: Mutex<WorkspaceData>,
}

impl Store {
    /// Loads the store from `path`, or starts empty if the file does not
    /// exist yet. The file is created on the first mutation.
    pub fn open(path: &Path) -> Result<Self> {
        let data = if path.exists() {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str(&raw)?
        } else {
            WorkspaceData::default()
        };

        info!("Store opened at {}", path.display());
        Ok(Self {
            path: Some(path.to_path_buf()),
            data: Mutex::new(data),
        })
    }

    /// An empty store with no backing file. Used by tests.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: Mutex::new(WorkspaceData::default()),
        }
    }

    pub fn with_data<F, T>(&self, f: F) -> Result<T, WorkspaceError>
    where
        F: FnOnce(&WorkspaceData) -> Result<T, WorkspaceError>,
    {
        let data = self
            .data
            .lock()
            .map_err(|e| WorkspaceError::Storage(format!("store lock poisoned: {e}")))?;
        f(&data)
    }

    /// Runs `f` against the store and, if it succeeds, rewrites the backing
    /// file with the mutated state.
    pub fn with_data_mut<F, T>(&self, f: F) -> Result<T, WorkspaceError>
    where
        F: FnOnce(&mut WorkspaceData) -> Result<T, WorkspaceError>,
    {
        let mut data = self
            .data
            .lock()
            .map_err(|e| WorkspaceError::Storage(format!("store lock poisoned: {e}")))?;
        let out = f(&mut data)?;
        self.persist(&data)?;
        Ok(out)
    }

    /// Reinitializes to the empty store `{users: [], conversations: []}`.
    pub fn reset(&self) -> Result<(), WorkspaceError> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| WorkspaceError::Storage(format!("store lock poisoned: {e}")))?;
        *data = WorkspaceData::default();
        self.persist(&data)
    }

    fn persist(&self, data: &WorkspaceData) -> Result<(), WorkspaceError> {
        if let Some(path) = &self.path {
            let raw = serde_json::to_string(data)?;
            std::fs::write(path, raw)?;
        }
        Ok(())
    }
}
