use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::models::SiteState;

/// Errors for index-addressed record lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no {kind} at index {index} (log has {len} entries)")]
    IndexOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },
}

/// Owner of the persisted [`SiteState`].
///
/// The whole document is held in memory and rewritten after every mutation.
/// Callers that share a store across tasks must serialize access themselves.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    state: SiteState,
}

impl StateStore {
    /// Load the state file named by `config`.
    ///
    /// A missing file yields an empty state; the file is created on the first
    /// mutation.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let path = config.state_path.clone();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read state file at {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("failed to parse state file at {}", path.display()))?
        } else {
            debug!(path = %path.display(), "state file absent, starting empty");
            SiteState::default()
        };

        info!(
            path = %path.display(),
            epos = state.epo_log.len(),
            notes = state.notes.len(),
            "state loaded"
        );
        Ok(Self { path, state })
    }

    /// Build a store around an existing state without touching the disk.
    pub fn with_state(path: impl Into<PathBuf>, state: SiteState) -> Self {
        Self {
            path: path.into(),
            state,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &SiteState {
        &self.state
    }

    /// Apply `f` to the state and rewrite the file.
    ///
    /// The in-memory state only changes if both `f` and the write succeed;
    /// on any error it is restored to what it was before the call.
    pub fn mutate<T>(&mut self, f: impl FnOnce(&mut SiteState) -> Result<T>) -> Result<T> {
        let snapshot = self.state.clone();
        let result = f(&mut self.state).and_then(|out| self.save().map(|()| out));
        if result.is_err() {
            self.state = snapshot;
        }
        result
    }

    /// Serialize the state as pretty JSON, creating parent dirs as needed.
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create state directory {}", dir.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(&self.state).context("failed to serialize state")?;
        std::fs::write(&self.path, contents)
            .with_context(|| format!("failed to write state file at {}", self.path.display()))?;

        debug!(path = %self.path.display(), "state written");
        Ok(())
    }
}
