//! Persistence backends for session state

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::{SessionError, SessionState};

/// Key-value persistence for [`SessionState`]
///
/// The host application owns where state lives; the client only loads it once
/// and writes it back whenever the credential or notice timestamp changes.
pub trait StateStore: Send + Sync {
    /// Load persisted state, or the default state if nothing was saved yet
    fn load(&self) -> Result<SessionState, SessionError>;

    /// Persist state, replacing whatever was stored before
    fn save(&self, state: &SessionState) -> Result<(), SessionError>;
}

/// State kept only for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<SessionState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a given state
    pub fn with_state(state: SessionState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<SessionState, SessionError> {
        Ok(self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state.clone();
        Ok(())
    }
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<SessionState, SessionError> {
        if !self.path.exists() {
            return Ok(SessionState::default());
        }

        let file = File::open(&self.path)?;
        let state = serde_json::from_reader(BufReader::new(file))?;

        tracing::debug!(path = %self.path.display(), "Session state loaded");
        Ok(state)
    }

    fn save(&self, state: &SessionState) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write to temp file first, then rename
        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let file = File::create(&temp_path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), state)?;
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), "Session state saved");
        Ok(())
    }
}
