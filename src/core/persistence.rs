//! Durable storage for the wizard state.
//!
//! The state is saved as one versioned JSON document, written to a
//! temporary file and renamed into place so a crash never leaves a
//! half-written file behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::PersistenceError;
use super::model::{ProcessedTask, UserInput};

/// Current layout version of the saved state.
pub const SCHEMA_VERSION: u32 = 1;

/// In-memory state owned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub user_input: UserInput,
    pub tasks: Vec<ProcessedTask>,
}

/// The on-disk form of [`StoreState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// Layout version for future migrations
    pub version: u32,
    pub user_input: UserInput,
    #[serde(default)]
    pub tasks: Vec<ProcessedTask>,
}

impl From<&StoreState> for PersistedState {
    fn from(state: &StoreState) -> Self {
        Self {
            version: SCHEMA_VERSION,
            user_input: state.user_input.clone(),
            tasks: state.tasks.clone(),
        }
    }
}

impl From<PersistedState> for StoreState {
    fn from(persisted: PersistedState) -> Self {
        Self { user_input: persisted.user_input, tasks: persisted.tasks }
    }
}

/// A JSON file holding the saved state.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved state, `Ok(None)` if nothing has been saved yet.
    pub fn load(&self) -> Result<Option<StoreState>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content =
            fs::read_to_string(&self.path).map_err(|e| PersistenceError::io(&self.path, e))?;

        // Check the version before committing to the full layout
        let raw: serde_json::Value = serde_json::from_str(&content)?;
        let found = raw.get("version").and_then(serde_json::Value::as_u64).unwrap_or(0) as u32;
        if found != SCHEMA_VERSION {
            return Err(PersistenceError::IncompatibleVersion { found, expected: SCHEMA_VERSION });
        }

        let persisted: PersistedState = serde_json::from_value(raw)?;
        Ok(Some(persisted.into()))
    }

    /// Load the saved state, falling back to the default on any failure.
    pub fn load_or_default(&self) -> StoreState {
        match self.load() {
            Ok(Some(state)) => {
                tracing::debug!("Restored wizard state from {}", self.path.display());
                state
            }
            Ok(None) => StoreState::default(),
            Err(e) => {
                tracing::warn!("Ignoring saved state at {}: {}", self.path.display(), e);
                StoreState::default()
            }
        }
    }

    /// Write `state` atomically.
    pub fn save(&self, state: &StoreState) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
        }

        let content = serde_json::to_string_pretty(&PersistedState::from(state))?;
        let temp = self.path.with_extension("tmp");

        let mut f = fs::File::create(&temp).map_err(|e| PersistenceError::io(&temp, e))?;
        f.write_all(content.as_bytes()).map_err(|e| PersistenceError::io(&temp, e))?;
        f.sync_all().map_err(|e| PersistenceError::io(&temp, e))?;
        fs::rename(&temp, &self.path).map_err(|e| PersistenceError::io(&self.path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ImageMetadata, TaskStatus};
    use tempfile::tempdir;

    fn sample_state() -> StoreState {
        let mut state = StoreState::default();
        state.user_input.description = "Voice assistant".to_string();
        state.user_input.inspiration.images.push(ImageMetadata {
            name: "hero.png".to_string(),
            mime_type: "image/png".to_string(),
            size: 42,
            last_modified: 7,
        });
        state.tasks.push(ProcessedTask {
            id: "OMN-1".to_string(),
            title: "Landing page".to_string(),
            description: String::new(),
            status: TaskStatus::Pending,
            order: 1,
        });
        state
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempdir().unwrap();
        let file = StateFile::new(dir.path().join("state.json"));
        assert!(file.load().unwrap().is_none());
        assert_eq!(file.load_or_default(), StoreState::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let file = StateFile::new(dir.path().join("nested").join("state.json"));
        let state = sample_state();

        file.save(&state).unwrap();
        assert_eq!(file.load().unwrap(), Some(state));
        assert!(!file.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_saved_layout() {
        let dir = tempdir().unwrap();
        let file = StateFile::new(dir.path().join("state.json"));
        file.save(&sample_state()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(raw["version"], SCHEMA_VERSION);
        assert_eq!(raw["userInput"]["description"], "Voice assistant");
        assert_eq!(raw["userInput"]["inspiration"]["images"][0]["type"], "image/png");
        assert_eq!(raw["tasks"][0]["id"], "OMN-1");
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let file = StateFile::new(path);
        assert!(matches!(file.load(), Err(PersistenceError::Json(_))));
        assert_eq!(file.load_or_default(), StoreState::default());
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"version": 99, "userInput": {}, "tasks": []}"#).unwrap();

        let file = StateFile::new(path);
        assert!(matches!(
            file.load(),
            Err(PersistenceError::IncompatibleVersion { found: 99, expected: SCHEMA_VERSION })
        ));
        assert_eq!(file.load_or_default(), StoreState::default());
    }

    #[test]
    fn test_incompatible_shape_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, r#"{"version": 1, "userInput": {"description": 5}}"#).unwrap();

        assert_eq!(StateFile::new(path).load_or_default(), StoreState::default());
    }
}
