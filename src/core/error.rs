//! Error types shared by the store, the API client and the wizard.

use std::path::PathBuf;

use super::validation::ValidationError;

/// Result type for wizard operations.
pub type WizardResult<T> = Result<T, WizardError>;

/// Everything that can go wrong while driving the wizard.
///
/// None of these are fatal; the user can always retry.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Could not reach the backend: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("File processing failed: {0}")]
    Processing(String),

    #[error("Task generation failed: {0}")]
    Generation(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Another request is still in progress")]
    Busy,
}

impl WizardError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Reading or writing the saved wizard state failed.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Saved state is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Saved state has version {found}, expected {expected}")]
    IncompatibleVersion { found: u32, expected: u32 },
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
