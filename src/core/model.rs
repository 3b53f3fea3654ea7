//! Wizard data model.
//!
//! `UserInput` is the accumulated wizard input, `ProcessedTask` a single
//! entry of a generated plan. `UploadFile` is the transient form of a file
//! picked by the user; only its `ImageMetadata` projection is ever stored.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{WizardError, WizardResult};
use super::validation::{validate_file_size, ValidationError};

/// Everything the user has entered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserInput {
    /// Free-form project description
    pub description: String,
    /// Text extracted from the requirements document
    pub requirements: Requirements,
    /// Inspiration images and the text extracted from them
    pub inspiration: Inspiration,
    /// Third-party services the user opted into
    pub integrations: Vec<String>,
}

/// Requirements extracted from an uploaded document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Requirements {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

/// Inspiration images (metadata only) and their processed description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Inspiration {
    pub images: Vec<ImageMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_text: Option<String>,
}

/// Durable projection of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    /// File name as picked by the user
    pub name: String,
    /// MIME type
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification time (milliseconds since the Unix epoch)
    pub last_modified: i64,
}

impl From<&UploadFile> for ImageMetadata {
    fn from(file: &UploadFile) -> Self {
        Self {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.size,
            last_modified: file.last_modified,
        }
    }
}

/// A file selected for upload, with its content loaded.
///
/// Never serialized: the bytes only travel to the extraction endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub last_modified: i64,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Build an upload from in-memory content.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            mime_type: mime_type_for(&name).to_string(),
            size: bytes.len() as u64,
            last_modified: 0,
            name,
            bytes,
        }
    }

    /// Read a file from disk.
    ///
    /// Files over `max_size` bytes are rejected from their metadata, before
    /// any content is loaded.
    pub fn from_path(path: &Path, max_size: u64) -> WizardResult<Self> {
        let read_error = |source| WizardError::Read { path: path.to_path_buf(), source };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let file = File::open(path).map_err(read_error)?;
        let metadata = file.metadata().map_err(read_error)?;
        let too_large = |size| ValidationError::TooLarge { name: name.clone(), size, max: max_size };
        if !validate_file_size(metadata.len(), max_size) {
            return Err(too_large(metadata.len()).into());
        }

        // The file may grow between the size check and the read
        let mut bytes = Vec::with_capacity(metadata.len() as usize);
        file.take(max_size.saturating_add(1)).read_to_end(&mut bytes).map_err(read_error)?;
        if !validate_file_size(bytes.len() as u64, max_size) {
            return Err(too_large(bytes.len() as u64).into());
        }

        let last_modified =
            metadata.modified().map_or(0, |t| DateTime::<Utc>::from(t).timestamp_millis());
        Ok(Self::new(name, bytes).with_last_modified(last_modified))
    }

    pub fn with_last_modified(mut self, last_modified: i64) -> Self {
        self.last_modified = last_modified;
        self
    }
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.size)
            .field("last_modified", &self.last_modified)
            .finish_non_exhaustive()
    }
}

/// Guess a MIME type from a file name's extension.
pub fn mime_type_for(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Progress of a generated task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Column heading on the task board.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "TO DO",
            Self::InProgress => "IN PROGRESS",
            Self::Completed => "DONE",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// A task produced by the task-generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub order: i64,
}

/// Sort tasks by `order`, keeping backend order for ties.
pub fn sort_tasks(tasks: &mut [ProcessedTask]) {
    tasks.sort_by_key(|t| t.order);
}
