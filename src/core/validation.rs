//! Upload validation.
//!
//! Files are gated by an extension allow-list per upload purpose and a
//! maximum byte size before anything reaches the network.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::model::UploadFile;

/// Default maximum upload size (5 MiB).
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Document formats accepted by the requirements step.
pub static DOCUMENT_EXTENSIONS: Lazy<Vec<String>> =
    Lazy::new(|| [".pdf", ".doc", ".docx", ".txt"].iter().map(|s| (*s).to_string()).collect());

/// Image formats accepted by the inspiration step.
pub static IMAGE_EXTENSIONS: Lazy<Vec<String>> =
    Lazy::new(|| [".jpg", ".jpeg", ".png", ".gif"].iter().map(|s| (*s).to_string()).collect());

/// Why an upload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("'{name}' has no file extension (allowed: {})", .allowed.join(", "))]
    MissingExtension { name: String, allowed: Vec<String> },

    #[error("'{name}' has unsupported type {extension} (allowed: {})", .allowed.join(", "))]
    DisallowedExtension { name: String, extension: String, allowed: Vec<String> },

    #[error("'{name}' is {size} bytes, larger than the {max} byte limit")]
    TooLarge { name: String, size: u64, max: u64 },

    #[error("No files were selected")]
    NoFiles,

    #[error("Files cannot be uploaded on the {0} step")]
    NotAnUploadStep(String),

    #[error("There is no step {0}")]
    UnknownStep(usize),
}

/// Allowed extensions and size limit for one upload purpose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub allowed_extensions: Vec<String>,
    pub max_file_size: u64,
}

impl UploadPolicy {
    pub fn new(allowed_extensions: Vec<String>, max_file_size: u64) -> Self {
        Self { allowed_extensions, max_file_size }
    }

    /// Policy for requirements documents.
    pub fn documents() -> Self {
        Self::new(DOCUMENT_EXTENSIONS.clone(), MAX_FILE_SIZE)
    }

    /// Policy for inspiration images.
    pub fn images() -> Self {
        Self::new(IMAGE_EXTENSIONS.clone(), MAX_FILE_SIZE)
    }

    /// Check one file against this policy.
    pub fn validate(&self, file: &UploadFile) -> Result<(), ValidationError> {
        validate_upload(file, self)
    }

    /// Check every file, stopping at the first rejection.
    pub fn validate_all(&self, files: &[UploadFile]) -> Result<(), ValidationError> {
        if files.is_empty() {
            return Err(ValidationError::NoFiles);
        }
        files.iter().try_for_each(|f| self.validate(f))
    }
}

/// Lower-cased extension of `name` with a leading dot.
///
/// Returns `None` when the name has no `.` or ends with one.
pub fn file_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_lowercase()))
}

/// Whether `name`'s extension is in `allowed` (case-insensitive).
///
/// A name without an extension is never allowed.
pub fn is_allowed<S: AsRef<str>>(name: &str, allowed: &[S]) -> bool {
    file_extension(name)
        .is_some_and(|ext| allowed.iter().any(|a| a.as_ref().to_lowercase() == ext))
}

/// Whether a file of `size` bytes fits under `max_size`.
pub fn validate_file_size(size: u64, max_size: u64) -> bool {
    size <= max_size
}

/// Apply both the extension and the size check.
pub fn validate_upload(file: &UploadFile, policy: &UploadPolicy) -> Result<(), ValidationError> {
    let Some(extension) = file_extension(&file.name) else {
        return Err(ValidationError::MissingExtension {
            name: file.name.clone(),
            allowed: policy.allowed_extensions.clone(),
        });
    };

    if !is_allowed(&file.name, &policy.allowed_extensions) {
        return Err(ValidationError::DisallowedExtension {
            name: file.name.clone(),
            extension,
            allowed: policy.allowed_extensions.clone(),
        });
    }

    if !validate_file_size(file.size, policy.max_file_size) {
        return Err(ValidationError::TooLarge {
            name: file.name.clone(),
            size: file.size,
            max: policy.max_file_size,
        });
    }

    Ok(())
}
