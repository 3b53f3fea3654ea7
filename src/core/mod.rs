//! Core types and functionality for Planwise.
//!
//! This module contains the fundamental pieces the wizard is built from:
//! the data model, upload validation, the input store and its saved state,
//! configuration, and retry helpers for network calls.

mod config;
mod error;
mod model;
mod persistence;
mod retry;
mod store;
mod validation;

pub use config::{
    ApiConfig, Config, StorageConfig, UploadConfig, WizardConfig, API_URL_ENV, STATE_FILE_ENV,
};
pub use error::{PersistenceError, WizardError, WizardResult};
pub use model::{
    mime_type_for, sort_tasks, ImageMetadata, Inspiration, ProcessedTask, Requirements,
    TaskStatus, UploadFile, UserInput,
};
pub use persistence::{PersistedState, StateFile, StoreState, SCHEMA_VERSION};
pub use retry::{retry_async, RetryConfig, RetryResult};
pub use store::{SubscriptionId, UserInputStore};
pub use validation::{
    file_extension, is_allowed, validate_file_size, validate_upload, UploadPolicy,
    ValidationError, DOCUMENT_EXTENSIONS, IMAGE_EXTENSIONS, MAX_FILE_SIZE,
};
