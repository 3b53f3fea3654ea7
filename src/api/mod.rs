//! Backend API integration.
//!
//! The wizard never talks HTTP itself: it goes through [`TaskService`],
//! which [`ApiClient`] implements against the extraction and
//! task-generation endpoints.

mod client;
mod wire;

pub use client::ApiClient;
pub use wire::{ExtractionResponse, GenerateTasksRequest, GenerateTasksResponse};

use async_trait::async_trait;

use crate::core::{ProcessedTask, UploadFile, UserInput, WizardResult};

/// Operations the wizard needs from the backend.
#[async_trait]
pub trait TaskService: Send + Sync {
    /// Extract text from a requirements document.
    async fn process_document(&self, file: &UploadFile) -> WizardResult<String>;

    /// Describe an inspiration image as text.
    async fn process_image(&self, file: &UploadFile) -> WizardResult<String>;

    /// Turn the collected input into a task list.
    async fn generate_tasks(&self, input: &UserInput) -> WizardResult<Vec<ProcessedTask>>;
}
