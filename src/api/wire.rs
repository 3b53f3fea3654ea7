//! Request and response bodies exchanged with the backend.

use serde::{Deserialize, Serialize};

use crate::core::{ProcessedTask, UserInput};

/// Body of `POST /generate-tasks`.
///
/// Nested input records are flattened to plain strings so the backend
/// schema does not follow the client's internal layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateTasksRequest {
    pub description: String,
    pub requirements: String,
    pub inspiration_text: String,
    pub integrations: Vec<String>,
}

impl From<&UserInput> for GenerateTasksRequest {
    fn from(input: &UserInput) -> Self {
        Self {
            description: input.description.clone(),
            requirements: input.requirements.content.clone(),
            inspiration_text: input.inspiration.processed_text.clone().unwrap_or_default(),
            integrations: input.integrations.clone(),
        }
    }
}

/// Response of `POST /generate-tasks`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateTasksResponse {
    pub tasks: Vec<ProcessedTask>,
}

impl GenerateTasksResponse {
    /// Reject task lists the board cannot display.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(pos) = self.tasks.iter().position(|t| t.id.trim().is_empty()) {
            return Err(format!("task #{} has an empty id", pos + 1));
        }
        Ok(())
    }
}

/// Response of the extraction endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionResponse {
    pub text: String,
}
