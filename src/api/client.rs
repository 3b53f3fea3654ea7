//! HTTP client for the extraction and task-generation backend.
//!
//! Connection failures are retried with backoff; HTTP error responses are
//! returned immediately.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::wire::{ExtractionResponse, GenerateTasksRequest, GenerateTasksResponse};
use super::TaskService;
use crate::core::{
    retry_async, ApiConfig, ProcessedTask, RetryConfig, UploadFile, UserInput, WizardError,
    WizardResult,
};

const PROCESS_DOCUMENT: &str = "process-document";
const PROCESS_IMAGE: &str = "process-image";
const GENERATE_TASKS: &str = "generate-tasks";

/// Backend API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// HTTP client
    client: Client,
    /// Backend base URL, without trailing slash
    base_url: String,
    /// Retry policy for connection failures
    retry: RetryConfig,
    /// Limit for a whole request, response body included
    timeout: Duration,
}

impl ApiClient {
    /// Create a client with the default timeout and retries.
    pub fn new(base_url: impl Into<String>) -> WizardResult<Self> {
        Self::from_config(&ApiConfig { base_url: base_url.into(), ..ApiConfig::default() })
    }

    /// Create a client from configuration.
    pub fn from_config(config: &ApiConfig) -> WizardResult<Self> {
        let timeout = config.timeout();
        let client = Client::builder().timeout(timeout).build().map_err(WizardError::Transport)?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: config.retry_config(),
            timeout,
        })
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Send a request built by `build`, retrying connection failures.
    async fn send<F>(&self, endpoint: &str, build: F) -> WizardResult<Response>
    where
        F: Fn(&Client, String) -> reqwest::RequestBuilder,
    {
        let url = self.url(endpoint);
        tracing::debug!("POST {} (timeout {:?})", url, self.timeout);

        let outcome = retry_async(
            &self.retry,
            || build(&self.client, url.clone()).send(),
            |e: &reqwest::Error| !e.is_builder(),
        )
        .await;

        if outcome.was_retried() {
            tracing::debug!("{} took {} attempts", endpoint, outcome.attempts);
        }

        outcome.into_result().map_err(|e| {
            tracing::warn!("Request to {} failed: {}", url, e);
            WizardError::Transport(e)
        })
    }

    /// Upload `file` to an extraction endpoint and return the text.
    async fn extract(&self, endpoint: &str, file: &UploadFile) -> WizardResult<String> {
        let response = self
            .send(endpoint, |client, url| client.post(url).multipart(file_form(file)))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{} returned {}: {}", endpoint, status, body);
            return Err(WizardError::Processing(format!(
                "could not process '{}' ({})",
                file.name, status
            )));
        }

        let parsed: ExtractionResponse =
            decode(response).await.map_err(WizardError::Processing)?;
        tracing::debug!("{} extracted {} characters from {}", endpoint, parsed.text.len(), file.name);
        Ok(parsed.text)
    }

    /// Extract text from a requirements document.
    pub async fn process_document(&self, file: &UploadFile) -> WizardResult<String> {
        self.extract(PROCESS_DOCUMENT, file).await
    }

    /// Describe an inspiration image as text.
    pub async fn process_image(&self, file: &UploadFile) -> WizardResult<String> {
        self.extract(PROCESS_IMAGE, file).await
    }

    /// Generate a task list from the collected input.
    pub async fn generate_tasks(&self, input: &UserInput) -> WizardResult<Vec<ProcessedTask>> {
        let body = GenerateTasksRequest::from(input);
        tracing::debug!(
            "Generating tasks ({} integrations, {} chars of requirements)",
            body.integrations.len(),
            body.requirements.len()
        );

        let response = self.send(GENERATE_TASKS, |client, url| client.post(url).json(&body)).await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!("Task generation returned {}: {}", status, detail);
            let detail = if detail.trim().is_empty() { status.to_string() } else { detail };
            return Err(WizardError::Generation(detail));
        }

        let parsed: GenerateTasksResponse =
            decode(response).await.map_err(WizardError::Generation)?;
        parsed.validate().map_err(WizardError::Generation)?;
        tracing::info!("Backend generated {} tasks", parsed.tasks.len());
        Ok(parsed.tasks)
    }
}

#[async_trait]
impl TaskService for ApiClient {
    async fn process_document(&self, file: &UploadFile) -> WizardResult<String> {
        Self::process_document(self, file).await
    }

    async fn process_image(&self, file: &UploadFile) -> WizardResult<String> {
        Self::process_image(self, file).await
    }

    async fn generate_tasks(&self, input: &UserInput) -> WizardResult<Vec<ProcessedTask>> {
        Self::generate_tasks(self, input).await
    }
}

/// Multipart form with the file under the `file` field.
fn file_form(file: &UploadFile) -> Form {
    let part = Part::bytes(file.bytes.clone()).file_name(file.name.clone());
    let part = match part.mime_str(&file.mime_type) {
        Ok(part) => part,
        Err(_) => Part::bytes(file.bytes.clone()).file_name(file.name.clone()),
    };
    Form::new().part("file", part)
}

/// Read and decode a JSON body, describing any mismatch as a string.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, String> {
    let text = response.text().await.map_err(|e| format!("failed to read response: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("unexpected response from backend: {e}"))
}
