//! Configuration management for Planwise.
//!
//! Handles loading and saving configuration from TOML files, with
//! environment overrides for the backend URL and state file.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::retry::RetryConfig;
use super::validation::{UploadPolicy, DOCUMENT_EXTENSIONS, IMAGE_EXTENSIONS, MAX_FILE_SIZE};

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "PLANWISE_API_URL";

/// Environment variable overriding `storage.state_file`.
pub const STATE_FILE_ENV: &str = "PLANWISE_STATE_FILE";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend settings
    pub api: ApiConfig,

    /// Saved state settings
    pub storage: StorageConfig,

    /// Upload limits
    pub uploads: UploadConfig,

    /// Wizard content
    pub wizard: WizardConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the extraction/task-generation backend
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Retries after a connection failure (HTTP errors are never retried)
    pub max_retries: u32,

    /// Delay before the first retry, doubled on each further attempt
    pub retry_initial_delay_ms: u64,
}

/// Saved state settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Whether wizard state is saved between runs
    pub persist: bool,

    /// State file location (defaults to the platform data directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
}

/// Upload limits per wizard step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum size of a single file in bytes
    pub max_file_size: u64,

    /// Extensions accepted on the requirements step
    pub requirements_extensions: Vec<String>,

    /// Extensions accepted on the inspiration step
    pub inspiration_extensions: Vec<String>,
}

/// Wizard content settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    /// Integrations offered on the last step
    pub integrations: Vec<String>,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.planwise.toml` in current directory
    /// 2. `~/.config/planwise/config.toml`
    /// 3. Falls back to defaults
    ///
    /// Environment overrides (including a `.env` file) are applied last.
    pub fn load() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = Self::load_file()?;
        config.apply_env();
        Ok(config)
    }

    fn load_file() -> anyhow::Result<Self> {
        // Try local config first
        let local_config = PathBuf::from(".planwise.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        // Try global config
        if let Some(config_dir) = Self::config_dir() {
            let global_config = config_dir.join("config.toml");
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Apply `PLANWISE_*` environment overrides.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
        if let Ok(path) = std::env::var(STATE_FILE_ENV) {
            if !path.trim().is_empty() {
                self.storage.state_file = Some(PathBuf::from(path.trim()));
            }
        }
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("planwise"))
    }

    /// Get the data directory path (for saved state and logs).
    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("planwise"))
    }

    /// Resolved state file path, if state is persisted at all.
    pub fn state_file(&self) -> Option<PathBuf> {
        if !self.storage.persist {
            return None;
        }
        self.storage
            .state_file
            .clone()
            .or_else(|| Self::data_dir().map(|d| d.join("state.json")))
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_retries,
            initial_delay: Duration::from_millis(self.retry_initial_delay_ms),
            ..RetryConfig::default()
        }
    }
}

impl UploadConfig {
    pub fn requirements_policy(&self) -> UploadPolicy {
        UploadPolicy::new(self.requirements_extensions.clone(), self.max_file_size)
    }

    pub fn inspiration_policy(&self) -> UploadPolicy {
        UploadPolicy::new(self.inspiration_extensions.clone(), self.max_file_size)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 120,
            max_retries: 2,
            retry_initial_delay_ms: 500,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { persist: true, state_file: None }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            requirements_extensions: DOCUMENT_EXTENSIONS.clone(),
            inspiration_extensions: IMAGE_EXTENSIONS.clone(),
        }
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            integrations: [
                "Firebase",
                "Supabase",
                "MongoDB",
                "PostgreSQL",
                "Auth0",
                "Stripe",
                "SendGrid",
                "Twilio",
            ]
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
        }
    }
}
