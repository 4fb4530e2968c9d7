/// Configuration system for git-memory
///
/// Supports loading from multiple sources with priority:
/// CLI args > Environment variables > Config file > Defaults
use crate::error::{ConfigError, GitMemoryError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported model providers, all speaking the OpenAI-compatible chat API
pub const KNOWN_PROVIDERS: &[&str] = &["openai", "openrouter", "local"];

/// Immutable run configuration
///
/// Constructed once in `main` and passed into the pipeline; no component
/// reads ambient global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Model provider: "openai", "openrouter" or "local"
    #[serde(default = "default_model_provider")]
    pub model_provider: String,

    /// Model name (e.g., "gpt-4o")
    #[serde(default = "default_model")]
    pub model: String,

    /// Minimum number of commits per group
    #[serde(default = "default_min_commits")]
    pub min_commits: usize,

    /// Minimum number of diff lines for a group to be processed
    #[serde(default)]
    pub min_diff_lines: Option<usize>,

    /// Name of the history directory created inside the repository
    #[serde(default = "default_history_dir_name")]
    pub history_dir_name: String,

    /// API key for the AI provider (usually supplied via environment)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override for the AI provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Timeout in seconds for summarizer requests
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Skip the AI provider entirely and use the deterministic fallback
    #[serde(default)]
    pub no_ai: bool,
}

// Default value functions
fn default_model_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_min_commits() -> usize {
    1
}

fn default_history_dir_name() -> String {
    ".history".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_provider: default_model_provider(),
            model: default_model(),
            min_commits: default_min_commits(),
            min_diff_lines: None,
            history_dir_name: default_history_dir_name(),
            api_key: None,
            api_base: None,
            request_timeout_secs: default_request_timeout(),
            no_ai: false,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, GitMemoryError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(provider) = std::env::var("GIT_MEMORY_PROVIDER") {
            self.model_provider = provider;
        }

        if let Ok(model) = std::env::var("GIT_MEMORY_MODEL") {
            self.model = model;
        }

        if let Ok(min_commits) = std::env::var("GIT_MEMORY_MIN_COMMITS")
            && let Ok(n) = min_commits.parse()
        {
            self.min_commits = n;
        }

        if let Ok(min_diff_lines) = std::env::var("GIT_MEMORY_MIN_DIFF_LINES")
            && let Ok(n) = min_diff_lines.parse()
        {
            self.min_diff_lines = Some(n);
        }

        // Generic key first, then provider-specific fallbacks
        if let Ok(key) = std::env::var("GIT_MEMORY_API_KEY") {
            self.api_key = Some(key);
        } else if self.api_key.is_none() {
            let var = match self.model_provider.as_str() {
                "openrouter" => "OPENROUTER_API_KEY",
                _ => "OPENAI_API_KEY",
            };
            if let Ok(key) = std::env::var(var) {
                self.api_key = Some(key);
            }
        }

        if let Ok(base) = std::env::var("GIT_MEMORY_API_BASE") {
            self.api_base = Some(base);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), GitMemoryError> {
        if self.min_commits == 0 {
            return Err(ConfigError::InvalidValue {
                key: "min_commits".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if !KNOWN_PROVIDERS.contains(&self.model_provider.as_str()) {
            return Err(ConfigError::InvalidValue {
                key: "model_provider".to_string(),
                reason: format!(
                    "must be one of {:?}, got '{}'",
                    KNOWN_PROVIDERS, self.model_provider
                ),
            }
            .into());
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if self.history_dir_name.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "history_dir_name".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Create a new Config with defaults and environment overrides
    pub fn new() -> Result<Self, GitMemoryError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}
