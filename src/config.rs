use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Placeholder substituted with the company name in `endpoint_template`.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Run configuration for the fetch stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Search URL with a `{query}` placeholder
    #[serde(default = "default_endpoint_template")]
    pub endpoint_template: String,

    /// Attempts per query before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Backoff before the second attempt; doubles on every further attempt. 0 disables.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Upper bound for a single backoff delay
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_endpoint_template() -> String {
    "https://www.google.com/search?q={query}&sourceid=chrome&ie=UTF-8".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_backoff_max_ms() -> u64 {
    8_000
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36".to_string()
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            endpoint_template: default_endpoint_template(),
            max_attempts: default_max_attempts(),
            request_timeout_secs: default_request_timeout_secs(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl ScraperConfig {
    /// Load and validate a JSON config file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if !self.endpoint_template.contains(QUERY_PLACEHOLDER) {
            return Err(ConfigError::MissingPlaceholder(self.endpoint_template.clone()));
        }
        Url::parse(&self.search_url("probe")).map_err(|source| ConfigError::InvalidEndpoint {
            template: self.endpoint_template.clone(),
            source,
        })?;
        Ok(())
    }

    /// Literal substitution of the query into the endpoint template.
    pub fn search_url(&self, query: &str) -> String {
        self.endpoint_template.replace(QUERY_PLACEHOLDER, query)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn with_endpoint(mut self, template: impl Into<String>) -> Self {
        self.endpoint_template = template.into();
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_backoff_base_ms(mut self, ms: u64) -> Self {
        self.backoff_base_ms = ms;
        self
    }
}
