//! Explorer settings
//!
//! Built-in defaults, optionally overlaid by a JSON settings file, then by
//! `API_EXPLORER_*` environment variables. Nothing is ever written back.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::{ExplorerError, Result};

/// Default backend during local development
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default location of the OpenAPI document
pub const DEFAULT_SPEC_URL: &str = "http://localhost:8000/openapi.json";

const ENV_BASE_URL: &str = "API_EXPLORER_BASE_URL";
const ENV_SPEC_URL: &str = "API_EXPLORER_SPEC_URL";
const ENV_TIMEOUT_SECS: &str = "API_EXPLORER_TIMEOUT_SECS";

/// Explorer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Prefix for relative operation paths
    pub base_url: String,
    /// Where the spec loader fetches the document
    pub spec_url: String,
    /// Per-request timeout in seconds (0 = none)
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            spec_url: DEFAULT_SPEC_URL.to_string(),
            request_timeout_secs: 30,
        }
    }

    /// Defaults, then the settings file if given, then the environment
    pub fn load(settings_file: Option<&Path>) -> Result<Self> {
        let settings = match settings_file {
            Some(path) => Self::from_file(path)?,
            None => Self::new(),
        };
        let settings = settings.with_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| ExplorerError::InvalidSettings(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Apply `API_EXPLORER_*` environment variables
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(spec_url) = lookup(ENV_SPEC_URL) {
            self.spec_url = spec_url;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS).and_then(|s| s.trim().parse().ok()) {
            self.request_timeout_secs = secs;
        }
        self
    }

    /// Both URLs must be absolute
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("baseUrl", &self.base_url), ("specUrl", &self.spec_url)] {
            url::Url::parse(value)
                .map_err(|e| ExplorerError::InvalidSettings(format!("{} '{}': {}", name, value, e)))?;
        }
        Ok(())
    }

    /// Request timeout, if enabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}
