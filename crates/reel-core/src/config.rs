//! Pipeline configuration
//!
//! Loaded from TOML; every section has defaults so an empty file is valid.
//!
//! ```toml
//! [scheduler]
//! analysis_delay_ms = 1500
//!
//! [providers]
//! prefer_primary = true
//!
//! [providers.functions]
//! base_url = "https://example.functions.host"
//! ```

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub scheduler: SchedulerConfig,
    pub providers: ProviderSettings,
    pub store: StoreConfig,
    pub evidence: EvidenceConfig,
    pub verification: VerificationConfig,
}

impl PipelineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// `PipelineError::Config` when the text is not valid configuration
    pub fn from_toml_str(text: &str) -> Result<Self, PipelineError> {
        toml::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// `PipelineError::Config` when the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// With scheduler settings
    #[inline]
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// With provider preference
    #[inline]
    #[must_use]
    pub fn with_prefer_primary(mut self, prefer_primary: bool) -> Self {
        self.providers.prefer_primary = prefer_primary;
        self
    }

    /// With store path
    #[inline]
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store.path = path.into();
        self
    }
}

/// Debounce settings for the two scheduler keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Delay after the last edit before suggestions are requested
    pub suggestion_delay_ms: u64,
    /// Delay after the last edit before analysis is requested
    pub analysis_delay_ms: u64,
    /// Description must be strictly longer than this (in characters)
    pub min_description_chars: usize,
}

impl SchedulerConfig {
    #[inline]
    #[must_use]
    pub fn suggestion_delay(&self) -> Duration {
        Duration::from_millis(self.suggestion_delay_ms)
    }

    #[inline]
    #[must_use]
    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            suggestion_delay_ms: 2000,
            analysis_delay_ms: 1500,
            min_description_chars: 50,
        }
    }
}

/// Remote provider settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Try the primary (model) provider before the secondary (functions) one
    pub prefer_primary: bool,
    /// Primary provider endpoint
    pub model: Option<ModelEndpointConfig>,
    /// Secondary provider endpoint, also used for verification
    pub functions: Option<FunctionEndpointConfig>,
    /// Per-category cap applied to suggestions
    pub suggestion_limit: usize,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            prefer_primary: true,
            model: None,
            functions: None,
            suggestion_limit: 12,
        }
    }
}

/// Direct model invocation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEndpointConfig {
    /// Messages endpoint URL
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model_id")]
    pub model: String,
    #[serde(default = "default_anthropic_version")]
    pub anthropic_version: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Unset means no client-side timeout
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ModelEndpointConfig {
    /// Endpoint with default model settings
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            model: default_model_id(),
            anthropic_version: default_anthropic_version(),
            max_tokens: default_max_tokens(),
            timeout_secs: None,
        }
    }
}

fn default_model_id() -> String {
    "anthropic.claude-3-sonnet-20240229-v1:0".to_string()
}

fn default_anthropic_version() -> String {
    "bedrock-2023-05-31".to_string()
}

fn default_max_tokens() -> u32 {
    4000
}

/// Server-side function endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEndpointConfig {
    /// Base URL; functions live under `/functions/v1/<name>`
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl FunctionEndpointConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout_secs: None,
        }
    }
}

/// Project store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON collection file
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("reel-projects.json"),
        }
    }
}

/// Evidence storage settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Root directory for uploaded artifacts
    pub root: PathBuf,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("project-videos"),
        }
    }
}

/// Verification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Candidate ratings for simulated verification, drawn uniformly
    pub simulated_ratings: Vec<u8>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            simulated_ratings: vec![3, 4, 4, 5, 5],
        }
    }
}
