//! Error types for SkillReel core
//!
//! Provides error handling for:
//! - Remote provider failures (unconfigured, transport, unparseable output)
//! - Exhausted analysis fallbacks
//! - Partial verification
//! - Project store I/O
//! - Scheduler misuse

use crate::types::{ProjectId, SkillId, SkillStatus};

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A single provider failed
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Every configured analysis provider failed
    #[error("AI analysis failed after {} attempt(s): {}", .attempts.len(), summarize(.attempts))]
    AnalysisFailed {
        /// One entry per provider tried, in order
        attempts: Vec<ProviderError>,
    },

    /// Some per-skill verification calls failed (not fatal)
    #[error("verification incomplete: {failed} of {total} skill checks failed")]
    PartialVerificationFailure { failed: usize, total: usize },

    /// Project creation attempted before an analysis was available
    #[error("analysis required before the project can be created")]
    AnalysisRequired,

    /// Draft is missing required fields
    #[error("invalid draft: {0}")]
    InvalidDraft(String),

    /// Project not present in the store
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// Skill not present in the project
    #[error("skill not found: {0}")]
    SkillNotFound(SkillId),

    /// Verified skills cannot be moved back by hand
    #[error("skill {0} is verified and can no longer change status")]
    SkillLocked(SkillId),

    /// Status only a verification pass may set
    #[error("status {0} can only be set by verification")]
    ReservedStatus(SkillStatus),

    /// Store failure
    #[error("store error: {0}")]
    Store(StoreError),

    /// Scheduler failure
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Evidence upload failure
    #[error("evidence upload failed: {0}")]
    Evidence(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    /// Check if error should be shown to the user as a blocking message
    #[inline]
    #[must_use]
    pub fn blocks_progress(&self) -> bool {
        matches!(self, Self::AnalysisFailed { .. } | Self::AnalysisRequired)
    }

    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider(e) => e.is_retryable(),
            Self::AnalysisFailed { attempts } => attempts.iter().any(ProviderError::is_retryable),
            Self::PartialVerificationFailure { .. } | Self::Evidence(_) => true,
            _ => false,
        }
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::ProjectNotFound(id),
            other => Self::Store(other),
        }
    }
}

fn summarize(attempts: &[ProviderError]) -> String {
    attempts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised by a single remote provider
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Provider has no configuration (credentials, endpoint)
    #[error("{provider} is not configured")]
    Unavailable { provider: String },

    /// Network, HTTP status, or transport decoding failure
    #[error("{provider} call failed: {message}")]
    CallFailed { provider: String, message: String },

    /// Response received but does not match the expected schema
    #[error("{provider} returned no valid response: {reason}")]
    NoValidResponse { provider: String, reason: String },
}

impl ProviderError {
    /// Provider not configured
    #[inline]
    pub fn unavailable(provider: impl Into<String>) -> Self {
        Self::Unavailable {
            provider: provider.into(),
        }
    }

    /// Call failed
    #[inline]
    pub fn call_failed(provider: impl Into<String>, message: impl ToString) -> Self {
        Self::CallFailed {
            provider: provider.into(),
            message: message.to_string(),
        }
    }

    /// Unparseable response
    #[inline]
    pub fn no_valid_response(provider: impl Into<String>, reason: impl ToString) -> Self {
        Self::NoValidResponse {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }

    /// Name of the provider that failed
    #[must_use]
    pub fn provider(&self) -> &str {
        match self {
            Self::Unavailable { provider }
            | Self::CallFailed { provider, .. }
            | Self::NoValidResponse { provider, .. } => provider,
        }
    }

    /// Transport failures may succeed on retry; missing config and bad output will not
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CallFailed { .. })
    }
}

/// Project store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backing file could not be read or written
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Backing file is not a valid project collection
    #[error("corrupt project collection: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Record with the same id already exists
    #[error("project already exists: {0}")]
    Duplicate(ProjectId),

    /// Record not found
    #[error("project not found: {0}")]
    NotFound(ProjectId),

    /// Blocking store task panicked or was cancelled
    #[error("store task failed: {0}")]
    Task(String),
}

/// Scheduler errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// Scheduler was shut down
    #[error("scheduler has been shut down")]
    ShutDown,

    /// Called outside a Tokio runtime
    #[error("no async runtime available to run the timer")]
    NoRuntime,
}
