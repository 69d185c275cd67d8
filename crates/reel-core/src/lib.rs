//! SkillReel Core - analysis & verification orchestration
//!
//! Turns a project description into a persisted, verifiable skill plan:
//! - Debounces draft edits before calling AI providers
//! - Falls back across providers and, for suggestions, to a local heuristic
//! - Reconciles fresh analyses into persisted skill progress
//! - Fans evidence out to per-skill verification and commits one merged update
//!
//! # Example
//!
//! ```rust,ignore
//! use reel_core::prelude::*;
//!
//! # async fn example() -> Result<(), PipelineError> {
//! let pipeline = SkillReelPipeline::new(
//!     PipelineConfig::default(),
//!     &ProviderSet::new(),
//!     std::sync::Arc::new(ProjectStore::in_memory()),
//! );
//!
//! let draft = ProjectDraft::new("Portfolio", "A React portfolio site ...")
//!     .with_skills(["React", "Leadership"]);
//! let analysis = pipeline.analyze(&draft).await?;
//! let project = pipeline.create_project(&draft, Some(&analysis))?;
//!
//! println!("{} skills planned", project.skill_demonstrations.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod evidence;
pub mod heuristic;
pub mod pipeline;
pub mod plan;
pub mod provider;
pub mod reconcile;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod types;
pub mod verification;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use config::{
    EvidenceConfig, FunctionEndpointConfig, ModelEndpointConfig, PipelineConfig,
    ProviderSettings, SchedulerConfig, StoreConfig, VerificationConfig,
};
pub use error::{PipelineError, ProviderError, SchedulerError, StoreError};
pub use evidence::{EvidenceStore, EvidenceUpload};
pub use pipeline::SkillReelPipeline;
pub use plan::{build_plan, skill_feedback, SkillFeedback};
pub use provider::{
    normalize_analysis, AnalysisProvider, ProviderChain, ProviderRole, ProviderSet, Resolution,
    VerificationProvider,
};
pub use reconcile::{apply_assessments, apply_simulated, reconcile, set_skill_status};
pub use scheduler::{ScheduleKey, StabilityScheduler};
pub use session::{DraftSession, DraftState};
pub use store::{JsonFileBackend, MemoryBackend, ProjectBackend, ProjectStore};
pub use types::{
    AnalysisRequest, AnalysisResult, DemonstrationMethod, EvidenceMeta, ProgressSummary,
    ProjectDraft, ProjectId, ProjectRecord, ProjectStatus, Proficiency, SkillCategory,
    SkillDemonstration, SkillId, SkillMapping, SkillSpec, SkillStatus, SkillSuggestions,
    SuggestionRequest, VerificationRequest, VerificationVerdict, VERIFY_ACTION,
};
pub use verification::{SkillCheck, VerificationAggregator, VerificationMode, VerificationReport};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with SkillReel Core
    pub use crate::{
        AnalysisProvider, AnalysisResult, DraftSession, EvidenceUpload, PipelineConfig,
        PipelineError, ProjectDraft, ProjectId, ProjectRecord, ProjectStore, ProviderError,
        ProviderSet, SkillReelPipeline, SkillStatus, VerificationProvider,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
