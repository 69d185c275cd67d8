//! Draft session
//!
//! Drives the provider chain while a project is being described. Every
//! `update` re-evaluates the trigger thresholds:
//! - suggestions: description longer than the minimum
//! - analysis: description longer than the minimum and at least one target skill
//!
//! Calls are debounced through the `StabilityScheduler`; results land in a
//! shared `DraftState`.

use crate::config::SchedulerConfig;
use crate::error::PipelineError;
use crate::plan::{skill_feedback, SkillFeedback};
use crate::provider::{ProviderChain, Resolution};
use crate::scheduler::{ScheduleKey, StabilityScheduler};
use crate::types::{AnalysisResult, ProjectDraft, SkillSuggestions};
use parking_lot::Mutex;
use std::sync::Arc;

/// Everything the session learned about the current draft
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftState {
    /// Latest draft passed to `update`
    pub draft: ProjectDraft,
    pub suggestions: Option<SkillSuggestions>,
    /// Analysis for the most recent analysed snapshot
    pub analysis: Option<AnalysisResult>,
    /// Set when the most recent analysis failed
    pub analysis_error: Option<String>,
    pub skill_feedback: Vec<SkillFeedback>,
}

impl DraftState {
    /// Whether a project may be created from this state
    #[inline]
    #[must_use]
    pub fn has_analysis(&self) -> bool {
        self.analysis.is_some()
    }
}

/// Debounced suggestion/analysis driver for one draft
pub struct DraftSession {
    chain: Arc<ProviderChain>,
    scheduler: StabilityScheduler,
    config: SchedulerConfig,
    state: Arc<Mutex<DraftState>>,
}

impl DraftSession {
    /// Create session over a shared chain
    #[must_use]
    pub fn new(chain: Arc<ProviderChain>, config: SchedulerConfig) -> Self {
        Self {
            chain,
            scheduler: StabilityScheduler::new(),
            config,
            state: Arc::new(Mutex::new(DraftState::default())),
        }
    }

    /// Record an edit and (re)arm the timers it qualifies for
    ///
    /// Timers for triggers the draft no longer qualifies for are cancelled.
    ///
    /// # Errors
    /// `PipelineError::Scheduler` after `teardown` or outside a runtime
    pub fn update(&self, draft: ProjectDraft) -> Result<(), PipelineError> {
        let long_enough = draft.description_len() > self.config.min_description_chars;
        let has_skills = !draft.target_skills.is_empty();
        self.state.lock().draft = draft.clone();

        if long_enough {
            let chain = Arc::clone(&self.chain);
            let state = Arc::clone(&self.state);
            let closed = self.scheduler.shutdown_token();
            self.scheduler.schedule(
                ScheduleKey::Suggestions,
                draft.suggestion_request(),
                self.config.suggestion_delay(),
                move |request| async move {
                    let resolution = chain.suggest_skills(&request).await;
                    if closed.is_cancelled() {
                        return;
                    }
                    if let Resolution::Current(suggestions) = resolution {
                        tracing::debug!(total = suggestions.total(), "suggestions updated");
                        state.lock().suggestions = Some(suggestions);
                    }
                },
            )?;
        } else {
            self.scheduler.cancel(ScheduleKey::Suggestions);
        }

        if long_enough && has_skills {
            let chain = Arc::clone(&self.chain);
            let state = Arc::clone(&self.state);
            let closed = self.scheduler.shutdown_token();
            self.scheduler.schedule(
                ScheduleKey::Analysis,
                draft.analysis_request(),
                self.config.analysis_delay(),
                move |request| async move {
                    let resolution = chain.analyze_scope(&request).await;
                    if closed.is_cancelled() {
                        tracing::debug!("analysis finished after teardown, result dropped");
                        return;
                    }
                    let Resolution::Current(outcome) = resolution else {
                        return;
                    };
                    let mut state = state.lock();
                    match outcome {
                        Ok(analysis) => {
                            state.skill_feedback = skill_feedback(&analysis);
                            state.analysis = Some(analysis);
                            state.analysis_error = None;
                        }
                        Err(e) => {
                            state.analysis = None;
                            state.skill_feedback.clear();
                            state.analysis_error = Some(e.to_string());
                        }
                    }
                },
            )?;
        } else {
            self.scheduler.cancel(ScheduleKey::Analysis);
        }

        Ok(())
    }

    /// Copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> DraftState {
        self.state.lock().clone()
    }

    /// Chain used by this session
    #[inline]
    #[must_use]
    pub fn chain(&self) -> &Arc<ProviderChain> {
        &self.chain
    }

    /// Stop all pending timers
    ///
    /// Calls already in flight run to completion but their results are
    /// discarded.
    pub fn teardown(&self) {
        tracing::debug!("draft session torn down");
        self.scheduler.shutdown();
    }
}

impl std::fmt::Debug for DraftSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftSession")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}
