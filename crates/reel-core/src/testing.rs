//! Recording provider shared by unit tests

use crate::error::ProviderError;
use crate::provider::AnalysisProvider;
use crate::types::{
    AnalysisRequest, AnalysisResult, DemonstrationMethod, SkillSpec, SkillSuggestions,
    SuggestionRequest, DEFAULT_SCORE,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Echoes target skills back as detected skills and records every request
#[derive(Debug, Default)]
pub(crate) struct RecordingProvider {
    pub(crate) analyses: Mutex<Vec<AnalysisRequest>>,
    pub(crate) suggestions: Mutex<Vec<SuggestionRequest>>,
    pub(crate) failing: AtomicBool,
    latency: Mutex<Duration>,
}

impl RecordingProvider {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay every call by `latency` after it is recorded
    pub(crate) fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    async fn wait(&self) {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    pub(crate) fn analysis_calls(&self) -> usize {
        self.analyses.lock().len()
    }

    pub(crate) fn suggestion_calls(&self) -> usize {
        self.suggestions.lock().len()
    }
}

#[async_trait]
impl AnalysisProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn suggest_skills(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SkillSuggestions, ProviderError> {
        self.suggestions.lock().push(request.clone());
        self.wait().await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::call_failed("recording", "scripted failure"));
        }
        Ok(SkillSuggestions {
            technical: vec!["Rust".into()],
            soft: vec!["Communication".into()],
            ..SkillSuggestions::default()
        })
    }

    async fn analyze_scope(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, ProviderError> {
        self.analyses.lock().push(request.clone());
        self.wait().await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::call_failed("recording", "scripted failure"));
        }
        Ok(AnalysisResult {
            clarity_score: DEFAULT_SCORE,
            feasibility_score: DEFAULT_SCORE,
            identified_risks: vec![],
            suggested_technologies: vec![],
            detected_skills: request
                .target_skills
                .iter()
                .map(|name| {
                    SkillSpec::new(name.clone(), crate::heuristic::categorize_skill(name))
                        .with_method(DemonstrationMethod::Code)
                        .with_requirements(format!("Show {name}"))
                })
                .collect(),
            skill_mapping: vec![],
        })
    }
}
