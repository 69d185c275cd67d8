//! Testing utilities for SkillReel workspace
//!
//! Scripted providers, an in-memory evidence store, and fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use reel_core::heuristic::{categorize_skill, demonstration_method_for};
use reel_core::{
    AnalysisProvider, AnalysisRequest, AnalysisResult, EvidenceStore, EvidenceUpload,
    PipelineError, ProjectDraft, ProjectId, ProjectRecord, ProjectStatus, ProviderError,
    SkillDemonstration, SkillSpec, SkillSuggestions, SuggestionRequest, VerificationProvider,
    VerificationRequest, VerificationVerdict,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Exactly 60 characters, above the 50-character trigger threshold
pub const SIXTY_CHAR_DESCRIPTION: &str = "A React portfolio site that highlights team leadership work.";

/// Analysis provider answering from a script and recording every request
///
/// By default every target skill comes back as a detected skill.
#[derive(Debug)]
pub struct ScriptedAnalysisProvider {
    name: String,
    delay: Duration,
    fixed: Mutex<Option<AnalysisResult>>,
    failing: AtomicBool,
    analyses: Mutex<Vec<AnalysisRequest>>,
    suggestions: Mutex<Vec<SuggestionRequest>>,
}

impl ScriptedAnalysisProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delay: Duration::ZERO,
            fixed: Mutex::new(None),
            failing: AtomicBool::new(false),
            analyses: Mutex::new(Vec::new()),
            suggestions: Mutex::new(Vec::new()),
        }
    }

    /// Sleep before answering
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Answer analyses with `analysis` instead of echoing target skills
    #[must_use]
    pub fn with_analysis(self, analysis: AnalysisResult) -> Self {
        self.set_analysis(analysis);
        self
    }

    /// Replace the scripted analysis for later calls
    pub fn set_analysis(&self, analysis: AnalysisResult) {
        *self.fixed.lock() = Some(analysis);
    }

    /// Fail every call
    #[must_use]
    pub fn failing(self) -> Self {
        self.set_failing(true);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn analysis_requests(&self) -> Vec<AnalysisRequest> {
        self.analyses.lock().clone()
    }

    pub fn suggestion_requests(&self) -> Vec<SuggestionRequest> {
        self.suggestions.lock().clone()
    }

    fn scripted_failure(&self) -> Result<(), ProviderError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(ProviderError::call_failed(self.name.clone(), "scripted failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AnalysisProvider for ScriptedAnalysisProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn suggest_skills(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SkillSuggestions, ProviderError> {
        self.suggestions.lock().push(request.clone());
        tokio::time::sleep(self.delay).await;
        self.scripted_failure()?;
        Ok(SkillSuggestions {
            technical: vec!["React".into(), "TypeScript".into()],
            soft: vec!["Leadership".into()],
            ..SkillSuggestions::default()
        })
    }

    async fn analyze_scope(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, ProviderError> {
        self.analyses.lock().push(request.clone());
        tokio::time::sleep(self.delay).await;
        self.scripted_failure()?;
        let fixed = self.fixed.lock().clone();
        Ok(fixed.unwrap_or_else(|| analysis_for(&request.target_skills)))
    }
}

/// Verifier rating the skills it was told about and failing the rest
#[derive(Debug, Default)]
pub struct ScriptedVerifier {
    ratings: Mutex<HashMap<String, u8>>,
    requests: Mutex<Vec<VerificationRequest>>,
}

impl ScriptedVerifier {
    /// Verifier failing every skill
    pub fn new() -> Self {
        Self::default()
    }

    /// Rate `skill` with `rating`
    #[must_use]
    pub fn rating(self, skill: impl Into<String>, rating: u8) -> Self {
        self.set_rating(skill, rating);
        self
    }

    pub fn set_rating(&self, skill: impl Into<String>, rating: u8) {
        self.ratings.lock().insert(skill.into(), rating);
    }

    /// Fail `skill` from now on
    pub fn forget(&self, skill: &str) {
        self.ratings.lock().remove(skill);
    }

    pub fn requests(&self) -> Vec<VerificationRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl VerificationProvider for ScriptedVerifier {
    fn name(&self) -> &str {
        "scripted-verifier"
    }

    async fn verify_evidence(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationVerdict, ProviderError> {
        self.requests.lock().push(request.clone());
        let rating = self.ratings.lock().get(&request.skill_name).copied();
        match rating {
            Some(rating) => Ok(VerificationVerdict {
                rating,
                feedback: format!("{} clearly demonstrated", request.skill_name),
            }),
            None => Err(ProviderError::call_failed("scripted-verifier", "service unavailable")),
        }
    }
}

/// Evidence store keeping uploads in memory
#[derive(Debug, Default)]
pub struct MemoryEvidenceStore {
    uploads: Mutex<Vec<(ProjectId, EvidenceUpload)>>,
    failing: AtomicBool,
}

impl MemoryEvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every upload
    #[must_use]
    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    pub fn uploads(&self) -> Vec<(ProjectId, EvidenceUpload)> {
        self.uploads.lock().clone()
    }
}

#[async_trait]
impl EvidenceStore for MemoryEvidenceStore {
    async fn put(&self, project_id: &ProjectId, upload: &EvidenceUpload) -> Result<String, PipelineError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PipelineError::Evidence("scripted upload failure".to_string()));
        }
        let mut uploads = self.uploads.lock();
        uploads.push((project_id.clone(), upload.clone()));
        Ok(format!("memory://{}/{}-{}", project_id, uploads.len(), upload.file_name))
    }
}

/// Detected skill specs for `names`, categorised like the heuristic does
pub fn detected(names: &[&str]) -> Vec<SkillSpec> {
    names
        .iter()
        .map(|name| {
            SkillSpec::new(*name, categorize_skill(name))
                .with_method(demonstration_method_for(name))
                .with_requirements(format!("Demonstrate {name} in the showcase"))
        })
        .collect()
}

/// Analysis detecting exactly `target_skills`
pub fn analysis_for(target_skills: &[String]) -> AnalysisResult {
    let names: Vec<&str> = target_skills.iter().map(String::as_str).collect();
    AnalysisResult {
        clarity_score: 8,
        feasibility_score: 7,
        identified_risks: vec!["Scope creep".into()],
        suggested_technologies: vec!["TypeScript".into()],
        detected_skills: detected(&names),
        skill_mapping: vec![],
    }
}

/// Draft with the 60-character description
pub fn sample_draft(skills: &[&str]) -> ProjectDraft {
    ProjectDraft::new("Portfolio", SIXTY_CHAR_DESCRIPTION)
        .with_goals("Land a frontend role")
        .with_skills(skills.iter().copied())
}

/// Stored-shape project with planned demonstrations for `skills`
pub fn sample_project(skills: &[&str]) -> ProjectRecord {
    ProjectRecord {
        id: ProjectId::generate(),
        name: "Portfolio".into(),
        description: SIXTY_CHAR_DESCRIPTION.into(),
        goals: None,
        target_skills: skills.iter().map(ToString::to_string).collect(),
        analysis: None,
        plan: vec![],
        skill_demonstrations: detected(skills)
            .into_iter()
            .map(SkillDemonstration::planned)
            .collect(),
        status: ProjectStatus::Active,
        created_at: Utc::now(),
    }
}
