//! SkillReel pipeline
//!
//! Wires the provider chain, project store, verification aggregator and
//! evidence store together:
//! - draft sessions for debounced suggestions and analysis
//! - project creation gated on a completed analysis
//! - re-analysis reconciled into persisted skill progress
//! - evidence submission and verification

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::evidence::{EvidenceStore, EvidenceUpload};
use crate::plan::build_plan;
use crate::provider::{ProviderChain, ProviderSet};
use crate::reconcile;
use crate::session::DraftSession;
use crate::store::ProjectStore;
use crate::types::{
    AnalysisRequest, AnalysisResult, EvidenceMeta, ProgressSummary, ProjectDraft, ProjectId,
    ProjectRecord, ProjectStatus, SkillId, SkillStatus, SkillSuggestions,
};
use crate::verification::{VerificationAggregator, VerificationReport};
use chrono::Utc;
use std::sync::Arc;

/// Analysis and verification orchestration over one project store
pub struct SkillReelPipeline {
    config: PipelineConfig,
    chain: Arc<ProviderChain>,
    store: Arc<ProjectStore>,
    aggregator: VerificationAggregator,
    evidence: Option<Arc<dyn EvidenceStore>>,
}

impl SkillReelPipeline {
    /// Create pipeline over an existing store
    #[must_use]
    pub fn new(config: PipelineConfig, providers: &ProviderSet, store: Arc<ProjectStore>) -> Self {
        let chain = ProviderChain::new(providers)
            .with_prefer_primary(config.providers.prefer_primary)
            .with_suggestion_limit(config.providers.suggestion_limit);
        let aggregator = VerificationAggregator::new(
            providers.verifier.clone(),
            Arc::clone(&store),
            &config.verification,
        );

        tracing::info!(
            "pipeline ready (primary: {}, secondary: {}, verifier: {})",
            providers.primary.is_some(),
            providers.secondary.is_some(),
            providers.verifier.is_some()
        );

        Self {
            config,
            chain: Arc::new(chain),
            store,
            aggregator,
            evidence: None,
        }
    }

    /// Create pipeline over the JSON store named in `config`
    #[must_use]
    pub fn from_config(config: PipelineConfig, providers: &ProviderSet) -> Self {
        let store = Arc::new(ProjectStore::open(config.store.path.clone()));
        Self::new(config, providers, store)
    }

    /// With evidence storage for `submit_evidence`
    #[must_use]
    pub fn with_evidence_store(mut self, evidence: Arc<dyn EvidenceStore>) -> Self {
        self.evidence = Some(evidence);
        self
    }

    /// With deterministic simulated verification ratings
    #[must_use]
    pub fn with_verification_seed(mut self, seed: u64) -> Self {
        self.aggregator = self.aggregator.with_seed(seed);
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<ProjectStore> {
        &self.store
    }

    /// Toggle provider preference for every session of this pipeline
    pub fn set_prefer_primary(&self, prefer_primary: bool) {
        self.chain.set_prefer_primary(prefer_primary);
    }

    /// Start a debounced draft session
    #[must_use]
    pub fn open_draft(&self) -> DraftSession {
        DraftSession::new(Arc::clone(&self.chain), self.config.scheduler)
    }

    /// One-shot suggestions for a draft (no debounce)
    pub async fn suggest(&self, draft: &ProjectDraft) -> SkillSuggestions {
        self.chain.run_suggestions(&draft.suggestion_request()).await
    }

    /// One-shot analysis for a draft (no debounce)
    ///
    /// # Errors
    /// `AnalysisFailed` when every provider failed
    pub async fn analyze(&self, draft: &ProjectDraft) -> Result<AnalysisResult, PipelineError> {
        self.chain.run_analysis(&draft.analysis_request()).await
    }

    /// Persist a new project from a draft and its analysis
    ///
    /// # Errors
    /// - `InvalidDraft` when name, description or target skills are missing
    /// - `AnalysisRequired` when no analysis is available
    pub fn create_project(
        &self,
        draft: &ProjectDraft,
        analysis: Option<&AnalysisResult>,
    ) -> Result<ProjectRecord, PipelineError> {
        validate(draft)?;
        let analysis = analysis.ok_or(PipelineError::AnalysisRequired)?;

        let record = ProjectRecord {
            id: ProjectId::generate(),
            name: draft.name.trim().to_string(),
            description: draft.description.clone(),
            goals: draft.goals.clone().filter(|g| !g.trim().is_empty()),
            target_skills: draft.target_skills.clone(),
            analysis: Some(analysis.clone()),
            plan: build_plan(draft.name.trim(), analysis),
            skill_demonstrations: reconcile::reconcile(&[], &analysis.detected_skills),
            status: ProjectStatus::Active,
            created_at: Utc::now(),
        };

        tracing::info!(
            "project created: {} ({} skill(s))",
            record.id,
            record.skill_demonstrations.len()
        );
        Ok(self.store.insert(record)?)
    }

    /// Run a fresh analysis for a stored project and reconcile its skills
    ///
    /// The new analysis replaces the previous one; skill progress is kept.
    ///
    /// # Errors
    /// `ProjectNotFound`, `AnalysisFailed`, or store failures
    pub async fn reanalyze(&self, project_id: &ProjectId) -> Result<ProjectRecord, PipelineError> {
        let project = self.store.fetch(project_id).await?;
        let analysis = self.chain.run_analysis(&AnalysisRequest::from(&project)).await?;

        let updated = self
            .store
            .update(project_id, move |record| {
                record.skill_demonstrations =
                    reconcile::reconcile(&record.skill_demonstrations, &analysis.detected_skills);
                record.analysis = Some(analysis);
                Ok::<(), PipelineError>(())
            })
            .await?;
        tracing::info!("project reanalyzed: {}", project_id);
        Ok(updated)
    }

    /// Change the status of one skill by hand
    ///
    /// # Errors
    /// `ProjectNotFound`, `SkillNotFound`, `SkillLocked` or `ReservedStatus`
    pub fn set_skill_status(
        &self,
        project_id: &ProjectId,
        skill_id: &SkillId,
        status: SkillStatus,
    ) -> Result<ProjectRecord, PipelineError> {
        self.store.replace::<_, PipelineError>(project_id, |record| {
            record.skill_demonstrations =
                reconcile::set_skill_status(&record.skill_demonstrations, skill_id, status)?;
            Ok(())
        })
    }

    /// Verify every skill of a project against an already stored artifact
    ///
    /// # Errors
    /// `ProjectNotFound` or store failures
    pub async fn verify_evidence(
        &self,
        project_id: &ProjectId,
        evidence_url: &str,
        meta: &EvidenceMeta,
    ) -> Result<VerificationReport, PipelineError> {
        self.aggregator.verify(project_id, evidence_url, meta).await
    }

    /// Store an artifact, then verify every skill against it
    ///
    /// # Errors
    /// `Evidence` when no evidence store is configured or the upload fails,
    /// plus everything `verify_evidence` returns
    pub async fn submit_evidence(
        &self,
        project_id: &ProjectId,
        upload: &EvidenceUpload,
    ) -> Result<VerificationReport, PipelineError> {
        let evidence = self
            .evidence
            .as_ref()
            .ok_or_else(|| PipelineError::Evidence("no evidence store configured".to_string()))?;
        // fail before uploading anything for an unknown project
        self.store.fetch(project_id).await?;

        let url = evidence.put(project_id, upload).await?;
        tracing::info!("evidence stored for project {}: {}", project_id, url);
        self.verify_evidence(project_id, &url, &upload.meta()).await
    }

    /// Every stored project
    ///
    /// # Errors
    /// Store failures
    pub fn projects(&self) -> Result<Vec<ProjectRecord>, PipelineError> {
        Ok(self.store.read_all()?)
    }

    /// One stored project
    ///
    /// # Errors
    /// `ProjectNotFound` or store failures
    pub fn project(&self, project_id: &ProjectId) -> Result<ProjectRecord, PipelineError> {
        Ok(self.store.get(project_id)?)
    }

    /// Skill progress of one project
    ///
    /// # Errors
    /// `ProjectNotFound` or store failures
    pub fn progress(&self, project_id: &ProjectId) -> Result<ProgressSummary, PipelineError> {
        Ok(self.project(project_id)?.progress())
    }
}

impl std::fmt::Debug for SkillReelPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillReelPipeline")
            .field("chain", &self.chain)
            .field("aggregator", &self.aggregator)
            .field("evidence", &self.evidence.is_some())
            .finish_non_exhaustive()
    }
}

fn validate(draft: &ProjectDraft) -> Result<(), PipelineError> {
    if draft.name.trim().is_empty() {
        return Err(PipelineError::InvalidDraft("project name is required".to_string()));
    }
    if draft.description.trim().is_empty() {
        return Err(PipelineError::InvalidDraft("project description is required".to_string()));
    }
    if draft.target_skills.is_empty() {
        return Err(PipelineError::InvalidDraft("at least one target skill is required".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingProvider;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    const DESCRIPTION: &str = "A portfolio website built with React that showcases leadership work";

    struct Uploads(Mutex<Vec<String>>);

    #[async_trait]
    impl EvidenceStore for Uploads {
        async fn put(&self, project_id: &ProjectId, upload: &EvidenceUpload) -> Result<String, PipelineError> {
            let url = format!("mem://{}/{}", project_id, upload.file_name);
            self.0.lock().push(url.clone());
            Ok(url)
        }
    }

    fn pipeline(provider: &Arc<RecordingProvider>) -> SkillReelPipeline {
        let providers = ProviderSet::new().with_primary(Arc::clone(provider) as _);
        SkillReelPipeline::new(
            PipelineConfig::default(),
            &providers,
            Arc::new(ProjectStore::in_memory()),
        )
        .with_verification_seed(1)
    }

    fn draft(skills: &[&str]) -> ProjectDraft {
        ProjectDraft::new("Portfolio", DESCRIPTION).with_skills(skills.iter().copied())
    }

    async fn created(pipeline: &SkillReelPipeline, skills: &[&str]) -> ProjectRecord {
        let draft = draft(skills);
        let analysis = pipeline.analyze(&draft).await.unwrap();
        pipeline.create_project(&draft, Some(&analysis)).unwrap()
    }

    #[tokio::test]
    async fn creation_requires_analysis() {
        let pipeline = pipeline(&RecordingProvider::new());
        let err = pipeline.create_project(&draft(&["React"]), None).unwrap_err();
        assert!(matches!(err, PipelineError::AnalysisRequired));
        assert!(pipeline.projects().unwrap().is_empty());
    }

    #[tokio::test]
    async fn creation_validates_draft() {
        let pipeline = pipeline(&RecordingProvider::new());
        let analysis = pipeline.analyze(&draft(&["React"])).await.unwrap();

        let err = pipeline.create_project(&draft(&[]), Some(&analysis)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDraft(_)));

        let nameless = ProjectDraft::new("  ", DESCRIPTION).with_skills(["React"]);
        let err = pipeline.create_project(&nameless, Some(&analysis)).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDraft(_)));
    }

    #[tokio::test]
    async fn created_project_has_plan_and_planned_skills() {
        let pipeline = pipeline(&RecordingProvider::new());
        let project = created(&pipeline, &["React", "Leadership"]).await;

        assert_eq!(project.skill_demonstrations.len(), 2);
        assert!(project
            .skill_demonstrations
            .iter()
            .all(|s| s.status == SkillStatus::Planned && !s.verified));
        assert_eq!(project.plan.len(), 3 + 2 + 4);
        assert_eq!(project.plan[3], "React Implementation: Show React");
        assert_eq!(pipeline.project(&project.id).unwrap(), project);
    }

    #[tokio::test]
    async fn reanalysis_keeps_progress_and_adds_new_skills() {
        let provider = RecordingProvider::new();
        let pipeline = pipeline(&provider);
        let project = created(&pipeline, &["React"]).await;
        let react = project.skill_demonstrations[0].id().clone();

        pipeline
            .set_skill_status(&project.id, &react, SkillStatus::InProgress)
            .unwrap();
        pipeline
            .store()
            .replace::<_, PipelineError>(&project.id, |p| {
                p.target_skills.push("SQL".into());
                Ok(())
            })
            .unwrap();

        let updated = pipeline.reanalyze(&project.id).await.unwrap();

        assert_eq!(updated.skill_demonstrations.len(), 2);
        assert_eq!(updated.skill_demonstrations[0].id(), &react);
        assert_eq!(updated.skill_demonstrations[0].status, SkillStatus::InProgress);
        assert_eq!(updated.skill_demonstrations[1].status, SkillStatus::Planned);
        assert_eq!(updated.analysis.unwrap().detected_skills.len(), 2);
        assert_eq!(provider.analysis_calls(), 2);
    }

    #[tokio::test]
    async fn failed_reanalysis_leaves_project_untouched() {
        let provider = RecordingProvider::new();
        let pipeline = pipeline(&provider);
        let project = created(&pipeline, &["React"]).await;

        provider.fail(true);
        let err = pipeline.reanalyze(&project.id).await.unwrap_err();

        assert!(err.blocks_progress());
        assert_eq!(pipeline.project(&project.id).unwrap(), project);
    }

    #[tokio::test]
    async fn verified_skill_status_is_locked() {
        let pipeline = pipeline(&RecordingProvider::new());
        let project = created(&pipeline, &["React"]).await;
        let skill = project.skill_demonstrations[0].id().clone();

        pipeline
            .verify_evidence(&project.id, "file:///v.mp4", &EvidenceMeta::default())
            .await
            .unwrap();
        let err = pipeline
            .set_skill_status(&project.id, &skill, SkillStatus::Planned)
            .unwrap_err();

        assert!(matches!(err, PipelineError::SkillLocked(_)));
        assert_eq!(pipeline.progress(&project.id).unwrap().verified, 1);
    }

    #[tokio::test]
    async fn submit_needs_an_evidence_store() {
        let pipeline = pipeline(&RecordingProvider::new());
        let project = created(&pipeline, &["React"]).await;

        let err = pipeline
            .submit_evidence(&project.id, &EvidenceUpload::video("demo.mp4", vec![1, 2, 3]))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Evidence(_)));
    }

    #[tokio::test]
    async fn submit_stores_then_verifies() {
        let uploads = Arc::new(Uploads(Mutex::new(Vec::new())));
        let pipeline = pipeline(&RecordingProvider::new()).with_evidence_store(Arc::clone(&uploads) as _);
        let project = created(&pipeline, &["React", "Leadership"]).await;

        let report = pipeline
            .submit_evidence(&project.id, &EvidenceUpload::video("demo.mp4", vec![1, 2, 3]))
            .await
            .unwrap();

        let url = format!("mem://{}/demo.mp4", project.id);
        assert_eq!(*uploads.0.lock(), vec![url.clone()]);
        assert!(report
            .project
            .skill_demonstrations
            .iter()
            .all(|s| s.verified && s.evidence_url.as_deref() == Some(url.as_str())));
    }

    #[tokio::test]
    async fn submit_for_unknown_project_uploads_nothing() {
        let uploads = Arc::new(Uploads(Mutex::new(Vec::new())));
        let pipeline = pipeline(&RecordingProvider::new()).with_evidence_store(Arc::clone(&uploads) as _);

        let err = pipeline
            .submit_evidence(&ProjectId::from("project_missing"), &EvidenceUpload::video("a.mp4", vec![]))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::ProjectNotFound(_)));
        assert!(uploads.0.lock().is_empty());
    }
}
