//! Evidence verification aggregator
//!
//! Fans one evidence artifact out to a verification call per skill, waits
//! for every call, and commits the merged outcome as one project replace:
//! - some calls succeed: verified / completed per skill
//! - no call succeeds: simulated verification with a drawn rating
//!
//! Individual failures are logged and never abort the pass.

use crate::config::VerificationConfig;
use crate::error::{PipelineError, ProviderError};
use crate::provider::VerificationProvider;
use crate::reconcile;
use crate::store::ProjectStore;
use crate::types::{
    DemonstrationMethod, EvidenceMeta, ProjectId, ProjectRecord, SkillDemonstration, SkillId,
    VerificationRequest, VerificationVerdict, VERIFY_ACTION,
};
use futures::future::join_all;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::sync::Arc;

/// Name reported when no verifier is configured
const NO_VERIFIER: &str = "verifier";

/// How the committed outcome was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationMode {
    /// At least one real verdict was received
    Assessed,
    /// Every call failed; ratings were drawn locally
    Simulated,
}

/// Outcome of the verification call for one skill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillCheck {
    pub skill_id: SkillId,
    pub skill_name: String,
    pub outcome: Result<VerificationVerdict, ProviderError>,
}

impl SkillCheck {
    #[inline]
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Result of a verification pass
#[derive(Debug, Clone)]
pub struct VerificationReport {
    /// Project as committed
    pub project: ProjectRecord,
    /// One entry per skill, in project order
    pub checks: Vec<SkillCheck>,
    pub mode: VerificationMode,
}

impl VerificationReport {
    /// Number of skill checks that failed
    #[must_use]
    pub fn failed(&self) -> usize {
        self.checks.iter().filter(|c| !c.succeeded()).count()
    }

    /// Partial failure of an assessed pass, if any
    ///
    /// Informational only: the pass already committed.
    #[must_use]
    pub fn partial_failure(&self) -> Option<PipelineError> {
        let failed = self.failed();
        (self.mode == VerificationMode::Assessed && failed > 0).then(|| {
            PipelineError::PartialVerificationFailure {
                failed,
                total: self.checks.len(),
            }
        })
    }
}

/// Per-skill fan-out over the verification provider
pub struct VerificationAggregator {
    verifier: Option<Arc<dyn VerificationProvider>>,
    store: Arc<ProjectStore>,
    ratings: Vec<u8>,
    rng: Arc<Mutex<StdRng>>,
}

impl VerificationAggregator {
    /// Create aggregator; simulated ratings come from `config`
    #[must_use]
    pub fn new(
        verifier: Option<Arc<dyn VerificationProvider>>,
        store: Arc<ProjectStore>,
        config: &VerificationConfig,
    ) -> Self {
        Self {
            verifier,
            store,
            ratings: config.simulated_ratings.clone(),
            rng: Arc::new(Mutex::new(StdRng::from_os_rng())),
        }
    }

    /// With deterministic simulated ratings
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock() = StdRng::seed_from_u64(seed);
        self
    }

    /// Verify every skill of `project_id` against one evidence artifact
    ///
    /// # Errors
    /// `ProjectNotFound` or store failures. Failed skill checks are
    /// reported in the returned report instead.
    pub async fn verify(
        &self,
        project_id: &ProjectId,
        evidence_url: &str,
        meta: &EvidenceMeta,
    ) -> Result<VerificationReport, PipelineError> {
        let project = self.store.fetch(project_id).await?;
        let requests: Vec<VerificationRequest> = project
            .skill_demonstrations
            .iter()
            .map(|skill| VerificationRequest {
                action: VERIFY_ACTION.to_string(),
                project_id: project.id.clone(),
                skill_id: skill.id().clone(),
                skill_name: skill.name().to_string(),
                demonstration_method: DemonstrationMethod::Video,
                evidence_url: evidence_url.to_string(),
                evidence_type: meta.content_type.clone(),
            })
            .collect();

        tracing::info!("verifying {} skill(s) for project {}", requests.len(), project_id);
        let checks = self.run_checks(&requests).await;

        for check in &checks {
            if let Err(e) = &check.outcome {
                tracing::warn!(skill = %check.skill_name, error = %e, "skill verification failed");
            }
        }

        let mode = if checks.iter().any(SkillCheck::succeeded) {
            VerificationMode::Assessed
        } else {
            VerificationMode::Simulated
        };

        let url = evidence_url.to_string();
        let ratings = self.ratings.clone();
        let rng = Arc::clone(&self.rng);
        let checked = checks.clone();
        let project = self
            .store
            .update(project_id, move |record| {
                record.skill_demonstrations = match mode {
                    VerificationMode::Assessed => {
                        let verdicts = align_verdicts(&record.skill_demonstrations, &checked);
                        reconcile::apply_assessments(&record.skill_demonstrations, &url, &verdicts)
                    }
                    VerificationMode::Simulated => reconcile::apply_simulated(
                        &record.skill_demonstrations,
                        &url,
                        &ratings,
                        &mut *rng.lock(),
                    ),
                };
                Ok::<(), PipelineError>(())
            })
            .await?;

        let report = VerificationReport {
            project,
            checks,
            mode,
        };
        match report.partial_failure() {
            Some(partial) => tracing::warn!("{}", partial),
            None if mode == VerificationMode::Simulated => {
                tracing::warn!("no verification call succeeded, committed simulated verification");
            }
            None => tracing::info!("verification complete for project {}", project_id),
        }
        Ok(report)
    }

    async fn run_checks(&self, requests: &[VerificationRequest]) -> Vec<SkillCheck> {
        let Some(verifier) = &self.verifier else {
            return requests
                .iter()
                .map(|r| SkillCheck {
                    skill_id: r.skill_id.clone(),
                    skill_name: r.skill_name.clone(),
                    outcome: Err(ProviderError::unavailable(NO_VERIFIER)),
                })
                .collect();
        };

        join_all(requests.iter().map(|request| async move {
            SkillCheck {
                skill_id: request.skill_id.clone(),
                skill_name: request.skill_name.clone(),
                outcome: verifier.verify_evidence(request).await,
            }
        }))
        .await
    }
}

/// Verdicts by position in `skills`
///
/// `checks` were issued against a snapshot of the same list; a verdict only
/// applies when the skill at its position still carries the checked id.
fn align_verdicts(skills: &[SkillDemonstration], checks: &[SkillCheck]) -> Vec<Option<VerificationVerdict>> {
    skills
        .iter()
        .enumerate()
        .map(|(index, skill)| {
            checks
                .get(index)
                .filter(|check| check.skill_id == *skill.id())
                .and_then(|check| check.outcome.as_ref().ok().cloned())
        })
        .collect()
}

impl fmt::Debug for VerificationAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationAggregator")
            .field("verifier", &self.verifier.as_ref().map(|v| v.name().to_string()))
            .field("ratings", &self.ratings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProjectStatus, SkillCategory, SkillSpec, SkillStatus};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    /// Rates skills listed in `ratings`, fails the rest
    struct Verifier {
        ratings: HashMap<&'static str, u8>,
        seen: Mutex<Vec<VerificationRequest>>,
    }

    impl Verifier {
        fn rating(pairs: &[(&'static str, u8)]) -> Arc<Self> {
            Arc::new(Self {
                ratings: pairs.iter().copied().collect(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl VerificationProvider for Verifier {
        fn name(&self) -> &str {
            "fake-verifier"
        }

        async fn verify_evidence(
            &self,
            request: &VerificationRequest,
        ) -> Result<VerificationVerdict, ProviderError> {
            self.seen.lock().push(request.clone());
            tokio::time::sleep(Duration::from_secs(1)).await;
            match self.ratings.get(request.skill_name.as_str()) {
                Some(&rating) => Ok(VerificationVerdict {
                    rating,
                    feedback: format!("{} verified", request.skill_name),
                }),
                None => Err(ProviderError::call_failed("fake-verifier", "503")),
            }
        }
    }

    fn store_with(skills: &[&str]) -> (Arc<ProjectStore>, ProjectId) {
        let store = Arc::new(ProjectStore::in_memory());
        let record = ProjectRecord {
            id: ProjectId::generate(),
            name: "Portfolio".into(),
            description: "A portfolio site".into(),
            goals: None,
            target_skills: skills.iter().map(ToString::to_string).collect(),
            analysis: None,
            plan: vec![],
            skill_demonstrations: skills
                .iter()
                .map(|name| SkillDemonstration::planned(SkillSpec::new(*name, SkillCategory::Technical)))
                .collect(),
            status: ProjectStatus::Active,
            created_at: Utc::now(),
        };
        let id = record.id.clone();
        store.insert(record).unwrap();
        (store, id)
    }

    fn aggregator(
        verifier: Option<Arc<Verifier>>,
        store: &Arc<ProjectStore>,
    ) -> VerificationAggregator {
        VerificationAggregator::new(
            verifier.map(|v| v as Arc<dyn VerificationProvider>),
            Arc::clone(store),
            &VerificationConfig::default(),
        )
        .with_seed(42)
    }

    #[tokio::test(start_paused = true)]
    async fn all_checks_failing_simulates_verification() {
        let (store, id) = store_with(&["React", "Leadership", "SQL"]);
        let report = aggregator(Some(Verifier::rating(&[])), &store)
            .verify(&id, "file:///v.mp4", &EvidenceMeta::default())
            .await
            .unwrap();

        assert_eq!(report.mode, VerificationMode::Simulated);
        assert!(report.partial_failure().is_none());
        for skill in &report.project.skill_demonstrations {
            assert!(skill.verified);
            assert_eq!(skill.status, SkillStatus::Verified);
            assert!(matches!(skill.rating, Some(3..=5)));
            assert_eq!(skill.evidence_url.as_deref(), Some("file:///v.mp4"));
        }
        assert_eq!(store.get(&id).unwrap(), report.project);
    }

    #[tokio::test(start_paused = true)]
    async fn one_success_marks_the_rest_completed() {
        let (store, id) = store_with(&["React", "Leadership", "SQL"]);
        let report = aggregator(Some(Verifier::rating(&[("Leadership", 5)])), &store)
            .verify(&id, "file:///v.mp4", &EvidenceMeta::default())
            .await
            .unwrap();

        assert_eq!(report.mode, VerificationMode::Assessed);
        let statuses: Vec<_> = report.project.skill_demonstrations.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![SkillStatus::Completed, SkillStatus::Verified, SkillStatus::Completed]
        );
        assert_eq!(report.project.skill_demonstrations[1].rating, Some(5));
        assert!(report
            .project
            .skill_demonstrations
            .iter()
            .all(|s| s.evidence_url.as_deref() == Some("file:///v.mp4")));
        assert!(matches!(
            report.partial_failure(),
            Some(PipelineError::PartialVerificationFailure { failed: 2, total: 3 })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn shared_ids_do_not_share_verdicts() {
        let (store, id) = store_with(&["React", "Git", "Docker"]);
        store
            .replace(&id, |record| {
                let shared = record.skill_demonstrations[1].id().clone();
                record.skill_demonstrations[2].spec.id = shared;
                Ok::<(), PipelineError>(())
            })
            .unwrap();

        let report = aggregator(Some(Verifier::rating(&[("Git", 5)])), &store)
            .verify(&id, "file:///v.mp4", &EvidenceMeta::default())
            .await
            .unwrap();

        let skills = &report.project.skill_demonstrations;
        assert_eq!(skills.iter().filter(|s| s.verified).count(), 1);
        assert_eq!(skills[1].rating, Some(5));
        assert_eq!(skills[2].status, SkillStatus::Completed);
        assert_eq!(skills[2].rating, None);
        assert_eq!(skills[2].verification_feedback, None);
    }

    #[tokio::test(start_paused = true)]
    async fn calls_are_issued_concurrently_with_expected_payload() {
        let (store, id) = store_with(&["React", "Leadership", "SQL"]);
        let verifier = Verifier::rating(&[("React", 4), ("Leadership", 4), ("SQL", 3)]);
        let meta = EvidenceMeta {
            content_type: "video/webm".into(),
            ..EvidenceMeta::default()
        };

        let started = tokio::time::Instant::now();
        aggregator(Some(Arc::clone(&verifier)), &store)
            .verify(&id, "file:///v.webm", &meta)
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));

        let seen = verifier.seen.lock();
        assert_eq!(seen.len(), 3);
        for request in seen.iter() {
            assert_eq!(request.action, VERIFY_ACTION);
            assert_eq!(request.project_id, id);
            assert_eq!(request.demonstration_method, DemonstrationMethod::Video);
            assert_eq!(request.evidence_type, "video/webm");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn missing_verifier_simulates() {
        let (store, id) = store_with(&["React"]);
        let report = aggregator(None, &store)
            .verify(&id, "file:///v.mp4", &EvidenceMeta::default())
            .await
            .unwrap();

        assert_eq!(report.mode, VerificationMode::Simulated);
        assert_eq!(report.failed(), 1);
        assert!(report.project.skill_demonstrations[0].verified);
    }

    #[tokio::test(start_paused = true)]
    async fn seeded_simulation_is_deterministic() {
        let ratings = |seed: u64| async move {
            let (store, id) = store_with(&["A", "B", "C", "D", "E", "F"]);
            let aggregator = VerificationAggregator::new(None, Arc::clone(&store), &VerificationConfig::default())
                .with_seed(seed);
            aggregator
                .verify(&id, "file:///v.mp4", &EvidenceMeta::default())
                .await
                .unwrap()
                .project
                .skill_demonstrations
                .iter()
                .map(|s| s.rating)
                .collect::<Vec<_>>()
        };

        assert_eq!(ratings(9).await, ratings(9).await);
    }

    #[tokio::test]
    async fn unknown_project_is_an_error() {
        let store = Arc::new(ProjectStore::in_memory());
        let err = aggregator(None, &store)
            .verify(&ProjectId::from("project_missing"), "file:///v.mp4", &EvidenceMeta::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ProjectNotFound(_)));
    }
}
