//! Functional tests for evidence submission and verification.
//!
//! One uploaded artifact is checked against every skill of a project:
//! - all checks failing falls back to simulated verification
//! - a partial success verifies only the skills that passed
//! - earlier verification survives later failures and re-analysis
//! - every outcome is committed as one project replace

use pretty_assertions::assert_eq;
use reel_core::prelude::*;
use reel_core::{EvidenceMeta, SkillId, SkillStatus, VerificationMode, VERIFY_ACTION};
use reel_test_utils::{
    analysis_for, sample_draft, sample_project, MemoryEvidenceStore, ScriptedAnalysisProvider,
    ScriptedVerifier,
};
use std::collections::HashSet;
use std::sync::Arc;

const SKILLS: [&str; 3] = ["React", "Leadership", "SQL"];

/// Helper: pipeline with a scripted analysis provider and `verifier`, plus a
/// project created for `SKILLS`.
async fn project_with(
    verifier: ScriptedVerifier,
) -> (SkillReelPipeline, Arc<ScriptedVerifier>, ProjectRecord) {
    let verifier = Arc::new(verifier);
    let providers = ProviderSet::new()
        .with_primary(Arc::new(ScriptedAnalysisProvider::new("model")) as _)
        .with_verifier(Arc::clone(&verifier) as _);
    let pipeline = SkillReelPipeline::new(
        PipelineConfig::default(),
        &providers,
        Arc::new(ProjectStore::in_memory()),
    )
    .with_verification_seed(2024)
    .with_evidence_store(Arc::new(MemoryEvidenceStore::new()));

    let draft = sample_draft(&SKILLS);
    let analysis = pipeline.analyze(&draft).await.unwrap();
    let project = pipeline.create_project(&draft, Some(&analysis)).unwrap();
    (pipeline, verifier, project)
}

/// Tenet: when every verification call fails, each skill is verified by
/// simulation with a rating drawn from {3, 4, 5}.
#[tokio::test]
async fn all_failures_fall_back_to_simulation() {
    let (pipeline, verifier, project) = project_with(ScriptedVerifier::new()).await;

    let report = pipeline
        .verify_evidence(&project.id, "https://cdn.example/v.mp4", &EvidenceMeta::default())
        .await
        .unwrap();

    assert_eq!(verifier.requests().len(), SKILLS.len());
    assert_eq!(report.mode, VerificationMode::Simulated);
    for skill in &report.project.skill_demonstrations {
        assert!(skill.verified);
        assert_eq!(skill.status, SkillStatus::Verified);
        assert!(matches!(skill.rating, Some(3..=5)));
        assert_eq!(
            skill.verification_feedback.as_deref(),
            Some(format!("Demonstrated {} skills in project showcase video", skill.name()).as_str())
        );
    }
}

/// Tenet: exactly one success out of N leaves one verified skill and N-1
/// completed skills, all pointing at the same evidence URL.
#[tokio::test]
async fn single_success_out_of_three() {
    let (pipeline, _, project) = project_with(ScriptedVerifier::new().rating("Leadership", 4)).await;

    let report = pipeline
        .verify_evidence(&project.id, "https://cdn.example/v.mp4", &EvidenceMeta::default())
        .await
        .unwrap();

    let stored = pipeline.project(&project.id).unwrap();
    assert_eq!(stored, report.project);

    let verified: Vec<_> = stored.skill_demonstrations.iter().filter(|s| s.verified).collect();
    assert_eq!(verified.len(), 1);
    assert_eq!(verified[0].name(), "Leadership");
    assert_eq!(verified[0].rating, Some(4));
    assert_eq!(
        stored
            .skill_demonstrations
            .iter()
            .filter(|s| s.status == SkillStatus::Completed)
            .count(),
        2
    );
    assert!(stored
        .skill_demonstrations
        .iter()
        .all(|s| s.evidence_url.as_deref() == Some("https://cdn.example/v.mp4")));

    let partial = report.partial_failure().expect("partial failure reported");
    assert!(matches!(
        partial,
        PipelineError::PartialVerificationFailure { failed: 2, total: 3 }
    ));
}

/// Tenet: each request carries the project, the skill, the video method and
/// the evidence type.
#[tokio::test]
async fn requests_describe_skill_and_evidence() {
    let (pipeline, verifier, project) = project_with(ScriptedVerifier::new()).await;
    let meta = EvidenceMeta {
        content_type: "video/quicktime".into(),
        ..EvidenceMeta::default()
    };

    pipeline
        .verify_evidence(&project.id, "https://cdn.example/v.mov", &meta)
        .await
        .unwrap();

    let mut names: Vec<_> = verifier.requests().into_iter().map(|r| {
        assert_eq!(r.action, VERIFY_ACTION);
        assert_eq!(r.project_id, project.id);
        assert_eq!(r.demonstration_method.to_string(), "video");
        assert_eq!(r.evidence_url, "https://cdn.example/v.mov");
        assert_eq!(r.evidence_type, "video/quicktime");
        r.skill_name
    })
    .collect();
    names.sort();
    assert_eq!(names, vec!["Leadership", "React", "SQL"]);
}

/// Tenet: a skill verified by an earlier pass keeps its verification when a
/// later pass fails for it, and re-analysis does not regress it either.
#[tokio::test]
async fn verification_is_never_regressed() {
    let (pipeline, verifier, project) = project_with(ScriptedVerifier::new().rating("React", 5)).await;
    pipeline
        .verify_evidence(&project.id, "https://cdn.example/first.mp4", &EvidenceMeta::default())
        .await
        .unwrap();

    // second pass: React fails now, SQL passes
    verifier.forget("React");
    verifier.set_rating("SQL", 3);
    let again = pipeline
        .verify_evidence(&project.id, "https://cdn.example/second.mp4", &EvidenceMeta::default())
        .await
        .unwrap();
    let react = again
        .project
        .skill_demonstrations
        .iter()
        .find(|s| s.name() == "React")
        .unwrap();
    assert_eq!(react.status, SkillStatus::Verified);
    assert_eq!(react.rating, Some(5));
    assert_eq!(react.evidence_url.as_deref(), Some("https://cdn.example/first.mp4"));

    let reanalyzed = pipeline.reanalyze(&project.id).await.unwrap();
    let react_after = reanalyzed
        .skill_demonstrations
        .iter()
        .find(|s| s.name() == "React")
        .unwrap();
    assert_eq!(react_after, react);
}

/// Tenet: submitted evidence is stored first and its URL is what every skill
/// is verified against.
#[tokio::test]
async fn submitted_evidence_is_stored_then_verified() {
    let (pipeline, verifier, project) = project_with(ScriptedVerifier::new().rating("SQL", 5)).await;

    let report = pipeline
        .submit_evidence(&project.id, &EvidenceUpload::video("showcase.mp4", vec![0; 64]))
        .await
        .unwrap();

    let url = format!("memory://{}/1-showcase.mp4", project.id);
    assert!(verifier.requests().iter().all(|r| r.evidence_url == url));
    assert!(report
        .project
        .skill_demonstrations
        .iter()
        .all(|s| s.evidence_url.as_deref() == Some(url.as_str())));
}

/// Tenet: verified skills can no longer be moved back by hand.
#[tokio::test]
async fn verified_skills_are_locked() {
    let (pipeline, _, project) = project_with(ScriptedVerifier::new().rating("React", 4)).await;
    pipeline
        .verify_evidence(&project.id, "https://cdn.example/v.mp4", &EvidenceMeta::default())
        .await
        .unwrap();

    let stored = pipeline.project(&project.id).unwrap();
    let react = stored.skill_demonstrations.iter().find(|s| s.name() == "React").unwrap();
    let sql = stored.skill_demonstrations.iter().find(|s| s.name() == "SQL").unwrap();

    let error = pipeline
        .set_skill_status(&project.id, react.id(), SkillStatus::InProgress)
        .unwrap_err();
    assert!(matches!(error, PipelineError::SkillLocked(_)));

    let updated = pipeline
        .set_skill_status(&project.id, sql.id(), SkillStatus::InProgress)
        .unwrap();
    assert_eq!(
        updated.skill(sql.id()).map(|s| s.status),
        Some(SkillStatus::InProgress)
    );
}

/// Helper: analysis whose skills carry positional ids `skill_1`, `skill_2`, ...
/// the way the function endpoint numbers them.
fn numbered_analysis(names: &[&str]) -> AnalysisResult {
    let targets: Vec<String> = names.iter().map(ToString::to_string).collect();
    let mut analysis = analysis_for(&targets);
    for (index, skill) in analysis.detected_skills.iter_mut().enumerate() {
        skill.id = SkillId::from(format!("skill_{}", index + 1));
    }
    analysis
}

/// Tenet: provider-numbered ids never make two skills share an identity;
/// each verdict and each status edit reaches one skill only.
#[tokio::test]
async fn reanalysis_with_reused_provider_ids_keeps_skills_apart() {
    let analyzer = Arc::new(
        ScriptedAnalysisProvider::new("functions").with_analysis(numbered_analysis(&["React", "Docker"])),
    );
    let verifier = Arc::new(ScriptedVerifier::new().rating("Git", 5));
    let providers = ProviderSet::new()
        .with_primary(Arc::clone(&analyzer) as _)
        .with_verifier(Arc::clone(&verifier) as _);
    let pipeline = SkillReelPipeline::new(
        PipelineConfig::default(),
        &providers,
        Arc::new(ProjectStore::in_memory()),
    );

    let draft = sample_draft(&["React", "Docker"]);
    let analysis = pipeline.analyze(&draft).await.unwrap();
    let project = pipeline.create_project(&draft, Some(&analysis)).unwrap();

    analyzer.set_analysis(numbered_analysis(&["React", "Git"]));
    let reanalyzed = pipeline.reanalyze(&project.id).await.unwrap();

    let names: Vec<_> = reanalyzed.skill_demonstrations.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["React", "Git", "Docker"]);
    let ids: HashSet<_> = reanalyzed.skill_demonstrations.iter().map(|s| s.id().clone()).collect();
    assert_eq!(ids.len(), 3);

    let report = pipeline
        .verify_evidence(&project.id, "https://cdn.example/v.mp4", &EvidenceMeta::default())
        .await
        .unwrap();
    let verified: Vec<_> = report
        .project
        .skill_demonstrations
        .iter()
        .filter(|s| s.verified)
        .map(|s| s.name())
        .collect();
    assert_eq!(verified, vec!["Git"]);
    let docker = report
        .project
        .skill_demonstrations
        .iter()
        .find(|s| s.name() == "Docker")
        .unwrap();
    assert_eq!(docker.status, SkillStatus::Completed);
    assert_eq!(docker.rating, None);
    assert_eq!(docker.verification_feedback, None);

    let updated = pipeline
        .set_skill_status(&project.id, docker.id(), SkillStatus::InProgress)
        .unwrap();
    let statuses: Vec<_> = updated.skill_demonstrations.iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![SkillStatus::Completed, SkillStatus::Verified, SkillStatus::InProgress]
    );
}

/// Tenet: a failed upload stops the pass before any skill is checked and
/// leaves the stored project untouched.
#[tokio::test]
async fn failed_upload_verifies_nothing() {
    let verifier = Arc::new(ScriptedVerifier::new().rating("React", 5));
    let providers = ProviderSet::new().with_verifier(Arc::clone(&verifier) as _);
    let store = Arc::new(ProjectStore::in_memory());
    let pipeline = SkillReelPipeline::new(PipelineConfig::default(), &providers, Arc::clone(&store))
        .with_evidence_store(Arc::new(MemoryEvidenceStore::new().failing()));

    let project = store.insert(sample_project(&["React", "SQL"])).unwrap();
    let error = pipeline
        .submit_evidence(&project.id, &EvidenceUpload::video("showcase.mp4", vec![1; 8]))
        .await
        .unwrap_err();

    assert!(matches!(error, PipelineError::Evidence(_)));
    assert!(verifier.requests().is_empty());
    assert_eq!(pipeline.project(&project.id).unwrap(), project);
}
