//! Skill reconciliation
//!
//! Pure merges between freshly computed skill data and the persisted
//! skill demonstrations of a project:
//! - `reconcile` folds a detected-skills list into existing records by name
//! - `apply_assessments` / `apply_simulated` fold verification results in
//! - `set_skill_status` applies a user status change
//!
//! None of these touch the store; callers commit the returned list.

use crate::error::PipelineError;
use crate::types::{SkillDemonstration, SkillId, SkillSpec, SkillStatus, VerificationVerdict};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Rating used when no simulated candidates are configured
const FALLBACK_SIMULATED_RATING: u8 = 4;

/// Merge `detected` into `existing`, matching on exact skill name
///
/// - new names become planned, unverified records with a fresh id
/// - known names keep id, status, evidence and verification fields and
///   take the fresh descriptive fields
/// - existing records not referenced by `detected` are appended unchanged
/// - output order follows `detected`; a repeated name is taken once
///
/// Ids in the output are unique; a stored record whose id repeats an
/// earlier one is given a fresh id.
#[must_use]
pub fn reconcile(existing: &[SkillDemonstration], detected: &[SkillSpec]) -> Vec<SkillDemonstration> {
    let mut by_name: HashMap<&str, usize> = HashMap::with_capacity(existing.len());
    for (index, skill) in existing.iter().enumerate() {
        by_name.entry(skill.name()).or_insert(index);
    }

    let mut consumed = vec![false; existing.len()];
    let mut emitted: HashSet<&str> = HashSet::with_capacity(detected.len());
    let mut merged = Vec::with_capacity(existing.len().max(detected.len()));

    for spec in detected {
        if !emitted.insert(spec.name.as_str()) {
            continue;
        }
        match by_name.get(spec.name.as_str()) {
            Some(&index) => {
                consumed[index] = true;
                merged.push(refresh(&existing[index], spec));
            }
            None => {
                let spec = spec.clone().with_id(SkillId::generate());
                merged.push(SkillDemonstration::planned(spec));
            }
        }
    }

    merged.extend(
        existing
            .iter()
            .zip(consumed)
            .filter(|(_, used)| !used)
            .map(|(skill, _)| skill.clone()),
    );

    let mut seen: HashSet<SkillId> = HashSet::with_capacity(merged.len());
    for skill in &mut merged {
        if !seen.insert(skill.id().clone()) {
            tracing::debug!(skill = %skill.name(), id = %skill.id(), "reassigning duplicate skill id");
            skill.spec.id = SkillId::generate();
            seen.insert(skill.id().clone());
        }
    }
    merged
}

fn refresh(current: &SkillDemonstration, spec: &SkillSpec) -> SkillDemonstration {
    let mut updated = current.clone();
    updated.spec.category = spec.category;
    updated.spec.proficiency = spec.proficiency;
    updated.spec.demonstration_method = spec.demonstration_method;
    updated.spec.requirements.clone_from(&spec.requirements);
    updated.spec.ai_prompt.clone_from(&spec.ai_prompt);
    updated
}

/// Fold real verification verdicts into the skill list
///
/// `verdicts` is aligned with `skills` by position: entry `i` is the
/// outcome for `skills[i]`. Skills with a verdict become verified. Skills
/// without one are marked completed against the evidence, except skills an
/// earlier pass already verified, which keep that verification.
#[must_use]
pub fn apply_assessments(
    skills: &[SkillDemonstration],
    evidence_url: &str,
    verdicts: &[Option<VerificationVerdict>],
) -> Vec<SkillDemonstration> {
    skills
        .iter()
        .enumerate()
        .map(|(index, skill)| {
            let mut skill = skill.clone();
            if let Some(verdict) = verdicts.get(index).and_then(Option::as_ref) {
                skill.status = SkillStatus::Verified;
                skill.verified = true;
                skill.rating = Some(verdict.rating.clamp(1, 5));
                skill.verification_feedback = Some(verdict.feedback.clone());
                skill.evidence_url = Some(evidence_url.to_string());
            } else if !skill.is_verified() {
                skill.status = SkillStatus::Completed;
                skill.verified = false;
                skill.evidence_url = Some(evidence_url.to_string());
            }
            skill
        })
        .collect()
}

/// Feedback attached by simulated verification
#[must_use]
pub fn simulated_feedback(skill_name: &str) -> String {
    format!("Demonstrated {skill_name} skills in project showcase video")
}

/// Mark every not-yet-verified skill verified with a drawn rating
///
/// Used when no verification call succeeded. Skills already verified by a
/// real pass are left as they were.
pub fn apply_simulated<R>(
    skills: &[SkillDemonstration],
    evidence_url: &str,
    ratings: &[u8],
    rng: &mut R,
) -> Vec<SkillDemonstration>
where
    R: Rng + ?Sized,
{
    skills
        .iter()
        .map(|skill| {
            if skill.is_verified() {
                return skill.clone();
            }
            let rating = ratings
                .choose(rng)
                .copied()
                .unwrap_or(FALLBACK_SIMULATED_RATING)
                .clamp(1, 5);
            let mut skill = skill.clone();
            skill.status = SkillStatus::Verified;
            skill.verified = true;
            skill.rating = Some(rating);
            skill.verification_feedback = Some(simulated_feedback(skill.name()));
            skill.evidence_url = Some(evidence_url.to_string());
            skill
        })
        .collect()
}

/// Apply a user status change
///
/// # Errors
/// - `SkillNotFound` when `id` is not in `skills`
/// - `SkillLocked` when the skill is already verified
/// - `ReservedStatus` when asked for `verified`
pub fn set_skill_status(
    skills: &[SkillDemonstration],
    id: &SkillId,
    status: SkillStatus,
) -> Result<Vec<SkillDemonstration>, PipelineError> {
    if status == SkillStatus::Verified {
        return Err(PipelineError::ReservedStatus(status));
    }
    let target = skills
        .iter()
        .position(|s| s.id() == id)
        .ok_or_else(|| PipelineError::SkillNotFound(id.clone()))?;
    if skills[target].is_verified() {
        return Err(PipelineError::SkillLocked(id.clone()));
    }

    let mut updated = skills.to_vec();
    updated[target].status = status;
    Ok(updated)
}
