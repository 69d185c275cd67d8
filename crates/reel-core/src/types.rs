//! Core types for SkillReel
//!
//! Defines the persisted data model and the provider contracts:
//! - Project records and their skill demonstrations
//! - AI analysis results and skill suggestions
//! - Request/response payloads exchanged with remote providers
//!
//! Everything serializes as camelCase JSON. Provider payloads that use
//! snake_case keys are accepted through serde aliases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Project identifier (`project_<ULID>`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Generate new project ID
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("project_{}", Ulid::new().to_string().to_lowercase()))
    }

    /// Borrow as str
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Skill identifier
///
/// Regenerated by every analysis call, so it is never used to match skills
/// across analyses. It does identify a skill inside one project.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillId(pub String);

impl SkillId {
    /// Generate new skill ID
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("skill_{}", Ulid::new().to_string().to_lowercase()))
    }

    /// Borrow as str
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SkillId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SkillId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Skill category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    /// Engineering and tooling skills
    #[default]
    Technical,
    /// Interpersonal skills
    Soft,
    /// Spoken languages
    Language,
    /// Professional certifications
    Certification,
}

impl SkillCategory {
    /// All categories, in display order
    pub const ALL: [SkillCategory; 4] = [
        SkillCategory::Technical,
        SkillCategory::Soft,
        SkillCategory::Language,
        SkillCategory::Certification,
    ];

    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillCategory::Technical => "technical",
            SkillCategory::Soft => "soft",
            SkillCategory::Language => "language",
            SkillCategory::Certification => "certification",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target proficiency for a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
    Master,
}

/// How a skill is demonstrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DemonstrationMethod {
    Code,
    #[default]
    Video,
    Documentation,
    Presentation,
    LiveDemo,
}

impl DemonstrationMethod {
    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DemonstrationMethod::Code => "code",
            DemonstrationMethod::Video => "video",
            DemonstrationMethod::Documentation => "documentation",
            DemonstrationMethod::Presentation => "presentation",
            DemonstrationMethod::LiveDemo => "live-demo",
        }
    }
}

impl fmt::Display for DemonstrationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Progress of one skill demonstration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkillStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Verified,
}

impl SkillStatus {
    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillStatus::Planned => "planned",
            SkillStatus::InProgress => "in-progress",
            SkillStatus::Completed => "completed",
            SkillStatus::Verified => "verified",
        }
    }
}

impl fmt::Display for SkillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SkillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(SkillStatus::Planned),
            "in-progress" => Ok(SkillStatus::InProgress),
            "completed" => Ok(SkillStatus::Completed),
            "verified" => Ok(SkillStatus::Verified),
            other => Err(format!("unknown skill status: {other}")),
        }
    }
}

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    Archived,
}

/// A skill to demonstrate, as produced by an analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSpec {
    /// Skill ID (not stable across analyses)
    #[serde(default = "SkillId::generate")]
    pub id: SkillId,
    /// Merge identity (case-sensitive)
    pub name: String,
    #[serde(default)]
    pub category: SkillCategory,
    #[serde(default)]
    pub proficiency: Proficiency,
    #[serde(default, alias = "demonstration_method")]
    pub demonstration_method: DemonstrationMethod,
    #[serde(default)]
    pub requirements: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "ai_prompt")]
    pub ai_prompt: Option<String>,
}

impl SkillSpec {
    /// Create spec with default descriptive fields
    #[must_use]
    pub fn new(name: impl Into<String>, category: SkillCategory) -> Self {
        Self {
            id: SkillId::generate(),
            name: name.into(),
            category,
            proficiency: Proficiency::default(),
            demonstration_method: DemonstrationMethod::default(),
            requirements: String::new(),
            ai_prompt: None,
        }
    }

    /// With explicit ID
    #[inline]
    #[must_use]
    pub fn with_id(mut self, id: impl Into<SkillId>) -> Self {
        self.id = id.into();
        self
    }

    /// With demonstration method
    #[inline]
    #[must_use]
    pub fn with_method(mut self, method: DemonstrationMethod) -> Self {
        self.demonstration_method = method;
        self
    }

    /// With proficiency
    #[inline]
    #[must_use]
    pub fn with_proficiency(mut self, proficiency: Proficiency) -> Self {
        self.proficiency = proficiency;
        self
    }

    /// With requirements text
    #[inline]
    #[must_use]
    pub fn with_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.requirements = requirements.into();
        self
    }
}

/// Persisted progress of one skill within a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDemonstration {
    /// Descriptive fields, refreshed by reconciliation
    #[serde(flatten)]
    pub spec: SkillSpec,
    #[serde(default)]
    pub status: SkillStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
    #[serde(default)]
    pub verified: bool,
    /// 1-5 once rated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_feedback: Option<String>,
}

impl SkillDemonstration {
    /// New planned, unverified demonstration
    #[must_use]
    pub fn planned(spec: SkillSpec) -> Self {
        Self {
            spec,
            status: SkillStatus::Planned,
            evidence_url: None,
            verified: false,
            rating: None,
            verification_feedback: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &SkillId {
        &self.spec.id
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Whether a verification pass has confirmed this skill
    #[inline]
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.status == SkillStatus::Verified
    }
}

/// How one skill maps onto a demonstration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillMapping {
    pub skill: String,
    #[serde(default, alias = "demonstration_method")]
    pub demonstration_method: DemonstrationMethod,
    /// 1-5
    #[serde(default = "default_complexity", alias = "complexity_level")]
    pub complexity_level: u8,
    #[serde(default, alias = "verification_criteria")]
    pub verification_criteria: Vec<String>,
}

/// AI-generated project analysis
///
/// Produced wholesale and never partially mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// 1-10
    #[serde(default = "default_score", alias = "clarity_score")]
    pub clarity_score: u8,
    /// 1-10
    #[serde(default = "default_score", alias = "feasibility_score")]
    pub feasibility_score: u8,
    #[serde(default, alias = "identified_risks")]
    pub identified_risks: Vec<String>,
    #[serde(default, alias = "suggested_technologies")]
    pub suggested_technologies: Vec<String>,
    #[serde(default, alias = "detected_skills")]
    pub detected_skills: Vec<SkillSpec>,
    #[serde(default, alias = "skill_mapping")]
    pub skill_mapping: Vec<SkillMapping>,
}

/// Neutral score used when a provider omits one
pub const DEFAULT_SCORE: u8 = 5;

/// Complexity assumed when no mapping exists for a skill
pub const DEFAULT_COMPLEXITY: u8 = 3;

fn default_score() -> u8 {
    DEFAULT_SCORE
}

fn default_complexity() -> u8 {
    DEFAULT_COMPLEXITY
}

impl AnalysisResult {
    /// Detected skill by exact name
    #[must_use]
    pub fn skill(&self, name: &str) -> Option<&SkillSpec> {
        self.detected_skills.iter().find(|s| s.name == name)
    }

    /// Mapping entry by exact skill name
    #[must_use]
    pub fn mapping(&self, name: &str) -> Option<&SkillMapping> {
        self.skill_mapping.iter().find(|m| m.skill == name)
    }

    /// Complexity level for a skill, defaulting to 3
    #[must_use]
    pub fn complexity_of(&self, name: &str) -> u8 {
        self.mapping(name)
            .map_or(DEFAULT_COMPLEXITY, |m| m.complexity_level)
    }
}

/// Per-category skill suggestions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSuggestions {
    #[serde(default)]
    pub technical: Vec<String>,
    #[serde(default)]
    pub soft: Vec<String>,
    #[serde(default)]
    pub language: Vec<String>,
    #[serde(default)]
    pub certification: Vec<String>,
}

impl SkillSuggestions {
    /// Suggestions for one category
    #[must_use]
    pub fn category(&self, category: SkillCategory) -> &[String] {
        match category {
            SkillCategory::Technical => &self.technical,
            SkillCategory::Soft => &self.soft,
            SkillCategory::Language => &self.language,
            SkillCategory::Certification => &self.certification,
        }
    }

    /// Mutable list for one category
    pub fn category_mut(&mut self, category: SkillCategory) -> &mut Vec<String> {
        match category {
            SkillCategory::Technical => &mut self.technical,
            SkillCategory::Soft => &mut self.soft,
            SkillCategory::Language => &mut self.language,
            SkillCategory::Certification => &mut self.certification,
        }
    }

    /// Trim, de-duplicate (first occurrence wins) and cap every category
    #[must_use]
    pub fn normalized(mut self, limit: usize) -> Self {
        for category in SkillCategory::ALL {
            let list = self.category_mut(category);
            let items = std::mem::take(list);
            *list = dedup_preserving_order(items, limit);
        }
        self
    }

    /// Total number of suggestions
    #[must_use]
    pub fn total(&self) -> usize {
        SkillCategory::ALL
            .iter()
            .map(|c| self.category(*c).len())
            .sum()
    }
}

/// Trim entries, drop blanks and duplicates, keep at most `limit`
pub(crate) fn dedup_preserving_order(
    items: impl IntoIterator<Item = String>,
    limit: usize,
) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if out.len() >= limit {
            break;
        }
        let trimmed = item.trim();
        if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}

/// A project and the progress of every skill it demonstrates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
    #[serde(default)]
    pub target_skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    #[serde(default)]
    pub plan: Vec<String>,
    #[serde(default)]
    pub skill_demonstrations: Vec<SkillDemonstration>,
    #[serde(default)]
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

impl ProjectRecord {
    /// Skill demonstration by ID
    #[must_use]
    pub fn skill(&self, id: &SkillId) -> Option<&SkillDemonstration> {
        self.skill_demonstrations.iter().find(|s| s.id() == id)
    }

    /// Summarize skill progress
    #[must_use]
    pub fn progress(&self) -> ProgressSummary {
        let mut summary = ProgressSummary::default();
        let mut rating_sum = 0u32;
        let mut rated = 0u32;
        for skill in &self.skill_demonstrations {
            match skill.status {
                SkillStatus::Planned => summary.planned += 1,
                SkillStatus::InProgress => summary.in_progress += 1,
                SkillStatus::Completed => summary.completed += 1,
                SkillStatus::Verified => summary.verified += 1,
            }
            if let Some(rating) = skill.rating {
                rating_sum += u32::from(rating);
                rated += 1;
            }
        }
        if rated > 0 {
            summary.average_rating = Some(f64::from(rating_sum) / f64::from(rated));
        }
        summary
    }
}

/// Skill counts per status plus average rating
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub planned: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub verified: usize,
    /// Mean over rated skills only
    pub average_rating: Option<f64>,
}

/// Project being described, before it is persisted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub goals: Option<String>,
    pub target_skills: Vec<String>,
}

impl ProjectDraft {
    /// Create new draft
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// With goals
    #[inline]
    #[must_use]
    pub fn with_goals(mut self, goals: impl Into<String>) -> Self {
        self.goals = Some(goals.into());
        self
    }

    /// With target skills (trimmed, de-duplicated)
    #[must_use]
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for skill in skills {
            self.add_skill(skill);
        }
        self
    }

    /// Add a target skill; returns false for blanks and duplicates
    pub fn add_skill(&mut self, skill: impl Into<String>) -> bool {
        let skill = skill.into();
        let trimmed = skill.trim();
        if trimmed.is_empty() || self.target_skills.iter().any(|s| s == trimmed) {
            return false;
        }
        self.target_skills.push(trimmed.to_string());
        true
    }

    /// Remove a target skill
    pub fn remove_skill(&mut self, skill: &str) {
        self.target_skills.retain(|s| s != skill);
    }

    /// Description length in characters
    #[inline]
    #[must_use]
    pub fn description_len(&self) -> usize {
        self.description.chars().count()
    }

    /// Request for skill suggestions
    #[must_use]
    pub fn suggestion_request(&self) -> SuggestionRequest {
        SuggestionRequest {
            project_description: self.description.clone(),
            project_goals: self.goals.clone(),
        }
    }

    /// Request for scope analysis
    #[must_use]
    pub fn analysis_request(&self) -> AnalysisRequest {
        AnalysisRequest {
            project_description: self.description.clone(),
            project_goals: self.goals.clone(),
            target_skills: self.target_skills.clone(),
        }
    }
}

/// Suggestion provider request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub project_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_goals: Option<String>,
}

/// Analysis provider request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub project_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_goals: Option<String>,
    pub target_skills: Vec<String>,
}

impl From<&ProjectRecord> for AnalysisRequest {
    fn from(project: &ProjectRecord) -> Self {
        Self {
            project_description: project.description.clone(),
            project_goals: project.goals.clone(),
            target_skills: project.target_skills.clone(),
        }
    }
}

/// Action tag sent with every verification request
pub const VERIFY_ACTION: &str = "verify-project-evidence";

/// Per-skill verification request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    pub action: String,
    pub project_id: ProjectId,
    pub skill_id: SkillId,
    pub skill_name: String,
    pub demonstration_method: DemonstrationMethod,
    pub evidence_url: String,
    pub evidence_type: String,
}

/// Verification provider response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationVerdict {
    /// 1-5
    pub rating: u8,
    pub feedback: String,
}

/// Metadata about the uploaded evidence artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceMeta {
    /// MIME type, sent as `evidenceType`
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl Default for EvidenceMeta {
    fn default() -> Self {
        Self {
            content_type: "video/mp4".to_string(),
            file_name: None,
            size_bytes: None,
        }
    }
}
