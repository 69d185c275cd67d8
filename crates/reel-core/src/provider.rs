//! Analysis provider chain
//!
//! Ordered fallback over two interchangeable remote backends:
//! - `primary` (direct model invocation) and `secondary` (server-side function)
//! - a togglable preference decides which one is tried first
//! - suggestions degrade to the local keyword heuristic when both fail
//! - analysis surfaces `AnalysisFailed` listing every attempt
//! - every invocation carries a sequence number; overtaken results resolve as
//!   `Resolution::Superseded`

use crate::error::{PipelineError, ProviderError};
use crate::heuristic;
use crate::types::{
    dedup_preserving_order, AnalysisRequest, AnalysisResult, SkillSuggestions,
    SuggestionRequest, VerificationRequest, VerificationVerdict,
};
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Backend able to suggest skills and analyze project scope
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    async fn suggest_skills(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SkillSuggestions, ProviderError>;

    async fn analyze_scope(&self, request: &AnalysisRequest)
        -> Result<AnalysisResult, ProviderError>;
}

/// Backend rating one skill against an evidence artifact
#[async_trait]
pub trait VerificationProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn verify_evidence(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationVerdict, ProviderError>;
}

/// Provider handles injected at construction
#[derive(Clone, Default)]
pub struct ProviderSet {
    pub primary: Option<Arc<dyn AnalysisProvider>>,
    pub secondary: Option<Arc<dyn AnalysisProvider>>,
    pub verifier: Option<Arc<dyn VerificationProvider>>,
}

impl ProviderSet {
    /// Empty set (heuristic and simulation only)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_primary(mut self, provider: Arc<dyn AnalysisProvider>) -> Self {
        self.primary = Some(provider);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_secondary(mut self, provider: Arc<dyn AnalysisProvider>) -> Self {
        self.secondary = Some(provider);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_verifier(mut self, provider: Arc<dyn VerificationProvider>) -> Self {
        self.verifier = Some(provider);
        self
    }
}

impl fmt::Debug for ProviderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSet")
            .field("primary", &self.primary.as_ref().map(|p| p.name().to_string()))
            .field("secondary", &self.secondary.as_ref().map(|p| p.name().to_string()))
            .field("verifier", &self.verifier.as_ref().map(|p| p.name().to_string()))
            .finish()
    }
}

/// Slot of a provider in the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderRole {
    Primary,
    Secondary,
}

impl ProviderRole {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderRole::Primary => "primary",
            ProviderRole::Secondary => "secondary",
        }
    }
}

impl fmt::Display for ProviderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a sequenced invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// No newer invocation of the same operation started meanwhile
    Current(T),
    /// A newer invocation started; the value was discarded
    Superseded { sequence: u64, latest: u64 },
}

impl<T> Resolution<T> {
    #[inline]
    #[must_use]
    pub fn is_current(&self) -> bool {
        matches!(self, Resolution::Current(_))
    }

    /// Value if still current
    #[inline]
    pub fn into_current(self) -> Option<T> {
        match self {
            Resolution::Current(value) => Some(value),
            Resolution::Superseded { .. } => None,
        }
    }
}

/// Monotonic per-operation invocation counter
#[derive(Debug, Default)]
struct Sequencer(AtomicU64);

impl Sequencer {
    fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn latest(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    fn resolve<T>(&self, sequence: u64, value: T) -> Resolution<T> {
        let latest = self.latest();
        if latest == sequence {
            Resolution::Current(value)
        } else {
            Resolution::Superseded { sequence, latest }
        }
    }
}

/// Primary/secondary fallback chain with staleness tracking
pub struct ProviderChain {
    primary: Option<Arc<dyn AnalysisProvider>>,
    secondary: Option<Arc<dyn AnalysisProvider>>,
    prefer_primary: AtomicBool,
    suggestion_limit: usize,
    suggestions: Sequencer,
    analyses: Sequencer,
}

/// Per-category cap on suggestions
pub const DEFAULT_SUGGESTION_LIMIT: usize = 12;

impl ProviderChain {
    /// Create chain from the analysis slots of `providers`
    #[must_use]
    pub fn new(providers: &ProviderSet) -> Self {
        Self {
            primary: providers.primary.clone(),
            secondary: providers.secondary.clone(),
            prefer_primary: AtomicBool::new(true),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            suggestions: Sequencer::default(),
            analyses: Sequencer::default(),
        }
    }

    /// With initial preference
    #[inline]
    #[must_use]
    pub fn with_prefer_primary(self, prefer_primary: bool) -> Self {
        self.prefer_primary.store(prefer_primary, Ordering::SeqCst);
        self
    }

    /// With per-category suggestion cap
    #[inline]
    #[must_use]
    pub fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit;
        self
    }

    /// Toggle which provider is tried first
    pub fn set_prefer_primary(&self, prefer_primary: bool) {
        tracing::info!("provider preference: {}", if prefer_primary { "primary" } else { "secondary" });
        self.prefer_primary.store(prefer_primary, Ordering::SeqCst);
    }

    #[inline]
    #[must_use]
    pub fn prefers_primary(&self) -> bool {
        self.prefer_primary.load(Ordering::SeqCst)
    }

    /// Providers in the order they are tried
    fn ordered(&self) -> [(ProviderRole, Option<&Arc<dyn AnalysisProvider>>); 2] {
        let primary = (ProviderRole::Primary, self.primary.as_ref());
        let secondary = (ProviderRole::Secondary, self.secondary.as_ref());
        if self.prefers_primary() {
            [primary, secondary]
        } else {
            [secondary, primary]
        }
    }

    /// Sequenced suggestions; never fails
    pub async fn suggest_skills(&self, request: &SuggestionRequest) -> Resolution<SkillSuggestions> {
        let sequence = self.suggestions.next();
        let suggestions = self.run_suggestions(request).await;
        let resolution = self.suggestions.resolve(sequence, suggestions);
        if !resolution.is_current() {
            tracing::debug!(sequence, "discarding stale suggestions");
        }
        resolution
    }

    /// Sequenced analysis; failures are sequenced too
    pub async fn analyze_scope(
        &self,
        request: &AnalysisRequest,
    ) -> Resolution<Result<AnalysisResult, PipelineError>> {
        let sequence = self.analyses.next();
        let outcome = self.run_analysis(request).await;
        let resolution = self.analyses.resolve(sequence, outcome);
        if !resolution.is_current() {
            tracing::debug!(sequence, "discarding stale analysis");
        }
        resolution
    }

    /// Suggestions from the first provider that answers, else the heuristic
    pub async fn run_suggestions(&self, request: &SuggestionRequest) -> SkillSuggestions {
        for (role, provider) in self.ordered() {
            let Some(provider) = provider else {
                tracing::debug!(%role, "suggestion provider not configured");
                continue;
            };
            match provider.suggest_skills(request).await {
                Ok(suggestions) => {
                    tracing::debug!(%role, provider = provider.name(), "suggestions received");
                    return suggestions.normalized(self.suggestion_limit);
                }
                Err(e) => {
                    tracing::warn!(%role, error = %e, "suggestion provider failed, trying next");
                }
            }
        }

        tracing::warn!("all suggestion providers failed, using keyword heuristic");
        heuristic::suggest(request, self.suggestion_limit)
    }

    /// Analysis from the first provider that answers
    ///
    /// # Errors
    /// `PipelineError::AnalysisFailed` with one entry per provider tried
    pub async fn run_analysis(&self, request: &AnalysisRequest) -> Result<AnalysisResult, PipelineError> {
        let mut attempts = Vec::with_capacity(2);

        for (role, provider) in self.ordered() {
            let Some(provider) = provider else {
                attempts.push(ProviderError::unavailable(role.as_str()));
                continue;
            };
            match provider.analyze_scope(request).await {
                Ok(analysis) => {
                    tracing::info!(
                        %role,
                        provider = provider.name(),
                        skills = analysis.detected_skills.len(),
                        "scope analysis received"
                    );
                    return Ok(normalize_analysis(analysis, &request.target_skills));
                }
                Err(e) => {
                    tracing::warn!(%role, error = %e, "analysis provider failed");
                    attempts.push(e);
                }
            }
        }

        let err = PipelineError::AnalysisFailed { attempts };
        tracing::error!("{}", err);
        Err(err)
    }
}

impl fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderChain")
            .field("primary", &self.primary.as_ref().map(|p| p.name().to_string()))
            .field("secondary", &self.secondary.as_ref().map(|p| p.name().to_string()))
            .field("prefer_primary", &self.prefers_primary())
            .field("suggestion_limit", &self.suggestion_limit)
            .finish()
    }
}

/// Clamp scores, de-duplicate sets and cover every target skill
///
/// Target skills the provider left out get descriptive entries from the
/// heuristic tables; no score is invented for them.
#[must_use]
pub fn normalize_analysis(mut analysis: AnalysisResult, target_skills: &[String]) -> AnalysisResult {
    analysis.clarity_score = analysis.clarity_score.clamp(1, 10);
    analysis.feasibility_score = analysis.feasibility_score.clamp(1, 10);
    analysis.identified_risks =
        dedup_preserving_order(std::mem::take(&mut analysis.identified_risks), usize::MAX);
    analysis.suggested_technologies =
        dedup_preserving_order(std::mem::take(&mut analysis.suggested_technologies), usize::MAX);
    for mapping in &mut analysis.skill_mapping {
        mapping.complexity_level = mapping.complexity_level.clamp(1, 5);
    }

    for name in target_skills.iter().map(String::as_str) {
        if name.is_empty() {
            continue;
        }
        if analysis.skill(name).is_none() {
            tracing::debug!(skill = name, "completing analysis with heuristic entry");
            analysis.detected_skills.push(heuristic::placeholder_skill(name));
        }
        if analysis.mapping(name).is_none() {
            analysis.skill_mapping.push(heuristic::placeholder_mapping(name));
        }
    }

    analysis
}
