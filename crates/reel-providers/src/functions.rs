//! Server-side function adapter (secondary provider and verifier)
//!
//! Each operation is a JSON POST to `<base_url>/functions/v1/<name>` carrying
//! the request payload as-is. Non-2xx answers are `CallFailed`; bodies that do
//! not decode into the expected shape are `NoValidResponse`.

use crate::http::{build_client, WireVerdict};
use async_trait::async_trait;
use reel_core::{
    AnalysisProvider, AnalysisRequest, AnalysisResult, FunctionEndpointConfig, ProviderError,
    SkillSuggestions, SuggestionRequest, VerificationProvider, VerificationRequest,
    VerificationVerdict,
};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Provider name used in logs and errors
pub const FUNCTIONS_PROVIDER: &str = "functions";

/// Function generating skill suggestions
pub const SUGGEST_FUNCTION: &str = "generate-skill-suggestions";

/// Function analyzing project scope
pub const ANALYZE_FUNCTION: &str = "analyze-project-scope";

/// Function rating one skill against evidence
pub const VERIFY_FUNCTION: &str = "verify-skill-video";

/// Function endpoint client
#[derive(Debug, Clone)]
pub struct FunctionProvider {
    config: FunctionEndpointConfig,
    client: reqwest::Client,
}

impl FunctionProvider {
    /// Create provider for `config`
    ///
    /// # Errors
    /// `ProviderError::Unavailable` when the base URL is blank,
    /// `ProviderError::CallFailed` when the HTTP client cannot be built
    pub fn new(config: FunctionEndpointConfig) -> Result<Self, ProviderError> {
        if config.base_url.trim().is_empty() {
            return Err(ProviderError::unavailable(FUNCTIONS_PROVIDER));
        }
        let client = build_client(FUNCTIONS_PROVIDER, config.timeout_secs)?;
        Ok(Self { config, client })
    }

    /// URL of `function`
    #[must_use]
    pub fn function_url(&self, function: &str) -> String {
        format!(
            "{}/functions/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            function
        )
    }

    async fn invoke<B, T>(&self, function: &str, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(self.function_url(function)).json(body);
        if let Some(key) = &self.config.api_key {
            request = request
                .header(AUTHORIZATION, format!("Bearer {key}"))
                .header("apikey", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::call_failed(FUNCTIONS_PROVIDER, e))?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Function {} returned {}", function, status);
            return Err(ProviderError::call_failed(
                FUNCTIONS_PROVIDER,
                format!("{function}: HTTP {}", status.as_u16()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::call_failed(FUNCTIONS_PROVIDER, e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::no_valid_response(FUNCTIONS_PROVIDER, format!("{function}: {e}")))
    }
}

#[async_trait]
impl AnalysisProvider for FunctionProvider {
    fn name(&self) -> &str {
        FUNCTIONS_PROVIDER
    }

    async fn suggest_skills(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SkillSuggestions, ProviderError> {
        self.invoke(SUGGEST_FUNCTION, request).await
    }

    async fn analyze_scope(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, ProviderError> {
        self.invoke(ANALYZE_FUNCTION, request).await
    }
}

#[async_trait]
impl VerificationProvider for FunctionProvider {
    fn name(&self) -> &str {
        FUNCTIONS_PROVIDER
    }

    async fn verify_evidence(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationVerdict, ProviderError> {
        let verdict: WireVerdict = self.invoke(VERIFY_FUNCTION, request).await?;
        Ok(verdict.into_verdict())
    }
}
