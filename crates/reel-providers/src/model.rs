//! Direct model invocation (primary provider)
//!
//! Sends a single user message to a messages-style endpoint:
//! - body `{anthropic_version, max_tokens, messages: [{role: "user", content}]}`
//! - answer text read from `content[0].text`
//! - the outermost `{...}` object of that text is decoded into the result type

use crate::http::{build_client, decode_embedded, WireVerdict};
use crate::prompts;
use async_trait::async_trait;
use reel_core::{
    AnalysisProvider, AnalysisRequest, AnalysisResult, ModelEndpointConfig, ProviderError,
    SkillSuggestions, SuggestionRequest, VerificationProvider, VerificationRequest,
    VerificationVerdict,
};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::json;

/// Provider name used in logs and errors
pub const MODEL_PROVIDER: &str = "model";

/// Token budget for suggestion and verification prompts
const SHORT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Messages-endpoint client
#[derive(Debug, Clone)]
pub struct ModelProvider {
    config: ModelEndpointConfig,
    client: reqwest::Client,
}

impl ModelProvider {
    /// Create provider for `config`
    ///
    /// # Errors
    /// `ProviderError::Unavailable` when the endpoint is blank,
    /// `ProviderError::CallFailed` when the HTTP client cannot be built
    pub fn new(config: ModelEndpointConfig) -> Result<Self, ProviderError> {
        if config.endpoint.trim().is_empty() {
            return Err(ProviderError::unavailable(MODEL_PROVIDER));
        }
        let client = build_client(MODEL_PROVIDER, config.timeout_secs)?;
        Ok(Self { config, client })
    }

    /// Endpoint configuration
    #[must_use]
    pub fn config(&self) -> &ModelEndpointConfig {
        &self.config
    }

    /// Send `prompt` and return the text of the first content block
    async fn invoke(&self, prompt: String, max_tokens: u32) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.config.model,
            "anthropic_version": self.config.anthropic_version,
            "max_tokens": max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let mut request = self
            .client
            .post(&self.config.endpoint)
            .header(ACCEPT, "application/json")
            .json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.header(AUTHORIZATION, format!("Bearer {key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::call_failed(MODEL_PROVIDER, e))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("Model endpoint returned {}: {}", status, text);
            return Err(ProviderError::call_failed(
                MODEL_PROVIDER,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::call_failed(MODEL_PROVIDER, e))?;
        body.content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| ProviderError::no_valid_response(MODEL_PROVIDER, "empty content"))
    }
}

#[async_trait]
impl AnalysisProvider for ModelProvider {
    fn name(&self) -> &str {
        MODEL_PROVIDER
    }

    async fn suggest_skills(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SkillSuggestions, ProviderError> {
        let text = self
            .invoke(prompts::suggestion_prompt(request), SHORT_MAX_TOKENS)
            .await?;
        decode_embedded(MODEL_PROVIDER, &text)
    }

    async fn analyze_scope(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisResult, ProviderError> {
        tracing::debug!(
            "Requesting model analysis for {} target skill(s)",
            request.target_skills.len()
        );
        let text = self
            .invoke(prompts::analysis_prompt(request), self.config.max_tokens)
            .await?;
        decode_embedded(MODEL_PROVIDER, &text)
    }
}

#[async_trait]
impl VerificationProvider for ModelProvider {
    fn name(&self) -> &str {
        MODEL_PROVIDER
    }

    async fn verify_evidence(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationVerdict, ProviderError> {
        let text = self
            .invoke(prompts::verification_prompt(request), SHORT_MAX_TOKENS)
            .await?;
        let verdict: WireVerdict = decode_embedded(MODEL_PROVIDER, &text)?;
        Ok(verdict.into_verdict())
    }
}
