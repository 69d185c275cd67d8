//! Shared HTTP plumbing for the remote adapters

use regex::Regex;
use reel_core::{ProviderError, VerificationVerdict};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

/// Rating used when a verifier omits one
pub(crate) const DEFAULT_RATING: f64 = 3.0;

/// Feedback used when a verifier omits it
pub(crate) const DEFAULT_FEEDBACK: &str = "Analysis completed";

/// Client with an optional whole-request timeout
pub(crate) fn build_client(
    provider: &str,
    timeout_secs: Option<u64>,
) -> Result<reqwest::Client, ProviderError> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| ProviderError::call_failed(provider, e))
}

/// Outermost `{...}` span of free text (first `{` to last `}`)
pub(crate) fn extract_json_object(text: &str) -> Option<&str> {
    static OBJECT: OnceLock<Option<Regex>> = OnceLock::new();
    let re = OBJECT
        .get_or_init(|| Regex::new(r"\{[\s\S]*\}").ok())
        .as_ref()?;
    re.find(text).map(|m| m.as_str())
}

/// Decode the JSON object embedded in `text`
pub(crate) fn decode_embedded<T: DeserializeOwned>(
    provider: &str,
    text: &str,
) -> Result<T, ProviderError> {
    let object = extract_json_object(text)
        .ok_or_else(|| ProviderError::no_valid_response(provider, "no JSON object in response"))?;
    serde_json::from_str(object).map_err(|e| ProviderError::no_valid_response(provider, e))
}

/// Verdict as returned over the wire; ratings may be fractional or missing
#[derive(Debug, Deserialize)]
pub(crate) struct WireVerdict {
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    feedback: Option<String>,
}

impl WireVerdict {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn into_verdict(self) -> VerificationVerdict {
        let rating = self
            .rating
            .filter(|r| r.is_finite())
            .unwrap_or(DEFAULT_RATING)
            .round()
            .clamp(1.0, 5.0) as u8;
        let feedback = self
            .feedback
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FEEDBACK.to_string());
        VerificationVerdict { rating, feedback }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reel_core::SkillSuggestions;

    #[test]
    fn extracts_object_from_prose() {
        let text = "Sure! Here is the analysis:\n{\"a\": {\"b\": 1}}\nLet me know.";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(extract_json_object("no braces here"), None);
    }

    #[test]
    fn decode_without_object_is_no_valid_response() {
        let err = decode_embedded::<SkillSuggestions>("model", "I cannot help").unwrap_err();
        assert!(matches!(err, ProviderError::NoValidResponse { .. }));
        assert_eq!(err.provider(), "model");
    }

    #[test]
    fn decode_with_wrong_shape_is_no_valid_response() {
        let err = decode_embedded::<SkillSuggestions>("model", "{\"technical\": 3}").unwrap_err();
        assert!(matches!(err, ProviderError::NoValidResponse { .. }));
    }

    #[test]
    fn wire_verdict_defaults_and_clamps() {
        let verdict: WireVerdict = serde_json::from_str("{}").unwrap();
        assert_eq!(
            verdict.into_verdict(),
            VerificationVerdict {
                rating: 3,
                feedback: "Analysis completed".into()
            }
        );

        let verdict: WireVerdict =
            serde_json::from_str(r#"{"rating": 4.6, "feedback": "Solid"}"#).unwrap();
        assert_eq!(verdict.into_verdict().rating, 5);

        let verdict: WireVerdict = serde_json::from_str(r#"{"rating": 9}"#).unwrap();
        assert_eq!(verdict.into_verdict().rating, 5);
    }
}
