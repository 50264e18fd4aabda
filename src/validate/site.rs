//! Model-backed official-website validation with heuristic fallback.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::classify::verdict::parse_verdict;
use crate::error::ModelError;
use crate::traits::Model;
use crate::types::RetryPolicy;
use crate::validate::heuristics::{validate_with_heuristics, VALIDATION_THRESHOLD};

/// Validates whether a URL is the official website of an organization.
///
/// Two tiers: a model call when a backend is configured, pure domain
/// heuristics otherwise or when the model path fails. Rate-limited model
/// calls are retried with exponential backoff; malformed model output
/// fails closed as "not valid" without retrying. Results are cached per
/// `(url, org_name, region)` for the lifetime of this instance, so one
/// validator should live exactly as long as one run.
pub struct SiteValidator<M> {
    model: Option<M>,
    retry: RetryPolicy,
    threshold: f32,
    cache: RwLock<HashMap<(String, String, String), (bool, f32)>>,
}

impl<M: Model> SiteValidator<M> {
    /// Validator with a model backend.
    pub fn new(model: M) -> Self {
        Self {
            model: Some(model),
            retry: RetryPolicy::default(),
            threshold: VALIDATION_THRESHOLD,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Heuristics-only validator.
    pub fn heuristic_only() -> Self {
        Self {
            model: None,
            retry: RetryPolicy::default(),
            threshold: VALIDATION_THRESHOLD,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Override the retry policy for rate-limited calls.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Validate a URL/organization pairing: `(is_valid, confidence)`.
    pub async fn validate(&self, url: &str, org_name: &str, region: Option<&str>) -> (bool, f32) {
        if url.is_empty() {
            return (false, 0.0);
        }
        let url = url.trim().to_lowercase();

        let key = (
            url.clone(),
            org_name.to_string(),
            region.unwrap_or_default().to_string(),
        );
        if let Some(cached) = self.cache.read().unwrap().get(&key) {
            return *cached;
        }

        let result = match &self.model {
            Some(model) => match self.validate_with_model(model, &url, org_name, region).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(error = %e, %url, "model validation failed, using heuristics");
                    validate_with_heuristics(&url, org_name, region)
                }
            },
            None => validate_with_heuristics(&url, org_name, region),
        };

        self.cache.write().unwrap().insert(key, result);
        result
    }

    /// Number of cached validation results.
    pub fn cache_len(&self) -> usize {
        self.cache.read().unwrap().len()
    }

    async fn validate_with_model(
        &self,
        model: &M,
        url: &str,
        org_name: &str,
        region: Option<&str>,
    ) -> Result<(bool, f32), ModelError> {
        let prompt = format_site_prompt(url, org_name, region);

        let mut retry = 0;
        loop {
            match model.complete(&prompt).await {
                Ok(text) => {
                    // Parse failures come back as the fail-closed verdict:
                    // not valid, zero confidence, no retry.
                    let verdict = parse_verdict(&text);
                    let is_valid = verdict.is_relevant && verdict.confidence >= self.threshold;
                    tracing::info!(
                        %url,
                        org = org_name,
                        is_valid,
                        confidence = verdict.confidence,
                        "model site validation"
                    );
                    return Ok((is_valid, verdict.confidence));
                }
                Err(e) if e.is_rate_limit() && retry + 1 < self.retry.max_attempts => {
                    let wait = self.retry.backoff(retry);
                    tracing::warn!(wait_secs = wait.as_secs(), "model rate limited, backing off");
                    tokio::time::sleep(wait).await;
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Build the official-site validation prompt.
fn format_site_prompt(url: &str, org_name: &str, region: Option<&str>) -> String {
    let location = region
        .map(|r| format!(" located in {r}"))
        .unwrap_or_default();
    format!(
        r#"Task: Evaluate if this URL is likely to be the official website of the specified organization.

Organization: {org_name}{location}
URL: {url}

Consider:
1. Common naming patterns for official websites, including:
   - Full organization name (e.g., bouldercity.org)
   - Abbreviations (e.g., bcnv.org for Boulder City, Nevada)
   - Domain extensions (.gov, .org, .us for government/municipal)
   - Local government URL formats (cityofX.gov, X-city.gov, etc.)

2. Municipal websites often use:
   - City/town/county initials
   - State abbreviations in the domain
   - Official extensions like .gov, .org, or state-specific like .nv.us

Return a JSON object with:
1. "is_official": true/false
2. "confidence": a number between 0.0 and 1.0
3. "explanation": brief reasoning for your decision

Response format:
```json
{{"is_official": true/false, "confidence": 0.X, "explanation": "reason"}}
```"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockModel;
    use crate::types::RetryPolicy;

    #[tokio::test]
    async fn model_verdict_wins_when_parseable() {
        let model = MockModel::new().with_response(
            r#"```json
{"is_official": true, "confidence": 0.95, "explanation": "abbreviation matches"}
```"#,
        );
        let validator = SiteValidator::new(model);

        let (valid, confidence) = validator
            .validate("https://bcnv.org", "Boulder City", Some("NV"))
            .await;
        assert!(valid);
        assert!((confidence - 0.95).abs() < 1e-6);
    }

    #[tokio::test]
    async fn unparseable_model_output_is_not_valid() {
        let model = MockModel::new().with_response("definitely the official site, trust me");
        let validator = SiteValidator::new(model);

        let (valid, confidence) = validator
            .validate("https://jordanvalleywater.org", "Jordan Valley Water", None)
            .await;
        assert!(!valid);
        assert_eq!(confidence, 0.0);
    }

    #[tokio::test]
    async fn outage_falls_back_to_heuristics() {
        let model = MockModel::unavailable();
        let validator = SiteValidator::new(model);

        let (valid, confidence) = validator
            .validate("https://www.jordanvalleywater.org", "Jordan Valley Water", None)
            .await;
        // heuristics: .org + full name match
        assert!(valid);
        assert!((confidence - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn rate_limit_retries_then_succeeds() {
        let model = MockModel::new()
            .with_rate_limits(2)
            .with_response(r#"{"is_official": true, "confidence": 0.8}"#);
        let validator =
            SiteValidator::new(model).with_retry(RetryPolicy { max_attempts: 3 });

        // Paused clock auto-advances through the backoff sleeps.
        tokio::time::pause();
        let (valid, confidence) = validator
            .validate("https://acmewater.org", "Acme Water", None)
            .await;
        assert!(valid);
        assert!((confidence - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn results_are_cached_per_triple() {
        let model = MockModel::new().with_response(r#"{"is_official": true, "confidence": 0.9}"#);
        let validator = SiteValidator::new(model);

        let first = validator.validate("https://a.org", "A", Some("UT")).await;
        let second = validator.validate("https://a.org", "A", Some("UT")).await;
        assert_eq!(first, second);
        assert_eq!(validator.cache_len(), 1);

        // Different region is a different cache entry.
        validator.validate("https://a.org", "A", Some("NV")).await;
        assert_eq!(validator.cache_len(), 2);
    }

    #[tokio::test]
    async fn empty_url_is_invalid_without_calls() {
        let validator = SiteValidator::<MockModel>::heuristic_only();
        assert_eq!(validator.validate("", "Acme", None).await, (false, 0.0));
        assert_eq!(validator.cache_len(), 0);
    }
}
