//! Relevance classification of search candidates.

use std::time::Duration;

use crate::classify::prompts::format_classify_prompt;
use crate::classify::verdict::{parse_verdict, ClassificationVerdict};
use crate::error::ModelError;
use crate::traits::Model;
use crate::types::{Candidate, CategoryProfile, NewOrganization, RetryPolicy};

/// Discovery method stamped on organizations produced by classification.
pub const DISCOVERY_METHOD_CLASSIFIED: &str = "classified_search";

/// Classifies raw search hits as relevant organizations, using the model
/// backend as an untrusted oracle.
///
/// Failure discipline, per candidate:
/// - model transport errors (unreachable, rate limited) degrade to the
///   deterministic keyword scorer;
/// - unparseable model output fails closed (not relevant, confidence 0);
/// - nothing classification-related ever aborts a batch.
pub struct RelevanceClassifier<M> {
    model: M,
    /// Throttle between successive model calls within a batch.
    classify_delay: Duration,
    /// Bounded retry on rate-limited model calls.
    retry: RetryPolicy,
}

impl<M: Model> RelevanceClassifier<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            classify_delay: Duration::from_millis(500),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the inter-call delay (tests set this to zero).
    pub fn with_classify_delay(mut self, delay: Duration) -> Self {
        self.classify_delay = delay;
        self
    }

    /// Override the retry policy for rate-limited calls.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Classify one candidate against a target category and region.
    ///
    /// Never errors; every failure mode maps to a verdict.
    pub async fn classify(
        &self,
        candidate: &Candidate,
        category: &str,
        profile: &CategoryProfile,
        region: &str,
    ) -> ClassificationVerdict {
        let prompt = format_classify_prompt(candidate, category, &profile.description, region);

        match self.complete_with_retry(&prompt).await {
            Ok(text) => {
                let verdict = parse_verdict(&text);
                tracing::info!(
                    title = %truncate(&candidate.title, 30),
                    is_relevant = verdict.is_relevant,
                    confidence = verdict.confidence,
                    "classified candidate"
                );
                verdict
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    title = %truncate(&candidate.title, 30),
                    "model unavailable, falling back to keyword scoring"
                );
                keyword_verdict(candidate, profile)
            }
        }
    }

    async fn complete_with_retry(&self, prompt: &str) -> Result<String, ModelError> {
        let mut retry = 0;
        loop {
            match self.model.complete(prompt).await {
                Ok(text) => return Ok(text),
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

    /// Classify a batch and map the relevant verdicts into
    /// organization-shaped records.
    ///
    /// A short delay throttles successive model calls; it is skipped
    /// after the last candidate.
    pub async fn batch_classify(
        &self,
        candidates: &[Candidate],
        category: &str,
        profile: &CategoryProfile,
        region: &str,
    ) -> Vec<NewOrganization> {
        let mut relevant = Vec::new();

        for (i, candidate) in candidates.iter().enumerate() {
            let verdict = self.classify(candidate, category, profile, region).await;

            if verdict.is_relevant {
                let name = if verdict.canonical_name.is_empty() {
                    clean_title(&candidate.title)
                } else {
                    verdict.canonical_name.clone()
                };
                relevant.push(NewOrganization {
                    name,
                    org_type: category.to_string(),
                    region: region.to_string(),
                    website: candidate.link.clone(),
                    confidence_score: verdict.confidence,
                    relevance_score: verdict.relevance,
                    source_url: candidate.link.clone(),
                    discovery_method: DISCOVERY_METHOD_CLASSIFIED.to_string(),
                    description: (!verdict.notes.is_empty()).then(|| verdict.notes.clone()),
                });
            }

            if i + 1 < candidates.len() && !self.classify_delay.is_zero() {
                tokio::time::sleep(self.classify_delay).await;
            }
        }

        tracing::info!(
            classified = candidates.len(),
            relevant = relevant.len(),
            category,
            region,
            "batch classification complete"
        );
        relevant
    }
}

// Keyword weights from the fallback scorer: hits in the title count for
// more than hits in the snippet.
const TITLE_WEIGHT: f32 = 5.0;
const SNIPPET_WEIGHT: f32 = 2.0;
const FALLBACK_THRESHOLD: f32 = 0.3;

/// Deterministic keyword-frequency verdict, used when the model backend
/// is unreachable. Confidence is capped below the model-backed ceiling;
/// relevance mirrors confidence since keywords cannot separate the two.
pub fn keyword_verdict(candidate: &Candidate, profile: &CategoryProfile) -> ClassificationVerdict {
    if profile.keywords.is_empty() {
        return ClassificationVerdict::fail_closed();
    }

    let title = candidate.title.to_lowercase();
    let snippet = candidate.snippet.to_lowercase();

    let mut score = 0.0;
    for keyword in &profile.keywords {
        let keyword = keyword.to_lowercase();
        if title.contains(&keyword) {
            score += TITLE_WEIGHT;
        }
        if snippet.contains(&keyword) {
            score += SNIPPET_WEIGHT;
        }
    }

    let max_score = profile.keywords.len() as f32 * TITLE_WEIGHT;
    let confidence = (score / max_score).clamp(0.0, 0.9);
    let is_relevant = confidence >= FALLBACK_THRESHOLD;

    ClassificationVerdict {
        is_relevant,
        canonical_name: if is_relevant {
            clean_title(&candidate.title)
        } else {
            String::new()
        },
        confidence,
        relevance: confidence,
        notes: "keyword fallback classification".to_string(),
    }
}

/// Strip site-name suffixes ("Acme Water | Home") from a result title.
fn clean_title(title: &str) -> String {
    for separator in [" | ", " - ", " – "] {
        if let Some(head) = title.split(separator).next() {
            if head.len() < title.len() {
                return head.trim().to_string();
            }
        }
    }
    title.trim().to_string()
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockModel;
    use crate::types::CategoryProfile;

    fn water_profile() -> CategoryProfile {
        CategoryProfile::new("Water and Wastewater Districts")
            .with_template("water districts {region}")
            .with_keywords(["water", "district", "treatment"])
    }

    fn candidate() -> Candidate {
        Candidate::new(
            "Jordan Valley Water Conservancy District",
            "Provides water treatment and delivery in Utah",
            "https://jvwcd.org",
        )
    }

    #[tokio::test]
    async fn relevant_verdict_maps_to_organization() {
        let model = MockModel::new().with_response(
            r#"{"is_relevant": true, "organization_name": "Jordan Valley Water Conservancy District",
                "confidence_score": 0.9, "relevance_score": 0.95, "notes": "official district site"}"#,
        );
        let classifier = RelevanceClassifier::new(model).with_classify_delay(Duration::ZERO);

        let orgs = classifier
            .batch_classify(&[candidate()], "water", &water_profile(), "Utah")
            .await;

        assert_eq!(orgs.len(), 1);
        let org = &orgs[0];
        assert_eq!(org.name, "Jordan Valley Water Conservancy District");
        assert_eq!(org.org_type, "water");
        assert_eq!(org.region, "Utah");
        assert_eq!(org.discovery_method, DISCOVERY_METHOD_CLASSIFIED);
        assert_eq!(org.description.as_deref(), Some("official district site"));
    }

    #[tokio::test]
    async fn unparseable_response_fails_closed() {
        let model = MockModel::new().with_response("I cannot classify this result.");
        let classifier = RelevanceClassifier::new(model).with_classify_delay(Duration::ZERO);

        let verdict = classifier
            .classify(&candidate(), "water", &water_profile(), "Utah")
            .await;
        assert!(!verdict.is_relevant);
        assert_eq!(verdict.confidence, 0.0);
    }

    #[tokio::test]
    async fn model_outage_uses_keyword_fallback() {
        let model = MockModel::unavailable();
        let classifier = RelevanceClassifier::new(model).with_classify_delay(Duration::ZERO);

        let verdict = classifier
            .classify(&candidate(), "water", &water_profile(), "Utah")
            .await;
        // title hits "water" and "district", snippet hits "water" and "treatment"
        assert!(verdict.is_relevant);
        assert!(verdict.confidence > 0.0 && verdict.confidence <= 0.9);
        assert_eq!(verdict.notes, "keyword fallback classification");
    }

    #[tokio::test]
    async fn rate_limit_retries_before_falling_back() {
        let model = MockModel::new()
            .with_rate_limits(2)
            .with_response(r#"{"is_relevant": true, "confidence_score": 0.8}"#);
        let classifier = RelevanceClassifier::new(model).with_classify_delay(Duration::ZERO);

        // Paused clock auto-advances through the backoff sleeps.
        tokio::time::pause();
        let verdict = classifier
            .classify(&candidate(), "water", &water_profile(), "Utah")
            .await;
        assert!(verdict.is_relevant);
        assert!((verdict.confidence - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn irrelevant_results_are_filtered_from_batch() {
        let model = MockModel::new()
            .with_response(r#"{"is_relevant": false, "confidence_score": 0.2}"#);
        let classifier = RelevanceClassifier::new(model).with_classify_delay(Duration::ZERO);

        let orgs = classifier
            .batch_classify(&[candidate()], "water", &water_profile(), "Utah")
            .await;
        assert!(orgs.is_empty());
    }

    #[test]
    fn clean_title_strips_site_suffix() {
        assert_eq!(clean_title("Acme Water | Home"), "Acme Water");
        assert_eq!(clean_title("Acme Water - Official Site"), "Acme Water");
        assert_eq!(clean_title("Acme Water"), "Acme Water");
    }

    #[test]
    fn keyword_verdict_without_keywords_fails_closed() {
        let profile = CategoryProfile::new("Anything");
        let verdict = keyword_verdict(&candidate(), &profile);
        assert!(!verdict.is_relevant);
    }
}
