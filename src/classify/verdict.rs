//! Classification verdicts and defensive model-response parsing.
//!
//! The model backend returns free text that is only *expected* to contain
//! one JSON object, possibly wrapped in prose or code fences, and with
//! field names that drift between providers (`is_relevant` vs
//! `is_official`, `confidence` vs `confidence_score`). Everything is
//! normalized into [`ClassificationVerdict`] at this boundary; nothing
//! loosely-typed flows past it.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

/// Normalized result of classifying one candidate.
///
/// `confidence` is certainty in the classification itself; `relevance`
/// is fit to the target category. They are distinct values and are never
/// collapsed into a single threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationVerdict {
    pub is_relevant: bool,
    /// Extracted official name (empty when not relevant).
    pub canonical_name: String,
    pub confidence: f32,
    pub relevance: f32,
    pub notes: String,
}

impl ClassificationVerdict {
    /// The fail-closed default: not relevant, zero confidence.
    ///
    /// Used whenever the model response cannot be parsed. This is a
    /// normal outcome, not an error.
    pub fn fail_closed() -> Self {
        Self {
            is_relevant: false,
            canonical_name: String::new(),
            confidence: 0.0,
            relevance: 0.0,
            notes: String::new(),
        }
    }
}

/// Wire shape of a verdict as the model emits it, accepting both field
/// spellings seen in practice.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(alias = "is_official")]
    is_relevant: bool,
    #[serde(default)]
    organization_name: Option<String>,
    #[serde(default, alias = "confidence")]
    confidence_score: f32,
    #[serde(default)]
    relevance_score: Option<f32>,
    #[serde(default, alias = "explanation")]
    notes: Option<String>,
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```(?:json)?\s*(\{[\s\S]*?\})\s*```").unwrap())
}

/// Extract the first top-level `{...}` substring from model output.
///
/// Tries a fenced ```json block first, then falls back to the widest
/// brace span in the raw text.
pub fn extract_json_object(text: &str) -> Option<&str> {
    if let Some(caps) = fence_re().captures(text) {
        return Some(caps.get(1).unwrap().as_str());
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parse free-form model output into a verdict.
///
/// Returns the fail-closed verdict when no JSON object can be found or
/// the object does not deserialize. Scores are clamped to [0, 1];
/// `relevance` defaults to `confidence` when the model omits it.
pub fn parse_verdict(text: &str) -> ClassificationVerdict {
    let Some(json) = extract_json_object(text) else {
        tracing::warn!(
            response = %text.chars().take(100).collect::<String>(),
            "no JSON object in model response, failing closed"
        );
        return ClassificationVerdict::fail_closed();
    };

    match serde_json::from_str::<RawVerdict>(json) {
        Ok(raw) => {
            let confidence = raw.confidence_score.clamp(0.0, 1.0);
            let relevance = raw.relevance_score.unwrap_or(confidence).clamp(0.0, 1.0);
            ClassificationVerdict {
                is_relevant: raw.is_relevant,
                canonical_name: raw.organization_name.unwrap_or_default(),
                confidence,
                relevance,
                notes: raw.notes.unwrap_or_default(),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "unparseable verdict JSON, failing closed");
            ClassificationVerdict::fail_closed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let verdict = parse_verdict(
            r#"{"is_relevant": true, "organization_name": "Utah Water Co",
               "confidence_score": 0.85, "relevance_score": 0.9, "notes": "water district"}"#,
        );
        assert!(verdict.is_relevant);
        assert_eq!(verdict.canonical_name, "Utah Water Co");
        assert!((verdict.confidence - 0.85).abs() < 1e-6);
        assert!((verdict.relevance - 0.9).abs() < 1e-6);
    }

    #[test]
    fn parses_fenced_json_with_prose() {
        let verdict = parse_verdict(
            "Sure, here is my analysis:\n```json\n{\"is_official\": true, \"confidence\": 0.7, \"explanation\": \"domain matches\"}\n```\nLet me know if you need more.",
        );
        assert!(verdict.is_relevant);
        assert!((verdict.confidence - 0.7).abs() < 1e-6);
        assert_eq!(verdict.notes, "domain matches");
        // relevance defaults to confidence when omitted
        assert!((verdict.relevance - 0.7).abs() < 1e-6);
    }

    #[test]
    fn unparseable_text_fails_closed() {
        let verdict = parse_verdict("I'm sorry, I can't help with that.");
        assert!(!verdict.is_relevant);
        assert_eq!(verdict.confidence, 0.0);

        let verdict = parse_verdict("{not valid json at all");
        assert!(!verdict.is_relevant);
        assert_eq!(verdict.confidence, 0.0);
    }

    #[test]
    fn clamps_out_of_range_scores() {
        let verdict =
            parse_verdict(r#"{"is_relevant": true, "confidence_score": 3.5, "relevance_score": -1.0}"#);
        assert_eq!(verdict.confidence, 1.0);
        assert_eq!(verdict.relevance, 0.0);
    }

    #[test]
    fn extracts_widest_brace_span() {
        let text = "prefix {\"is_relevant\": false, \"confidence_score\": 0.1} suffix";
        assert_eq!(
            extract_json_object(text).unwrap(),
            "{\"is_relevant\": false, \"confidence_score\": 0.1}"
        );
        assert!(extract_json_object("no braces here").is_none());
    }
}
