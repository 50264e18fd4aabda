//! Prompt construction for the relevance classifier.

use crate::types::Candidate;

/// Build the classification prompt for one search hit.
///
/// Two gating questions (right category, actual organization page) come
/// first; name extraction and the two scores are only requested when
/// both are affirmative. The response shape is pinned so the verdict
/// parser has a fixed target.
pub fn format_classify_prompt(
    candidate: &Candidate,
    category: &str,
    description: &str,
    region: &str,
) -> String {
    format!(
        r#"I have a search result that might be a {description} in {region}. I need to determine if this is actually a relevant organization.

Title: {title}
Snippet: {snippet}
URL: {link}

Analyze this information and answer with YES or NO:
1. Is this a {description}? (Not a job board, news article, social media page, or directory)
2. Is it an actual organization (not a list, guide, or general information page)?

If you answered YES to both questions, also extract:
- Organization Name (the official name, not just what's in the title)
- Confidence Score (0.0-1.0) that this is a relevant {category} organization
- Relevance Score (0.0-1.0) for how well this organization fits the {category} category
- Any notes or observations about this organization

Format your answer as a JSON object with these fields exactly:
{{
    "is_relevant": true or false,
    "organization_name": "extracted name here",
    "confidence_score": 0.0-1.0,
    "relevance_score": 0.0-1.0,
    "notes": "any observations"
}}

Only respond with this JSON object, nothing else."#,
        title = candidate.title,
        snippet = candidate.snippet,
        link = candidate.link,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_candidate_and_context() {
        let candidate = Candidate::new(
            "Jordan Valley Water",
            "A water conservancy district",
            "https://jvwcd.org",
        );
        let prompt = format_classify_prompt(
            &candidate,
            "water",
            "Water and Wastewater Districts",
            "Utah",
        );
        assert!(prompt.contains("Jordan Valley Water"));
        assert!(prompt.contains("https://jvwcd.org"));
        assert!(prompt.contains("Water and Wastewater Districts in Utah"));
        assert!(prompt.contains("\"is_relevant\""));
    }
}
