//! Pure string/domain heuristics for official-website validation.
//!
//! Used when no model backend is configured or the model path fails.
//! Heuristic confidence is clamped to [0.0, 0.9]; the 0.9..1.0 band is
//! reserved for model-backed verdicts.

use url::Url;

/// Domain suffixes that suggest an official/government site.
const OFFICIAL_SUFFIXES: [&str; 4] = [".gov", ".org", ".us", ".edu"];

/// Filler words stripped from organization names before matching.
const COMMON_WORDS: [&str; 7] = [
    "city",
    "town",
    "of",
    "county",
    "village",
    "township",
    "department",
];

const SOCIAL_MEDIA: [&str; 5] = [
    "facebook.com",
    "linkedin.com",
    "twitter.com",
    "instagram.com",
    "youtube.com",
];

const NEWS_SITES: [&str; 6] = [
    "news.",
    ".news.",
    "press.",
    "bloomberg.com",
    "reuters.com",
    "wsj.com",
];

const DIRECTORY_SITES: [&str; 5] = ["yellowpages", "yelp.com", "bbb.org", "glassdoor", "indeed"];

/// Validity threshold shared with the model-backed path.
pub const VALIDATION_THRESHOLD: f32 = 0.6;

/// Ceiling for heuristic confidence.
pub const HEURISTIC_CONFIDENCE_CAP: f32 = 0.9;

/// Heuristic validation: `(is_valid, confidence)`.
///
/// A site is valid when its confidence reaches [`VALIDATION_THRESHOLD`].
pub fn validate_with_heuristics(url: &str, org_name: &str, region: Option<&str>) -> (bool, f32) {
    let confidence = heuristic_confidence(url, org_name, region);
    (confidence >= VALIDATION_THRESHOLD, confidence)
}

/// Bounded confidence score that `url` is the official site of
/// `org_name`, always within [0.0, 0.9].
pub fn heuristic_confidence(url: &str, org_name: &str, region: Option<&str>) -> f32 {
    let Some(domain) = parse_domain(url) else {
        return 0.0;
    };

    let mut confidence = 0.0f32;

    if OFFICIAL_SUFFIXES.iter().any(|ext| domain.ends_with(ext)) {
        confidence += 0.3;
    }

    let org_lower = org_name.to_lowercase();
    let clean_org = alphanumeric(&org_lower);
    let clean_domain = alphanumeric(&domain);
    let domain_head = domain.split('.').next().unwrap_or(&domain).to_string();

    let org_parts: Vec<&str> = org_lower.split_whitespace().collect();

    // Full-name match beats a partial word match; only one of the two applies.
    if !clean_org.is_empty() && clean_domain.contains(&clean_org) {
        confidence += 0.4;
    } else if org_parts
        .iter()
        .filter(|p| !COMMON_WORDS.contains(*p))
        .any(|part| part.len() > 3 && domain_head.contains(part))
    {
        confidence += 0.2;
    }

    // Initials-based abbreviation, optionally with the 2-letter region
    // code appended (e.g. "bcnv" for Boulder City, NV).
    let initials: String = org_parts.iter().filter_map(|p| p.chars().next()).collect();
    let mut abbreviations = Vec::new();
    if initials.len() >= 2 {
        abbreviations.push(initials.clone());
        if let Some(region) = region {
            let code: String = region.to_lowercase().chars().take(2).collect();
            abbreviations.push(format!("{initials}{code}"));
        }
    }
    if abbreviations.iter().any(|abbr| domain_head.contains(abbr)) {
        confidence += 0.3;
    }

    if domain_head.contains("cityof") || domain_head.contains("townof") {
        confidence += 0.2;
    }

    if SOCIAL_MEDIA.iter().any(|s| domain.contains(s)) {
        confidence -= 0.5;
    }
    if NEWS_SITES.iter().any(|s| domain.contains(s)) {
        confidence -= 0.4;
    }
    if DIRECTORY_SITES.iter().any(|s| domain.contains(s)) {
        confidence -= 0.4;
    }

    confidence.clamp(0.0, HEURISTIC_CONFIDENCE_CAP)
}

fn parse_domain(url: &str) -> Option<String> {
    let candidate = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    };
    let parsed = Url::parse(&candidate).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

fn alphanumeric(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}
