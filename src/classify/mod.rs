//! Relevance classification — prompt construction, verdict parsing,
//! and the keyword fallback scorer.

pub mod classifier;
pub mod prompts;
pub mod verdict;

pub use classifier::{keyword_verdict, RelevanceClassifier, DISCOVERY_METHOD_CLASSIFIED};
pub use prompts::format_classify_prompt;
pub use verdict::{extract_json_object, parse_verdict, ClassificationVerdict};
