//! Official-website validation (model tier + domain heuristics).

pub mod heuristics;
pub mod site;

pub use heuristics::{
    heuristic_confidence, validate_with_heuristics, HEURISTIC_CONFIDENCE_CAP, VALIDATION_THRESHOLD,
};
pub use site::SiteValidator;
