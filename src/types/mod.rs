//! Data types for the discovery pipeline.

pub mod candidate;
pub mod config;
pub mod metrics;
pub mod organization;

pub use candidate::{Candidate, SearchPage};
pub use config::{CategoryProfile, DiscoveryConfig, RetryPolicy};
pub use metrics::{RunMetrics, SearchQueryRecord, ValidationStats};
pub use organization::{Contact, DiscoveredUrl, NewOrganization, Organization};
