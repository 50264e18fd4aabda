//! Search provider implementations.

pub mod google;
pub mod rate_limited;

pub use google::GoogleSearchProvider;
pub use rate_limited::RateLimitedSearcher;
