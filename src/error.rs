//! Typed errors for the discovery library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur while talking to a search provider.
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Provider returned a non-success status or malformed payload
    #[error("provider error: {0}")]
    Provider(String),

    /// Provider signalled a rate limit
    #[error("search provider rate limited")]
    RateLimited,
}

/// Errors from the language-model backend.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Provider signalled a rate limit; callers may retry with backoff.
    #[error("rate limited by model provider")]
    RateLimited,

    /// Backend unreachable or returned an error status
    #[error("model service error: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Backend answered but with no usable text
    #[error("empty model response")]
    EmptyResponse,

    /// No backend configured
    #[error("no model backend configured")]
    NotConfigured,
}

impl ModelError {
    /// Whether a retry with backoff is worthwhile.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ModelError::RateLimited)
    }
}

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Uniqueness violation on the (name, region) key
    #[error("organization already exists: {name} in {region}")]
    DuplicateOrganization { name: String, region: String },

    /// Referenced record does not exist
    #[error("record not found: {0}")]
    NotFound(String),

    /// Backend-specific failure
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Umbrella error for discovery operations.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Search provider failed
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    /// Model backend failed
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Report file could not be written
    #[error("report I/O error: {0}")]
    Report(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration error
    #[error("config error: {reason}")]
    Config { reason: String },
}

/// Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Result type alias for search-provider operations.
pub type SearchProviderResult<T> = std::result::Result<T, SearchError>;

/// Result type alias for model-backend operations.
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Result type alias for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
