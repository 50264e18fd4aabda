//! Organization Discovery & Validation Pipeline
//!
//! A lead-generation core that turns a (category x region) search matrix
//! into a validated organization database: plan search queries, collect
//! raw web results, classify each hit for relevance with a model
//! backend, then dedup/upsert the relevant ones against a persistence
//! layer while tracking metrics and writing a per-run report.
//!
//! # Design
//!
//! - Collaborators (search, model, storage) sit behind small traits so
//!   every stage is testable with scripted doubles
//! - The model is an untrusted oracle: its output is parsed defensively
//!   and parse failures fail closed
//! - Transport failures degrade to deterministic heuristics; nothing in
//!   a run is fatal to the process
//! - `(name, region)` is the organization identity; merges only ever
//!   raise scores
//!
//! # Usage
//!
//! ```rust,ignore
//! use discovery::{DiscoveryConfig, DiscoveryOrchestrator, MemoryStore};
//! use discovery::ai::GeminiModel;
//! use discovery::searchers::{GoogleSearchProvider, RateLimitedSearcher};
//!
//! let config = DiscoveryConfig::standard().with_report_dir("reports");
//! let provider = RateLimitedSearcher::new(
//!     GoogleSearchProvider::new(api_key, cse_id)?,
//!     1,
//! );
//! let model = GeminiModel::new(gemini_key)?;
//! let store = MemoryStore::new();
//!
//! let orchestrator = DiscoveryOrchestrator::new(config, provider, model, store);
//! let metrics = orchestrator.run_discovery(None, None).await;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (SearchProvider, Model, stores)
//! - [`types`] - Domain data types and configuration
//! - [`classify`] - Relevance classification and verdict parsing
//! - [`validate`] - Official-website validation (model + heuristics)
//! - [`pipeline`] - Planning, candidate generation, orchestration, reports
//! - [`searchers`] - Search provider implementations
//! - [`ai`] - Model backend implementations
//! - [`stores`] - Storage implementations
//! - [`testing`] - Mock model backend for tests

pub mod ai;
pub mod classify;
pub mod error;
pub mod pipeline;
pub mod searchers;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;
pub mod validate;

// Re-export core types at crate root
pub use classify::{ClassificationVerdict, RelevanceClassifier};
pub use error::{DiscoveryError, ModelError, SearchError, StoreError};
pub use pipeline::{
    CandidateGenerator, DiscoveryOrchestrator, QueryPlanner, ValidatedDiscovery,
};
pub use stores::MemoryStore;
pub use traits::{Model, OrganizationStore, SearchProvider};
pub use types::{
    Candidate, CategoryProfile, Contact, DiscoveryConfig, NewOrganization, Organization,
    RunMetrics, SearchQueryRecord, ValidationStats,
};
pub use validate::SiteValidator;
