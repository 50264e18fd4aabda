//! Core trait abstractions (search provider, model backend, storage).

pub mod model;
pub mod searcher;
pub mod store;

pub use model::Model;
pub use searcher::{MockSearchProvider, SearchProvider};
pub use store::{ContactStore, MetricsSink, OrganizationStore, QueryLog, UrlStore};
