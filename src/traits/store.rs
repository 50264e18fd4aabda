//! Storage traits — the dedup/upsert boundary into persistence.
//!
//! The pipeline talks to storage through small per-concern traits so the
//! backing layer (an ORM, a SQL pool, an in-memory map) stays swappable.
//! Every operation commits synchronously; the orchestrator never batches
//! multiple records into one transaction, so process termination leaves
//! already-committed organizations intact.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{
    Contact, DiscoveredUrl, NewOrganization, Organization, RunMetrics, SearchQueryRecord,
};

/// Lookup/create/update primitives for organizations.
///
/// Uniqueness is the `(name, region)` pair. Implementations must reject
/// a duplicate create with [`StoreError::DuplicateOrganization`].
///
/// [`StoreError::DuplicateOrganization`]: crate::error::StoreError::DuplicateOrganization
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Find an organization by its `(name, region)` identity.
    async fn find_by_name_and_region(
        &self,
        name: &str,
        region: &str,
    ) -> StoreResult<Option<Organization>>;

    /// Create a new organization. Committed before this returns.
    async fn create_organization(&self, org: NewOrganization) -> StoreResult<Organization>;

    /// Raise the stored scores for an existing organization.
    async fn update_scores(
        &self,
        id: u64,
        relevance_score: f32,
        confidence_score: f32,
    ) -> StoreResult<()>;
}

/// Audit log of executed search queries.
#[async_trait]
pub trait QueryLog: Send + Sync {
    /// Record a query before execution; returns the record id.
    async fn record_query(&self, record: SearchQueryRecord) -> StoreResult<u64>;

    /// Fill in the result count once the provider has responded.
    async fn set_query_results(&self, id: u64, results_count: u32) -> StoreResult<()>;
}

/// Append-only sink for per-run metrics snapshots.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn save_run_metrics(&self, metrics: &RunMetrics) -> StoreResult<()>;
}

/// Persistence for extracted contacts.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Whether an equivalent contact already exists for the organization.
    async fn contact_exists(&self, contact: &Contact) -> StoreResult<bool>;

    async fn create_contact(&self, contact: Contact) -> StoreResult<u64>;
}

/// Persistence for discovered URLs and their organization links.
#[async_trait]
pub trait UrlStore: Send + Sync {
    /// URLs currently linked to the given organization.
    async fn urls_for_organization(&self, organization_id: u64) -> StoreResult<Vec<DiscoveredUrl>>;

    /// Clear a URL's organization link. The URL record itself survives.
    async fn unlink_url(&self, url_id: u64) -> StoreResult<()>;
}
