//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use chrono::Utc;

use crate::error::{StoreError, StoreResult};
use crate::traits::{ContactStore, MetricsSink, OrganizationStore, QueryLog, UrlStore};
use crate::types::{
    Contact, DiscoveredUrl, NewOrganization, Organization, RunMetrics, SearchQueryRecord,
};

/// In-memory store for the whole persistence surface.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart. Enforces the `(name, region)` uniqueness
/// constraint the same way a database unique index would.
pub struct MemoryStore {
    organizations: RwLock<HashMap<u64, Organization>>,
    queries: RwLock<HashMap<u64, SearchQueryRecord>>,
    metrics: RwLock<Vec<RunMetrics>>,
    contacts: RwLock<HashMap<u64, Contact>>,
    urls: RwLock<HashMap<u64, DiscoveredUrl>>,
    next_id: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            organizations: RwLock::new(HashMap::new()),
            queries: RwLock::new(HashMap::new()),
            metrics: RwLock::new(Vec::new()),
            contacts: RwLock::new(HashMap::new()),
            urls: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Number of stored organizations.
    pub fn organization_count(&self) -> usize {
        self.organizations.read().unwrap().len()
    }

    /// Synchronous lookup by the `(name, region)` identity.
    pub fn find_organization(&self, name: &str, region: &str) -> Option<Organization> {
        self.organizations
            .read()
            .unwrap()
            .values()
            .find(|o| o.name == name && o.region == region)
            .cloned()
    }

    /// All persisted run metrics, in save order.
    pub fn saved_metrics(&self) -> Vec<RunMetrics> {
        self.metrics.read().unwrap().clone()
    }

    /// Recorded query audit rows, unordered.
    pub fn recorded_queries(&self) -> Vec<SearchQueryRecord> {
        self.queries.read().unwrap().values().cloned().collect()
    }

    /// Number of stored contacts.
    pub fn contact_count(&self) -> usize {
        self.contacts.read().unwrap().len()
    }

    /// Insert a discovered URL, optionally linked to an organization.
    /// Returns the URL id.
    pub fn link_url(&self, url: &str, title: &str, organization_id: Option<u64>) -> u64 {
        let id = self.allocate_id();
        self.urls.write().unwrap().insert(
            id,
            DiscoveredUrl {
                id,
                url: url.to_string(),
                title: title.to_string(),
                organization_id,
            },
        );
        id
    }

    /// Whether a URL record exists, linked or not.
    pub fn url_exists(&self, url_id: u64) -> bool {
        self.urls.read().unwrap().contains_key(&url_id)
    }
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn find_by_name_and_region(
        &self,
        name: &str,
        region: &str,
    ) -> StoreResult<Option<Organization>> {
        Ok(self.find_organization(name, region))
    }

    async fn create_organization(&self, org: NewOrganization) -> StoreResult<Organization> {
        let mut organizations = self.organizations.write().unwrap();
        if organizations
            .values()
            .any(|o| o.name == org.name && o.region == org.region)
        {
            return Err(StoreError::DuplicateOrganization {
                name: org.name,
                region: org.region,
            });
        }

        let id = self.allocate_id();
        let record = Organization {
            id,
            name: org.name,
            org_type: org.org_type,
            region: org.region,
            website: org.website,
            confidence_score: org.confidence_score,
            relevance_score: org.relevance_score,
            source_url: org.source_url,
            discovery_method: org.discovery_method,
            discovery_date: Utc::now(),
            description: org.description,
        };
        organizations.insert(id, record.clone());
        Ok(record)
    }

    async fn update_scores(
        &self,
        id: u64,
        relevance_score: f32,
        confidence_score: f32,
    ) -> StoreResult<()> {
        let mut organizations = self.organizations.write().unwrap();
        let org = organizations
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("organization {id}")))?;
        org.relevance_score = relevance_score;
        org.confidence_score = confidence_score;
        Ok(())
    }
}

#[async_trait]
impl QueryLog for MemoryStore {
    async fn record_query(&self, record: SearchQueryRecord) -> StoreResult<u64> {
        let id = self.allocate_id();
        self.queries.write().unwrap().insert(id, record);
        Ok(id)
    }

    async fn set_query_results(&self, id: u64, results_count: u32) -> StoreResult<()> {
        let mut queries = self.queries.write().unwrap();
        let record = queries
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("query record {id}")))?;
        record.results_count = Some(results_count);
        Ok(())
    }
}

#[async_trait]
impl MetricsSink for MemoryStore {
    async fn save_run_metrics(&self, metrics: &RunMetrics) -> StoreResult<()> {
        self.metrics.write().unwrap().push(metrics.clone());
        Ok(())
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn contact_exists(&self, contact: &Contact) -> StoreResult<bool> {
        Ok(self.contacts.read().unwrap().values().any(|c| {
            c.organization_id == contact.organization_id
                && ((!contact.email.is_empty() && c.email == contact.email)
                    || (c.first_name == contact.first_name && c.last_name == contact.last_name))
        }))
    }

    async fn create_contact(&self, contact: Contact) -> StoreResult<u64> {
        let id = self.allocate_id();
        self.contacts.write().unwrap().insert(id, contact);
        Ok(id)
    }
}

#[async_trait]
impl UrlStore for MemoryStore {
    async fn urls_for_organization(&self, organization_id: u64) -> StoreResult<Vec<DiscoveredUrl>> {
        Ok(self
            .urls
            .read()
            .unwrap()
            .values()
            .filter(|u| u.organization_id == Some(organization_id))
            .cloned()
            .collect())
    }

    async fn unlink_url(&self, url_id: u64) -> StoreResult<()> {
        let mut urls = self.urls.write().unwrap();
        let url = urls
            .get_mut(&url_id)
            .ok_or_else(|| StoreError::NotFound(format!("url {url_id}")))?;
        url.organization_id = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_org(name: &str, region: &str) -> NewOrganization {
        NewOrganization {
            name: name.to_string(),
            org_type: "water".to_string(),
            region: region.to_string(),
            website: "https://example.org".to_string(),
            confidence_score: 0.8,
            relevance_score: 0.7,
            source_url: "https://example.org".to_string(),
            discovery_method: "classified_search".to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn duplicate_name_region_is_rejected() {
        let store = MemoryStore::new();
        store.create_organization(new_org("Acme", "Utah")).await.unwrap();

        // Same name in a different region is a distinct organization.
        store.create_organization(new_org("Acme", "Nevada")).await.unwrap();

        let err = store
            .create_organization(new_org("Acme", "Utah"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateOrganization { .. }));
        assert_eq!(store.organization_count(), 2);
    }

    #[tokio::test]
    async fn update_scores_mutates_in_place() {
        let store = MemoryStore::new();
        let org = store.create_organization(new_org("Acme", "Utah")).await.unwrap();

        store.update_scores(org.id, 0.95, 0.9).await.unwrap();

        let stored = store.find_organization("Acme", "Utah").unwrap();
        assert!((stored.relevance_score - 0.95).abs() < 1e-6);
        assert_eq!(stored.id, org.id);
    }

    #[tokio::test]
    async fn query_log_round_trip() {
        let store = MemoryStore::new();
        let id = store
            .record_query(SearchQueryRecord::new("water districts Utah", "water", "Utah", "mock"))
            .await
            .unwrap();
        store.set_query_results(id, 12).await.unwrap();

        let recorded = store.recorded_queries();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].results_count, Some(12));
    }

    #[tokio::test]
    async fn unlink_preserves_url_record() {
        let store = MemoryStore::new();
        let org = store.create_organization(new_org("Acme", "Utah")).await.unwrap();
        let url_id = store.link_url("https://news.example/acme", "Acme story", Some(org.id));

        store.unlink_url(url_id).await.unwrap();

        assert!(store.urls_for_organization(org.id).await.unwrap().is_empty());
        assert!(store.url_exists(url_id));
    }

    #[tokio::test]
    async fn contact_dedup_matches_email_or_name() {
        let store = MemoryStore::new();
        let contact = Contact {
            organization_id: 1,
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@acme.org".into(),
            confidence: 0.8,
            ..Default::default()
        };
        store.create_contact(contact.clone()).await.unwrap();

        assert!(store.contact_exists(&contact).await.unwrap());

        let same_name = Contact {
            email: "j.doe@acme.org".into(),
            ..contact.clone()
        };
        assert!(store.contact_exists(&same_name).await.unwrap());

        let other_org = Contact {
            organization_id: 2,
            ..contact
        };
        assert!(!store.contact_exists(&other_org).await.unwrap());
    }
}
