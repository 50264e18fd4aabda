//! Validated extension layer over the base orchestrator.
//!
//! Wraps [`DiscoveryOrchestrator`] to additionally gate extracted
//! contacts through validation before persistence, and to re-check the
//! organization/website pairing for URLs linked to an organization
//! after the fact. Validation outcomes are tracked additively in a
//! [`ValidationStats`] exposed alongside the base run metrics.

use std::sync::Mutex;

use crate::pipeline::orchestrator::DiscoveryOrchestrator;
use crate::traits::{
    ContactStore, MetricsSink, Model, OrganizationStore, QueryLog, SearchProvider, UrlStore,
};
use crate::types::{Contact, DiscoveryConfig, Organization, RunMetrics, ValidationStats};
use crate::validate::SiteValidator;

/// Organizations above this confidence skip re-validation entirely.
const SKIP_VALIDATION_CONFIDENCE: f32 = 0.9;

/// First names that mark a shared mailbox, not a person.
const PLACEHOLDER_NAMES: &[&str] = &[
    "contact", "info", "admin", "office", "support", "webmaster", "sales", "hello",
];

pub struct ValidatedDiscovery<P, M, S> {
    inner: DiscoveryOrchestrator<P, M, S>,
    validator: SiteValidator<M>,
    stats: Mutex<ValidationStats>,
}

impl<P, M, S> ValidatedDiscovery<P, M, S>
where
    P: SearchProvider,
    M: Model + Clone,
    S: OrganizationStore + QueryLog + MetricsSink + ContactStore + UrlStore,
{
    /// Wrap the standard pipeline with validation. The same model backend
    /// serves both classification and site validation; share it via
    /// `Arc` when the backend is expensive to clone.
    pub fn new(config: DiscoveryConfig, provider: P, model: M, store: S) -> Self {
        let validator = SiteValidator::new(model.clone()).with_retry(config.retry);
        Self {
            inner: DiscoveryOrchestrator::new(config, provider, model, store),
            validator,
            stats: Mutex::new(ValidationStats::default()),
        }
    }

    pub fn store(&self) -> &S {
        self.inner.store()
    }

    /// Snapshot of the validation counters so far.
    pub fn stats(&self) -> ValidationStats {
        *self.stats.lock().unwrap()
    }

    /// Run discovery, returning base metrics plus validation counters.
    pub async fn run_discovery(
        &self,
        categories: Option<&[String]>,
        regions: Option<&[String]>,
    ) -> (RunMetrics, ValidationStats) {
        let metrics = self.inner.run_discovery(categories, regions).await;
        let stats = self.stats();
        tracing::info!(
            orgs_validated = stats.orgs_validated,
            orgs_rejected = stats.orgs_rejected,
            orgs_improved = stats.orgs_improved,
            contacts_validated = stats.contacts_validated,
            contacts_rejected = stats.contacts_rejected,
            "validation totals"
        );
        (metrics, stats)
    }

    /// Filter a batch of extracted contacts down to the persistable ones.
    ///
    /// Rejects contacts with no usable identity and contacts whose first
    /// name is a shared-mailbox placeholder. Every contact seen counts
    /// toward `contacts_validated`; rejects also count toward
    /// `contacts_rejected`.
    pub fn batch_validate_contacts(&self, contacts: Vec<Contact>) -> Vec<Contact> {
        let total = contacts.len();
        let mut valid = Vec::with_capacity(total);

        for contact in contacts {
            let mut stats = self.stats.lock().unwrap();
            stats.contacts_validated += 1;

            if !contact.is_identifiable() {
                stats.contacts_rejected += 1;
                tracing::warn!(
                    organization_id = contact.organization_id,
                    "rejected contact without name or email"
                );
                continue;
            }
            if PLACEHOLDER_NAMES.contains(&contact.first_name.to_lowercase().as_str()) {
                stats.contacts_rejected += 1;
                tracing::warn!(
                    first_name = %contact.first_name,
                    email = %contact.email,
                    "rejected placeholder contact"
                );
                continue;
            }
            drop(stats);
            valid.push(contact);
        }

        if valid.len() < total {
            tracing::info!(
                passed = valid.len(),
                total,
                "contact batch validation complete"
            );
        }
        valid
    }

    /// Validate and persist a batch of contacts, skipping ones the store
    /// already holds. Returns the number created.
    pub async fn persist_contacts(&self, contacts: Vec<Contact>) -> u32 {
        let mut created = 0;
        for contact in self.batch_validate_contacts(contacts) {
            match self.store().contact_exists(&contact).await {
                Ok(true) => {
                    tracing::debug!(email = %contact.email, "contact already known");
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(error = %e, "contact existence check failed, skipping");
                    continue;
                }
            }
            match self.store().create_contact(contact).await {
                Ok(_) => created += 1,
                Err(e) => tracing::error!(error = %e, "contact create failed"),
            }
        }
        created
    }

    /// Re-check every URL linked to an organization against the
    /// organization itself. Invalid pairings are unlinked, never
    /// deleted. Returns how many URLs were unlinked.
    ///
    /// High-confidence organizations are taken at face value and not
    /// re-validated.
    pub async fn revalidate_organization_links(&self, org: &Organization) -> u32 {
        if org.confidence_score > SKIP_VALIDATION_CONFIDENCE {
            tracing::debug!(name = %org.name, "skipping re-validation of high-confidence organization");
            return 0;
        }

        let urls = match self.store().urls_for_organization(org.id).await {
            Ok(urls) => urls,
            Err(e) => {
                tracing::error!(error = %e, organization_id = org.id, "url lookup failed");
                return 0;
            }
        };
        if urls.is_empty() {
            return 0;
        }

        self.stats.lock().unwrap().orgs_validated += 1;

        let mut unlinked = 0;
        let mut best_confidence: f32 = 0.0;
        let mut any_valid = false;

        for url in &urls {
            let (is_valid, confidence) = self
                .validator
                .validate(&url.url, &org.name, Some(&org.region))
                .await;
            if is_valid {
                any_valid = true;
                best_confidence = best_confidence.max(confidence);
            } else {
                tracing::warn!(
                    url = %url.url,
                    org = %org.name,
                    "url may not belong to organization, unlinking"
                );
                if let Err(e) = self.store().unlink_url(url.id).await {
                    tracing::error!(error = %e, url_id = url.id, "unlink failed");
                } else {
                    unlinked += 1;
                }
            }
        }

        if !any_valid {
            self.stats.lock().unwrap().orgs_rejected += 1;
        } else if best_confidence > org.confidence_score {
            match self
                .store()
                .update_scores(org.id, org.relevance_score, best_confidence)
                .await
            {
                Ok(()) => {
                    self.stats.lock().unwrap().orgs_improved += 1;
                    tracing::info!(
                        name = %org.name,
                        old = org.confidence_score,
                        new = best_confidence,
                        "raised organization confidence after re-validation"
                    );
                }
                Err(e) => tracing::error!(error = %e, name = %org.name, "confidence update failed"),
            }
        }

        unlinked
    }
}
