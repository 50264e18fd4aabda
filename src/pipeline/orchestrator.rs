//! The discovery run loop: plan, search, classify, upsert, report.

use std::time::Duration;

use crate::classify::RelevanceClassifier;
use crate::pipeline::generate::CandidateGenerator;
use crate::pipeline::plan::QueryPlanner;
use crate::pipeline::report::append_report;
use crate::traits::{MetricsSink, Model, OrganizationStore, QueryLog, SearchProvider};
use crate::types::{DiscoveryConfig, NewOrganization, RunMetrics, SearchQueryRecord};

/// Drives one discovery run end to end.
///
/// The run walks the planned query matrix in order, classifying and
/// upserting after every query so partial progress is durable. Per-query
/// and per-record failures are logged and skipped; the only thing that
/// halts the walk early is the `max_orgs` budget. Metrics are persisted
/// and the report written on every exit path.
pub struct DiscoveryOrchestrator<P, M, S> {
    config: DiscoveryConfig,
    generator: CandidateGenerator<P>,
    classifier: RelevanceClassifier<M>,
    store: S,
}

impl<P, M, S> DiscoveryOrchestrator<P, M, S>
where
    P: SearchProvider,
    M: Model,
    S: OrganizationStore + QueryLog + MetricsSink,
{
    pub fn new(config: DiscoveryConfig, provider: P, model: M, store: S) -> Self {
        let classifier = RelevanceClassifier::new(model)
            .with_classify_delay(config.classify_delay)
            .with_retry(config.retry);
        Self {
            config,
            generator: CandidateGenerator::new(provider),
            classifier,
            store,
        }
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Execute a discovery run over the configured matrix, optionally
    /// restricted to a subset of categories and/or regions.
    pub async fn run_discovery(
        &self,
        categories: Option<&[String]>,
        regions: Option<&[String]>,
    ) -> RunMetrics {
        let mut metrics = RunMetrics::start();
        let plan = QueryPlanner::new(&self.config).plan(categories, regions);
        tracing::info!(
            run_id = %metrics.run_id,
            queries = plan.len(),
            max_orgs = self.config.max_orgs,
            "starting discovery run"
        );

        let mut created_total: u32 = 0;

        for (i, planned) in plan.iter().enumerate() {
            let record = SearchQueryRecord::new(
                planned.query.as_str(),
                planned.category.as_str(),
                planned.region.as_str(),
                self.generator.provider_name(),
            );
            let record_id = match self.store.record_query(record).await {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::error!(error = %e, query = %planned.query, "failed to log query");
                    None
                }
            };
            metrics.search_queries_executed += 1;

            let candidates = self
                .generator
                .fetch_all(&planned.query, self.config.max_results_per_query)
                .await;
            metrics.search_results_found += candidates.len() as u32;

            if let Some(id) = record_id {
                if let Err(e) = self.store.set_query_results(id, candidates.len() as u32).await {
                    tracing::error!(error = %e, "failed to record query results");
                }
            }

            if candidates.is_empty() {
                tracing::warn!(query = %planned.query, "no results for query");
            } else if let Some(profile) = self.config.categories.get(&planned.category) {
                let orgs = self
                    .classifier
                    .batch_classify(&candidates, &planned.category, profile, &planned.region)
                    .await;

                let remaining = self.config.max_orgs - created_total;
                let created = self.upsert_organizations(orgs, remaining).await;
                created_total += created;
                metrics.record_discovered(&planned.category, &planned.region, created);
            }

            if created_total >= self.config.max_orgs {
                tracing::info!(
                    created = created_total,
                    "organization budget reached, ending run early"
                );
                break;
            }

            if i + 1 < plan.len() && !self.config.inter_query_delay.is_zero() {
                tokio::time::sleep(self.config.inter_query_delay).await;
            }
        }

        metrics.finish();
        if let Err(e) = self.store.save_run_metrics(&metrics).await {
            tracing::error!(error = %e, "failed to persist run metrics");
        }
        if let Some(dir) = &self.config.report_dir {
            match append_report(dir, &metrics) {
                Ok(path) => tracing::info!(path = %path.display(), "report written"),
                Err(e) => tracing::error!(error = %e, "failed to write report"),
            }
        }

        tracing::info!(
            run_id = %metrics.run_id,
            queries = metrics.search_queries_executed,
            results = metrics.search_results_found,
            organizations = metrics.organizations_discovered,
            runtime_seconds = metrics.runtime_seconds,
            "discovery run complete"
        );
        metrics
    }

    /// Upsert classified organizations against the `(name, region)`
    /// identity, creating at most `remaining` new records.
    ///
    /// Dedup hits are merged monotonically: stored scores are raised only
    /// when the incoming relevance is strictly higher. Returns the number
    /// of organizations actually created.
    async fn upsert_organizations(&self, orgs: Vec<NewOrganization>, remaining: u32) -> u32 {
        let mut created = 0;

        for org in orgs {
            match self
                .store
                .find_by_name_and_region(&org.name, &org.region)
                .await
            {
                Ok(Some(existing)) => {
                    if org.relevance_score > existing.relevance_score {
                        match self
                            .store
                            .update_scores(existing.id, org.relevance_score, org.confidence_score)
                            .await
                        {
                            Ok(()) => tracing::info!(
                                name = %org.name,
                                old = existing.relevance_score,
                                new = org.relevance_score,
                                "updated organization scores"
                            ),
                            Err(e) => {
                                tracing::error!(error = %e, name = %org.name, "score update failed")
                            }
                        }
                    } else {
                        tracing::debug!(name = %org.name, region = %org.region, "already known");
                    }
                }
                Ok(None) => {
                    if created >= remaining {
                        tracing::info!(name = %org.name, "budget exhausted, discarding candidate");
                        continue;
                    }
                    let name = org.name.clone();
                    match self.store.create_organization(org).await {
                        Ok(saved) => {
                            created += 1;
                            tracing::info!(name = %saved.name, id = saved.id, "created organization");
                        }
                        Err(e) => tracing::error!(error = %e, name = %name, "create failed"),
                    }
                }
                Err(e) => tracing::error!(error = %e, name = %org.name, "dedup lookup failed"),
            }
        }

        created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;
    use crate::testing::MockModel;
    use crate::traits::MockSearchProvider;
    use crate::types::{Candidate, CategoryProfile, SearchPage};

    fn test_config() -> DiscoveryConfig {
        DiscoveryConfig::new()
            .with_category(
                "water",
                CategoryProfile::new("Water Districts")
                    .with_template("water districts {region}")
                    .with_keywords(["water", "district"]),
            )
            .with_regions(["Utah"])
            .with_delays(Duration::ZERO, Duration::ZERO)
    }

    fn one_candidate_page(name: &str) -> SearchPage {
        SearchPage::last(vec![Candidate::new(
            name,
            "water district serving the region",
            format!("https://{}.org", name.to_lowercase().replace(' ', "")),
        )])
    }

    #[tokio::test]
    async fn run_creates_relevant_organizations() {
        let provider = MockSearchProvider::new()
            .with_page("water districts Utah", one_candidate_page("Acme Water District"));
        let model = MockModel::new().with_response(
            r#"{"is_relevant": true, "organization_name": "Acme Water District",
                "confidence_score": 0.9, "relevance_score": 0.9}"#,
        );
        let orchestrator =
            DiscoveryOrchestrator::new(test_config(), provider, model, MemoryStore::new());

        let metrics = orchestrator.run_discovery(None, None).await;

        assert_eq!(metrics.search_queries_executed, 1);
        assert_eq!(metrics.search_results_found, 1);
        assert_eq!(metrics.organizations_discovered, 1);
        assert_eq!(orchestrator.store().organization_count(), 1);
        assert_eq!(orchestrator.store().saved_metrics().len(), 1);
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let provider = MockSearchProvider::new()
            .with_page("water districts Utah", one_candidate_page("Acme Water District"));
        let model = MockModel::new().with_response(
            r#"{"is_relevant": true, "organization_name": "Acme Water District",
                "confidence_score": 0.9, "relevance_score": 0.9}"#,
        );
        let orchestrator =
            DiscoveryOrchestrator::new(test_config(), provider, model, MemoryStore::new());

        orchestrator.run_discovery(None, None).await;
        let second = orchestrator.run_discovery(None, None).await;

        assert_eq!(second.organizations_discovered, 0);
        assert_eq!(orchestrator.store().organization_count(), 1);
    }

    #[tokio::test]
    async fn merge_is_monotonic() {
        let provider = MockSearchProvider::new()
            .with_page("water districts Utah", one_candidate_page("Acme Water District"));
        let model = MockModel::new()
            .with_responses([
                r#"{"is_relevant": true, "organization_name": "Acme Water District",
                    "confidence_score": 0.5, "relevance_score": 0.5}"#,
                r#"{"is_relevant": true, "organization_name": "Acme Water District",
                    "confidence_score": 0.8, "relevance_score": 0.8}"#,
                r#"{"is_relevant": true, "organization_name": "Acme Water District",
                    "confidence_score": 0.3, "relevance_score": 0.3}"#,
            ]);
        let orchestrator =
            DiscoveryOrchestrator::new(test_config(), provider, model, MemoryStore::new());

        orchestrator.run_discovery(None, None).await;
        orchestrator.run_discovery(None, None).await;
        orchestrator.run_discovery(None, None).await;

        let org = orchestrator
            .store()
            .find_organization("Acme Water District", "Utah")
            .unwrap();
        assert!((org.relevance_score - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn budget_caps_creation_mid_batch() {
        let page = SearchPage::last(
            (0..8)
                .map(|i| {
                    Candidate::new(
                        format!("District {i}"),
                        "water district",
                        format!("https://district{i}.org"),
                    )
                })
                .collect(),
        );
        let provider = MockSearchProvider::new().with_page("water districts Utah", page);
        let model =
            MockModel::new().with_response(r#"{"is_relevant": true, "confidence_score": 0.9}"#);
        let config = test_config().with_max_orgs(5);
        let orchestrator = DiscoveryOrchestrator::new(config, provider, model, MemoryStore::new());

        let metrics = orchestrator.run_discovery(None, None).await;

        assert_eq!(metrics.organizations_discovered, 5);
        assert_eq!(orchestrator.store().organization_count(), 5);
        // Metrics and the stored snapshot survive the early exit.
        assert_eq!(orchestrator.store().saved_metrics().len(), 1);
        assert!(metrics.finished_at.is_some());
    }

    #[tokio::test]
    async fn empty_queries_do_not_abort_the_run() {
        let config = test_config().with_regions(["Utah", "Nevada"]);
        let provider = MockSearchProvider::new()
            .with_page("water districts Nevada", one_candidate_page("Silver State Water"));
        let model =
            MockModel::new().with_response(r#"{"is_relevant": true, "confidence_score": 0.9}"#);
        let orchestrator = DiscoveryOrchestrator::new(config, provider, model, MemoryStore::new());

        let metrics = orchestrator.run_discovery(None, None).await;

        // Utah returned nothing; Nevada still produced an organization.
        assert_eq!(metrics.search_queries_executed, 2);
        assert_eq!(metrics.organizations_discovered, 1);
    }
}
