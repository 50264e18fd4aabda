//! Run metrics and audit records.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metrics snapshot for one discovery run.
///
/// Accumulated while the run executes and persisted exactly once when
/// it finishes; the stored snapshot is append-only and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Identifier of this run.
    pub run_id: Uuid,

    /// Queries sent to the search provider.
    pub search_queries_executed: u32,

    /// Raw results returned across all queries.
    pub search_results_found: u32,

    /// Organizations created (dedup misses only; score-raising merges
    /// do not count as new).
    pub organizations_discovered: u32,

    /// New organizations broken down by category.
    pub by_category: IndexMap<String, u32>,

    /// New organizations broken down by region.
    pub by_region: IndexMap<String, u32>,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Wall-clock runtime, filled in at completion.
    pub runtime_seconds: u64,
}

impl RunMetrics {
    /// Start a fresh metrics record for a new run.
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            search_queries_executed: 0,
            search_results_found: 0,
            organizations_discovered: 0,
            by_category: IndexMap::new(),
            by_region: IndexMap::new(),
            started_at: Utc::now(),
            finished_at: None,
            runtime_seconds: 0,
        }
    }

    /// Record `count` newly created organizations for a (category, region).
    pub fn record_discovered(&mut self, category: &str, region: &str, count: u32) {
        if count == 0 {
            return;
        }
        self.organizations_discovered += count;
        *self.by_category.entry(category.to_string()).or_insert(0) += count;
        *self.by_region.entry(region.to_string()).or_insert(0) += count;
    }

    /// Close the run, computing elapsed wall-clock time.
    pub fn finish(&mut self) {
        let now = Utc::now();
        self.runtime_seconds = (now - self.started_at).num_seconds().max(0) as u64;
        self.finished_at = Some(now);
    }
}

/// Audit record for one executed search query.
///
/// Created before the provider is called (`results_count` unset) and
/// updated exactly once after it responds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQueryRecord {
    pub query: String,
    pub category: String,
    pub region: String,
    /// Which provider ran the query (e.g. "google").
    pub provider: String,
    pub results_count: Option<u32>,
}

impl SearchQueryRecord {
    pub fn new(
        query: impl Into<String>,
        category: impl Into<String>,
        region: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            category: category.into(),
            region: region.into(),
            provider: provider.into(),
            results_count: None,
        }
    }
}

/// Counters tracked by the validated extension layer, additively
/// across a run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ValidationStats {
    pub orgs_validated: u32,
    pub orgs_rejected: u32,
    /// Organizations whose stored confidence was raised by re-validation.
    pub orgs_improved: u32,
    pub contacts_validated: u32,
    pub contacts_rejected: u32,
}
