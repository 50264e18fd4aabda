//! Configuration for the discovery pipeline.

use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Profile for one target organization category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryProfile {
    /// Human description used in classifier prompts
    /// (e.g. "Water and Wastewater Districts").
    pub description: String,

    /// Query templates; `{region}` is substituted per target region.
    pub templates: Vec<String>,

    /// Keywords for the fallback classifier.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CategoryProfile {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// Add a query template.
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.templates.push(template.into());
        self
    }

    /// Add classification keywords.
    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keywords.extend(keywords.into_iter().map(|k| k.into()));
        self
    }
}

/// Bounded retry policy for rate-limited external calls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum attempts, including the first.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RetryPolicy {
    /// Exponential backoff before retry number `retry` (0-based):
    /// `2^retry + 1` seconds.
    pub fn backoff(&self, retry: u32) -> Duration {
        Duration::from_secs(2u64.saturating_pow(retry) + 1)
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Category name -> profile, in plan order.
    pub categories: IndexMap<String, CategoryProfile>,

    /// Target regions, in plan order.
    pub regions: Vec<String>,

    /// Hard ceiling on organizations created per run.
    pub max_orgs: u32,

    /// Per-query cap on raw results collected.
    pub max_results_per_query: usize,

    /// Delay between successive search queries. Required to avoid
    /// provider throttling; do not set to zero in production.
    pub inter_query_delay: Duration,

    /// Delay between successive classifier calls within a batch.
    pub classify_delay: Duration,

    /// Retry policy for rate-limited model calls.
    pub retry: RetryPolicy,

    /// Where to append per-date text reports. None disables reports.
    pub report_dir: Option<PathBuf>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            categories: IndexMap::new(),
            regions: Vec::new(),
            max_orgs: 50,
            max_results_per_query: 100,
            inter_query_delay: Duration::from_secs(2),
            classify_delay: Duration::from_millis(500),
            retry: RetryPolicy::default(),
            report_dir: None,
        }
    }
}

impl DiscoveryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category profile.
    pub fn with_category(mut self, name: impl Into<String>, profile: CategoryProfile) -> Self {
        self.categories.insert(name.into(), profile);
        self
    }

    /// Set target regions.
    pub fn with_regions(mut self, regions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.regions = regions.into_iter().map(|r| r.into()).collect();
        self
    }

    /// Set the organizations-per-run ceiling.
    pub fn with_max_orgs(mut self, max: u32) -> Self {
        self.max_orgs = max;
        self
    }

    /// Set the per-query result cap.
    pub fn with_max_results_per_query(mut self, max: usize) -> Self {
        self.max_results_per_query = max;
        self
    }

    /// Override both throttling delays (useful in tests).
    pub fn with_delays(mut self, inter_query: Duration, classify: Duration) -> Self {
        self.inter_query_delay = inter_query;
        self.classify_delay = classify;
        self
    }

    /// Enable text reports under `dir`.
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = Some(dir.into());
        self
    }

    /// The stock category/region matrix the system ships with.
    pub fn standard() -> Self {
        let mut config = Self::new().with_regions([
            "Utah",
            "Illinois",
            "Arizona",
            "Missouri",
            "New Mexico",
            "Nevada",
        ]);

        config.categories.insert(
            "engineering".into(),
            CategoryProfile::new("Engineering Firms")
                .with_template("engineering firms {region}")
                .with_template("civil engineering companies {region}")
                .with_template("electrical engineering consultants {region}")
                .with_keywords(["engineering", "design", "consultant", "technical services"]),
        );
        config.categories.insert(
            "government".into(),
            CategoryProfile::new("Government Agencies")
                .with_template("government agencies {region} infrastructure")
                .with_template("state agencies {region} water management")
                .with_template("regulatory agencies {region} utilities")
                .with_keywords(["agency", "department", "bureau", "government", "regulatory"]),
        );
        config.categories.insert(
            "municipal".into(),
            CategoryProfile::new("Municipalities")
                .with_template("municipalities {region} public works")
                .with_template("city government {region} water department")
                .with_template("local government {region} utilities")
                .with_keywords(["city of", "town of", "municipal", "public works"]),
        );
        config.categories.insert(
            "water".into(),
            CategoryProfile::new("Water and Wastewater Districts")
                .with_template("water districts {region}")
                .with_template("water treatment facilities {region}")
                .with_template("wastewater management {region}")
                .with_keywords(["water", "wastewater", "treatment", "reclamation", "district"]),
        );
        config.categories.insert(
            "utility".into(),
            CategoryProfile::new("Utility Companies")
                .with_template("utility companies {region}")
                .with_template("power generation companies {region}")
                .with_template("electrical utilities {region}")
                .with_keywords(["utility", "power", "electric", "energy", "distribution"]),
        );
        config.categories.insert(
            "transportation".into(),
            CategoryProfile::new("Transportation Authorities")
                .with_template("transportation authority {region}")
                .with_template("transit agency {region}")
                .with_template("traffic management {region}")
                .with_keywords(["transportation", "transit", "traffic", "highway"]),
        );

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_exponentially() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(2));
        assert_eq!(policy.backoff(1), Duration::from_secs(3));
        assert_eq!(policy.backoff(2), Duration::from_secs(5));
    }

    #[test]
    fn standard_config_has_ordered_categories() {
        let config = DiscoveryConfig::standard();
        let names: Vec<_> = config.categories.keys().cloned().collect();
        assert_eq!(names[0], "engineering");
        assert!(names.contains(&"water".to_string()));
        assert_eq!(config.regions[0], "Utah");
        assert_eq!(config.max_orgs, 50);
    }
}
