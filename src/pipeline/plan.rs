//! Query planning — expanding the (category x region) matrix into an
//! ordered sequence of search queries.

use crate::types::DiscoveryConfig;

/// One entry of the query plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedQuery {
    pub category: String,
    pub region: String,
    pub query: String,
}

/// Stateless planner over a [`DiscoveryConfig`].
///
/// `plan` recomputes the full sequence from configuration on every call;
/// there is no cursor to restore. Ordering is categories outer, regions
/// middle, templates inner — the orchestrator's budget short-circuit
/// depends on this nesting.
pub struct QueryPlanner<'a> {
    config: &'a DiscoveryConfig,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(config: &'a DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Expand the plan, optionally restricted to a subset of categories
    /// and/or regions. `None` means "all configured".
    ///
    /// Unknown category names in the filter and categories with no
    /// templates are skipped with a warning, never an error.
    pub fn plan(
        &self,
        categories: Option<&[String]>,
        regions: Option<&[String]>,
    ) -> Vec<PlannedQuery> {
        if let Some(filter) = categories {
            for name in filter {
                if !self.config.categories.contains_key(name) {
                    tracing::warn!(category = %name, "unknown category in filter, skipping");
                }
            }
        }

        let regions: Vec<&str> = match regions {
            Some(r) => r.iter().map(String::as_str).collect(),
            None => self.config.regions.iter().map(String::as_str).collect(),
        };

        let mut plan = Vec::new();
        for (category, profile) in &self.config.categories {
            if let Some(filter) = categories {
                if !filter.contains(category) {
                    continue;
                }
            }
            if profile.templates.is_empty() {
                tracing::warn!(category = %category, "no query templates defined, skipping");
                continue;
            }
            for region in &regions {
                for template in &profile.templates {
                    plan.push(PlannedQuery {
                        category: category.clone(),
                        region: region.to_string(),
                        query: template.replace("{region}", region),
                    });
                }
            }
        }
        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CategoryProfile;

    fn config() -> DiscoveryConfig {
        DiscoveryConfig::new()
            .with_category(
                "water",
                CategoryProfile::new("Water Districts")
                    .with_template("water districts {region}")
                    .with_template("water treatment facilities {region}"),
            )
            .with_category("empty", CategoryProfile::new("Nothing Configured"))
            .with_category(
                "municipal",
                CategoryProfile::new("Municipalities").with_template("municipalities {region}"),
            )
            .with_regions(["Utah", "Nevada"])
    }

    #[test]
    fn nesting_is_category_region_template() {
        let config = config();
        let plan = QueryPlanner::new(&config).plan(None, None);

        let queries: Vec<&str> = plan.iter().map(|p| p.query.as_str()).collect();
        assert_eq!(
            queries,
            vec![
                "water districts Utah",
                "water treatment facilities Utah",
                "water districts Nevada",
                "water treatment facilities Nevada",
                "municipalities Utah",
                "municipalities Nevada",
            ]
        );
    }

    #[test]
    fn category_without_templates_is_skipped() {
        let config = config();
        let plan = QueryPlanner::new(&config).plan(None, None);
        assert!(plan.iter().all(|p| p.category != "empty"));
    }

    #[test]
    fn filters_restrict_the_matrix() {
        let config = config();
        let planner = QueryPlanner::new(&config);

        let plan = planner.plan(
            Some(&["municipal".to_string()]),
            Some(&["Utah".to_string()]),
        );
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].query, "municipalities Utah");

        // Unknown category filter yields an empty plan, not an error.
        let plan = planner.plan(Some(&["oil_gas".to_string()]), None);
        assert!(plan.is_empty());
    }

    #[test]
    fn plan_is_restartable() {
        let config = config();
        let planner = QueryPlanner::new(&config);
        assert_eq!(planner.plan(None, None), planner.plan(None, None));
    }
}
