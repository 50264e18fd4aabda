//! Human-readable run reports.
//!
//! One text file per run date (`discovery_<YYYYMMDD>.txt`), appended to
//! rather than truncated so multiple runs on the same day accumulate.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::types::RunMetrics;

/// Render the report body for one run.
pub fn render_report(metrics: &RunMetrics) -> String {
    let when = metrics
        .finished_at
        .unwrap_or(metrics.started_at)
        .format("%Y-%m-%d %H:%M:%S");

    format!(
        "\nDiscovery Report - {when}\n\
         =============================================================\n\n\
         Summary:\n\
         - Executed {queries} search queries\n\
         - Found {results} search results\n\
         - Discovered {orgs} organizations\n\
         - Runtime: {runtime} seconds\n\n\
         Organizations by Category:\n\
         {by_category}\n\n\
         Organizations by Region:\n\
         {by_region}\n",
        queries = metrics.search_queries_executed,
        results = metrics.search_results_found,
        orgs = metrics.organizations_discovered,
        runtime = metrics.runtime_seconds,
        by_category = format_breakdown(&metrics.by_category),
        by_region = format_breakdown(&metrics.by_region),
    )
}

/// Append the rendered report to the per-date file under `dir`,
/// creating the directory and file as needed. Returns the file path.
pub fn append_report(dir: &Path, metrics: &RunMetrics) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let date = metrics
        .finished_at
        .unwrap_or(metrics.started_at)
        .format("%Y%m%d");
    let path = dir.join(format!("discovery_{date}.txt"));

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
    file.write_all(render_report(metrics).as_bytes())?;
    Ok(path)
}

fn format_breakdown(data: &IndexMap<String, u32>) -> String {
    if data.is_empty() {
        return "- (none)".to_string();
    }
    data.iter()
        .map(|(k, v)| format!("- {k}: {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}
