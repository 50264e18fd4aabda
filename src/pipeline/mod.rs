//! The discovery pipeline: planning, candidate generation, run
//! orchestration, and reporting.

pub mod generate;
pub mod orchestrator;
pub mod plan;
pub mod report;
pub mod validated;

pub use generate::CandidateGenerator;
pub use orchestrator::DiscoveryOrchestrator;
pub use plan::{PlannedQuery, QueryPlanner};
pub use report::{append_report, render_report};
pub use validated::ValidatedDiscovery;
