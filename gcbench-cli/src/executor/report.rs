//! Report Building
//!
//! Assembles the complete report of a finished orchestration from its
//! aggregation and records.

use super::aggregate::Aggregation;
use super::metadata::build_report_meta;
use gcbench_core::{RunConfiguration, RunRecord};
use gcbench_report::{Report, ReportSummary};

/// Build a complete Report from an aggregated orchestration
pub fn build_report(
    config: &RunConfiguration,
    aggregation: &Aggregation,
    records: &[RunRecord],
    java_version: Option<String>,
    total_duration_ms: f64,
) -> Report {
    let failed = records.iter().filter(|r| r.is_failed()).count();
    let summary = ReportSummary {
        total_runs: records.len(),
        succeeded: records.len() - failed,
        failed,
        ranked_collectors: aggregation.leaderboard.len(),
        unranked_collectors: aggregation.unranked.len(),
        total_duration_ms,
    };

    Report {
        meta: build_report_meta(config, java_version),
        leaderboard: aggregation.leaderboard.clone(),
        rows: aggregation.rows.clone(),
        summary,
    }
}
