//! Report Data Structures

use chrono::{DateTime, Utc};
use gcbench_core::{
    Collector, HeapPair, Metric, RunConfiguration, RunRecord, RunStatus, SweepPairing,
};
use gcbench_stats::SummaryStatistics;
use serde::{Deserialize, Serialize};

/// Complete benchmark report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report metadata
    pub meta: ReportMeta,
    /// Ranked collectors, best first
    pub leaderboard: Vec<LeaderboardEntry>,
    /// One row per executed run, in run order
    pub rows: Vec<ResultRow>,
    /// Run counts and duration
    pub summary: ReportSummary,
}

impl Report {
    /// Collector identities in leaderboard order
    pub fn ranking(&self) -> Vec<Collector> {
        self.leaderboard.iter().map(|e| e.collector).collect()
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Report format version
    pub schema_version: u32,
    /// gcbench version
    pub version: String,
    /// Generation time
    pub timestamp: DateTime<Utc>,
    /// File name of the benchmarked artifact
    pub artifact: String,
    /// Host the runs executed on
    pub system: SystemInfo,
    /// Configuration echo
    pub config: ReportConfig,
}

/// Run configuration captured in report metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Repetitions per cell
    pub runs: u32,
    /// Initial heap size (MB)
    pub init_heap_mb: u32,
    /// Maximum heap size (MB)
    pub max_heap_mb: u32,
    /// Init-heap sweep step (MB)
    pub init_heap_increment_mb: u32,
    /// Max-heap sweep step (MB)
    pub max_heap_increment_mb: u32,
    /// Init-heap sweep bound (MB)
    pub init_heap_limit_mb: u32,
    /// Max-heap sweep bound (MB)
    pub max_heap_limit_mb: u32,
    /// Sweep combination policy
    pub pairing: SweepPairing,
    /// Tested collectors
    pub collectors: Vec<Collector>,
    /// Ranking metrics
    pub metrics: Vec<Metric>,
}

impl From<&RunConfiguration> for ReportConfig {
    fn from(config: &RunConfiguration) -> Self {
        Self {
            runs: config.runs(),
            init_heap_mb: config.init_heap(),
            max_heap_mb: config.max_heap(),
            init_heap_increment_mb: config.init_heap_increment(),
            max_heap_increment_mb: config.max_heap_increment(),
            init_heap_limit_mb: config.init_heap_limit(),
            max_heap_limit_mb: config.max_heap_limit(),
            pairing: config.pairing(),
            collectors: config.collectors().collect(),
            metrics: config.metrics().collect(),
        }
    }
}

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system
    pub os: String,
    /// Operating system version
    pub os_version: String,
    /// CPU model
    pub cpu: String,
    /// Logical cores
    pub cpu_cores: u32,
    /// Total memory (GB)
    pub memory_gb: f64,
    /// First line of `java -version`, when it could be obtained
    pub java_version: Option<String>,
}

/// Raw and normalised value of one ranking metric for one collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    /// Ranking metric
    pub metric: Metric,
    /// Aggregated value (seconds, fraction or pauses per run)
    pub value: f64,
    /// Min-max scaled value, 0 = best among ranked collectors
    pub scaled: f64,
}

/// Aggregated statistics and rank of one collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// 1-based position, best first
    pub rank: usize,
    /// Collector under test
    pub collector: Collector,
    /// Weighted mean of the scaled metrics, lower is better
    pub score: f64,
    /// Shortest total GC time of a run
    pub best_gc_time_secs: f64,
    /// Mean total GC time per run
    pub avg_gc_time_secs: f64,
    /// Mean fraction of wall time not spent in pauses
    pub avg_throughput: f64,
    /// Mean of the worst pause per run
    pub avg_latency_secs: f64,
    /// Minor pauses over all successful runs
    pub total_minor_pauses: u64,
    /// Full collections over all successful runs
    pub total_full_pauses: u64,
    /// Minor pauses per successful run
    pub avg_minor_pauses: f64,
    /// Full collections per successful run
    pub avg_full_pauses: f64,
    /// Runs that produced a measurement
    pub successful_runs: usize,
    /// Runs that failed
    pub failed_runs: usize,
    /// Distribution of GC time over successful runs
    pub gc_time: SummaryStatistics,
    /// One entry per requested metric
    pub metric_scores: Vec<MetricScore>,
}

/// One formatted result row.
///
/// Numeric cells are `None` when the run failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    /// Collector under test
    pub collector: Collector,
    /// 1-based repetition within the (collector, heap pair) cell
    pub repetition_index: u32,
    /// Heap bounds of the run
    pub heap: HeapPair,
    /// Total GC pause time
    pub gc_runtime_seconds: Option<f64>,
    /// Throughput in percent
    pub throughput_percent: Option<f64>,
    /// Full collections
    pub full_pause_count: Option<u32>,
    /// Minor pauses
    pub minor_pause_count: Option<u32>,
    /// Failure reason of a failed run
    pub failure: Option<String>,
}

impl ResultRow {
    /// Whether the row stems from a failed run
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

impl From<&RunRecord> for ResultRow {
    fn from(record: &RunRecord) -> Self {
        let descriptor = &record.descriptor;
        match &record.status {
            RunStatus::Succeeded => Self {
                collector: descriptor.collector,
                repetition_index: descriptor.repetition,
                heap: descriptor.heap,
                gc_runtime_seconds: Some(record.gc_time_secs),
                throughput_percent: Some(record.throughput * 100.0),
                full_pause_count: Some(record.full_pauses),
                minor_pause_count: Some(record.minor_pauses),
                failure: None,
            },
            RunStatus::Failed { kind, message } => Self {
                collector: descriptor.collector,
                repetition_index: descriptor.repetition,
                heap: descriptor.heap,
                gc_runtime_seconds: None,
                throughput_percent: None,
                full_pause_count: None,
                minor_pause_count: None,
                failure: Some(format!("{}: {}", kind, message)),
            },
        }
    }
}

/// Report summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Executed runs
    pub total_runs: usize,
    /// Runs that produced a measurement
    pub succeeded: usize,
    /// Runs that failed
    pub failed: usize,
    /// Collectors with at least one successful run
    pub ranked_collectors: usize,
    /// Collectors tested but left out of the ranking
    pub unranked_collectors: usize,
    /// Wall time of the orchestration
    pub total_duration_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcbench_core::{FailureKind, RunDescriptor};

    fn record(status: RunStatus) -> RunRecord {
        RunRecord {
            descriptor: RunDescriptor {
                sequence: 0,
                collector: Collector::G1,
                heap: HeapPair::new(64, 64),
                repetition: 2,
                repetitions: 3,
            },
            wall_time_secs: 1.0,
            elapsed_secs: 1.1,
            gc_time_secs: 0.25,
            minor_pauses: 7,
            full_pauses: 1,
            throughput: 0.75,
            latency_secs: 0.1,
            status,
            diagnostics: String::new(),
        }
    }

    #[test]
    fn test_row_from_successful_record() {
        let row = ResultRow::from(&record(RunStatus::Succeeded));
        assert_eq!(row.collector, Collector::G1);
        assert_eq!(row.repetition_index, 2);
        assert_eq!(row.gc_runtime_seconds, Some(0.25));
        assert_eq!(row.throughput_percent, Some(75.0));
        assert_eq!(row.full_pause_count, Some(1));
        assert_eq!(row.minor_pause_count, Some(7));
        assert!(!row.is_failed());
    }

    #[test]
    fn test_row_from_failed_record() {
        let row = ResultRow::from(&record(RunStatus::Failed {
            kind: FailureKind::Parse,
            message: "missing wall-time summary".to_string(),
        }));
        assert!(row.is_failed());
        assert_eq!(row.gc_runtime_seconds, None);
        assert_eq!(row.minor_pause_count, None);
        assert_eq!(
            row.failure.as_deref(),
            Some("parse: missing wall-time summary")
        );
    }
}
