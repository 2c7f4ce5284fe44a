#![warn(missing_docs)]
//! # gcbench
//!
//! Benchmark JVM garbage collectors against a Java application and rank them.
//!
//! gcbench runs the target program once per combination of collector, heap
//! configuration and repetition:
//! - **Run Matrix**: initial and maximum heap sweeps, crossed or paired, times every selected collector
//! - **Process Supervision**: one fresh JVM per run with a timeout and process-group kill
//! - **GC Log Extraction**: pauses, GC time, throughput and latency from unified GC logging
//! - **Leaderboard**: per-collector statistics, min-max scaled metrics and a weighted composite score
//! - **Export**: human-readable, JSON and CSV output plus a persistent history
//!
//! ## Quick Start
//!
//! ```ignore
//! use gcbench::{BenchmarkOrchestrator, ProcessRunner, RunnerOptions, RunSettings};
//!
//! let orchestrator = BenchmarkOrchestrator::new(ProcessRunner::new(RunnerOptions::default()));
//! let outcome = orchestrator.launch(&RunSettings::new("app.jar"))?;
//! for entry in &outcome.leaderboard {
//!     println!("{}) {} {:.3}", entry.rank, entry.collector, entry.score);
//! }
//! ```
//!
//! ## Custom Executors
//!
//! The orchestrator only talks to the JVM through [`RunExecutor`], so a fake
//! executor can replay recorded GC logs without spawning anything.

// Re-export core types
pub use gcbench_core::{
    Artifact, ArtifactKind, Collector, ConfigurationError, FailureKind, HeapPair, Metric, Phase,
    ProgressHandle, ProgressReporter, ProgressSnapshot, RunConfiguration, RunDescriptor, RunRecord,
    RunSettings, RunStatus, SweepPairing, progress_channel,
};

// Re-export stats
pub use gcbench_stats::{SummaryStatistics, compute_summary};

// Re-export report types
pub use gcbench_report::{
    CsvRow, HistoryEntry, HistoryStore, LeaderboardEntry, OutputFormat, Report, ResultRow,
    generate_csv_report, generate_json_report, read_csv_rows, write_csv_rows,
};

// Re-export the engine
pub use gcbench_cli::{
    Aggregation, BenchmarkOrchestrator, BenchmarkOutcome, ExecutionPlan, GcMetrics,
    GcbenchConfig, LeaderboardAggregator, OrchestrationError, ProcessRunner, RunExecutor, RunExit,
    RunOutput, RunnerOptions, SupervisorError, build_plan, build_record, build_report,
    configured_orchestrator, extract, format_human_output,
};

/// Run the gcbench CLI.
///
/// Call this from a binary's `main()`:
/// ```ignore
/// fn main() {
///     gcbench::run().unwrap();
/// }
/// ```
pub use gcbench_cli::run;
