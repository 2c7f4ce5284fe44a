//! Benchmark Orchestrator
//!
//! Drives the run matrix through the executor one descriptor at a time,
//! publishes progress, and aggregates the records once every descriptor has
//! been processed.
//!
//! State machine: `Idle → Running → {Succeeded, Failed}`.
//! - A failed run (bad exit, timeout, missing summary) is recorded and the
//!   sweep continues.
//! - A configuration error, an executor error (the JVM could not be spawned)
//!   or a cancellation ends the orchestration as `Failed`; no partial
//!   leaderboard is produced.

use crate::executor::{Aggregation, LeaderboardAggregator};
use crate::extractor::build_record;
use crate::planner::build_plan;
use crate::supervisor::RunExecutor;
use gcbench_core::{
    Collector, ConfigurationError, ProgressHandle, ProgressReporter, RunConfiguration, RunRecord,
    RunSettings, RunStatus, progress_channel,
};
use gcbench_report::{LeaderboardEntry, ResultRow};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;

/// File name of the orchestration log inside the output directory
pub const LOG_FILE_NAME: &str = "gcbench.log";

const MSG_SUCCEEDED: &str = "Analysis finished successfully!";
const MSG_FAILED: &str = "Analysis failed! Inspect the log for more details.";

/// Why an orchestration produced no leaderboard
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// Settings rejected before anything was spawned
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Another orchestration holds this orchestrator
    #[error("An analysis is already running")]
    AlreadyRunning,

    /// A run could not be executed at all
    #[error("Analysis aborted: {reason}")]
    Aborted {
        /// Underlying error
        reason: String,
    },

    /// Stopped through [`BenchmarkOrchestrator::cancel`]
    #[error("Analysis cancelled after {completed} of {total} runs")]
    Cancelled {
        /// Descriptors processed before the stop
        completed: usize,
        /// Descriptors in the matrix
        total: usize,
    },
}

/// Everything a successful orchestration produced
#[derive(Debug, Clone)]
pub struct BenchmarkOutcome {
    /// Configuration the matrix was expanded from
    pub config: RunConfiguration,
    /// Ranked collectors, best first
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Collectors without a successful run
    pub unranked: Vec<Collector>,
    /// One row per run, in run order
    pub rows: Vec<ResultRow>,
    /// Raw records, in run order
    pub records: Vec<RunRecord>,
    /// Per-run headers and diagnostic text
    pub log: String,
    /// Wall time of the whole orchestration
    pub duration: Duration,
}

impl BenchmarkOutcome {
    /// Collector identities in leaderboard order
    pub fn ranking(&self) -> Vec<Collector> {
        self.leaderboard.iter().map(|e| e.collector).collect()
    }

    /// Whether no run produced a measurement
    pub fn all_failed(&self) -> bool {
        self.records.iter().all(|r| r.is_failed())
    }

    /// Ranking and rows as computed by the aggregator
    pub fn aggregation(&self) -> Aggregation {
        Aggregation {
            leaderboard: self.leaderboard.clone(),
            unranked: self.unranked.clone(),
            rows: self.rows.clone(),
        }
    }
}

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const CANCELLING: u8 = 2;

/// Returns the orchestrator to idle when an orchestration ends, however it ends
struct RunningGuard<'a>(&'a AtomicU8);

impl<'a> RunningGuard<'a> {
    fn acquire(state: &'a AtomicU8) -> Result<Self, OrchestrationError> {
        state
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| OrchestrationError::AlreadyRunning)?;
        Ok(Self(state))
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(IDLE, Ordering::Release);
    }
}

/// Runs one orchestration at a time on top of a [`RunExecutor`]
pub struct BenchmarkOrchestrator<E> {
    executor: E,
    aggregator: LeaderboardAggregator,
    output_dir: Option<PathBuf>,
    reporter: ProgressReporter,
    progress: ProgressHandle,
    /// IDLE, RUNNING or CANCELLING
    state: AtomicU8,
}

impl<E: RunExecutor> BenchmarkOrchestrator<E> {
    /// Idle orchestrator on top of `executor`
    pub fn new(executor: E) -> Self {
        let (reporter, progress) = progress_channel();
        Self {
            executor,
            aggregator: LeaderboardAggregator::new(),
            output_dir: None,
            reporter,
            progress,
            state: AtomicU8::new(IDLE),
        }
    }

    /// Rank with a custom aggregator (e.g. metric weights)
    pub fn with_aggregator(mut self, aggregator: LeaderboardAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Write `gcbench.log` into `dir` at the end of every orchestration
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// The underlying executor
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Read-only progress observer
    pub fn progress(&self) -> ProgressHandle {
        self.progress.clone()
    }

    /// Whether an orchestration is in flight
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) != IDLE
    }

    /// Stop the in-flight orchestration once the current run finishes.
    ///
    /// Ignored when idle, so it never leaks into the next launch.
    pub fn cancel(&self) {
        let _ = self
            .state
            .compare_exchange(RUNNING, CANCELLING, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Validate `settings` and run the whole matrix.
    ///
    /// Nothing is spawned when the settings are rejected.
    pub fn launch(&self, settings: &RunSettings) -> Result<BenchmarkOutcome, OrchestrationError> {
        let _guard = RunningGuard::acquire(&self.state)?;
        let config = match RunConfiguration::validate(settings) {
            Ok(config) => config,
            Err(e) => {
                self.reporter.fail(e.to_string());
                return Err(e.into());
            }
        };
        self.orchestrate(config)
    }

    /// Run the whole matrix of an already validated configuration
    pub fn launch_validated(
        &self,
        config: RunConfiguration,
    ) -> Result<BenchmarkOutcome, OrchestrationError> {
        let _guard = RunningGuard::acquire(&self.state)?;
        self.orchestrate(config)
    }

    fn orchestrate(&self, config: RunConfiguration) -> Result<BenchmarkOutcome, OrchestrationError> {
        let start = Instant::now();

        if let Err(e) = config.artifact().check_readable() {
            self.reporter.fail(e.to_string());
            return Err(e.into());
        }

        let plan = build_plan(&config);
        let total = plan.len();
        let artifact = config.artifact();
        let mut log = String::new();
        let mut records = Vec::with_capacity(total);

        tracing::info!(
            "Analysing {} with {} runs ({} collectors x {} heap pairs x {} repetitions)",
            artifact.path().display(),
            total,
            config.collector_count(),
            plan.heap_pairs.len(),
            config.runs()
        );
        self.reporter.start(total, format!("Starting {} runs ...", total));

        for (index, descriptor) in plan.descriptors.iter().enumerate() {
            if self.state.load(Ordering::Acquire) == CANCELLING {
                tracing::warn!("Analysis cancelled after {} of {} runs", index, total);
                self.reporter.fail("cancelled");
                self.write_log(&log);
                return Err(OrchestrationError::Cancelled {
                    completed: index,
                    total,
                });
            }

            let label = format!("[{}/{}] {}", index + 1, total, descriptor);
            tracing::info!("Running {}", label);
            let _ = writeln!(log, "=== {} ===", label);

            let output = match self.executor.execute(descriptor, artifact) {
                Ok(output) => output,
                Err(e) => {
                    tracing::error!("{}: {}", label, e);
                    let _ = writeln!(log, "{}", e);
                    self.reporter.fail(format!("{} ({})", MSG_FAILED, e));
                    self.write_log(&log);
                    return Err(OrchestrationError::Aborted {
                        reason: e.to_string(),
                    });
                }
            };

            let _ = writeln!(log, "$ {}", output.command_line);
            log.push_str(&output.diagnostics);
            if !log.ends_with('\n') {
                log.push('\n');
            }

            let record = build_record(*descriptor, output, self.executor.timeout());
            if let RunStatus::Failed { kind, message } = &record.status {
                tracing::warn!("{} failed ({}): {}", label, kind, message);
                let _ = writeln!(log, "--- run failed ({}): {}", kind, message);
            }
            records.push(record);
            self.reporter.advance(label);
        }

        let metrics: Vec<_> = config.metrics().collect();
        let aggregation = match self.aggregator.aggregate(&records, &metrics) {
            Ok(aggregation) => aggregation,
            Err(e) => {
                tracing::error!("Ranking failed: {}", e);
                self.reporter.fail(format!("{} ({})", MSG_FAILED, e));
                self.write_log(&log);
                return Err(OrchestrationError::Aborted {
                    reason: e.to_string(),
                });
            }
        };

        let failed = records.iter().filter(|r| r.is_failed()).count();
        tracing::info!(
            "Finished {} runs ({} failed) in {:.1}s",
            total,
            failed,
            start.elapsed().as_secs_f64()
        );
        self.reporter.succeed(MSG_SUCCEEDED);
        self.write_log(&log);

        Ok(BenchmarkOutcome {
            config,
            leaderboard: aggregation.leaderboard,
            unranked: aggregation.unranked,
            rows: aggregation.rows,
            records,
            log,
            duration: start.elapsed(),
        })
    }

    fn write_log(&self, log: &str) {
        let Some(dir) = &self.output_dir else {
            return;
        };
        if let Err(e) = write_log_file(dir, log) {
            tracing::warn!("Failed to write {}: {}", dir.join(LOG_FILE_NAME).display(), e);
        }
    }
}

fn write_log_file(dir: &Path, log: &str) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(LOG_FILE_NAME), log)
}

impl<E: RunExecutor + 'static> BenchmarkOrchestrator<E> {
    /// Run [`launch`](Self::launch) on a dedicated thread
    pub fn spawn(
        self: &Arc<Self>,
        settings: RunSettings,
    ) -> Result<JoinHandle<Result<BenchmarkOutcome, OrchestrationError>>, OrchestrationError> {
        let orchestrator = Arc::clone(self);
        std::thread::Builder::new()
            .name("gcbench-orchestrator".to_string())
            .spawn(move || orchestrator.launch(&settings))
            .map_err(|e| OrchestrationError::Aborted {
                reason: format!("failed to start orchestrator thread: {}", e),
            })
    }
}
