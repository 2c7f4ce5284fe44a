#![warn(missing_docs)]
//! gcbench CLI Library
//!
//! Orchestration engine and command line front end. A benchmark analysis
//! expands the run matrix (collectors x heap pairs x repetitions), runs the
//! target artifact once per descriptor in a fresh JVM, extracts GC metrics
//! from each run's log and ranks the collectors on a leaderboard.
//!
//! # Example
//!
//! ```ignore
//! fn main() {
//!     if let Err(e) = gcbench_cli::run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

mod config;
mod executor;
mod extractor;
mod orchestrator;
mod planner;
mod supervisor;

pub use config::*;
pub use executor::{
    Aggregation, LeaderboardAggregator, build_report, build_report_meta, detect_java_version,
    format_history, format_human_output, format_plan,
};
pub use extractor::{GcMetrics, build_record, extract};
pub use orchestrator::*;
pub use planner::{ExecutionPlan, build_plan, heap_pairs};
pub use supervisor::*;

use clap::{Args, Parser, Subcommand};
use gcbench_core::{
    Collector, ConfigurationError, Metric, RunConfiguration, RunSettings, SweepPairing,
};
use gcbench_report::{
    HistoryEntry, HistoryStore, OutputFormat, generate_csv_report, generate_json_report,
    write_csv_rows,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// File name of the CSV export inside the output directory
pub const CSV_FILE_NAME: &str = "gcbench-results.csv";

/// Interval between progress bar refreshes
const PROGRESS_POLL: Duration = Duration::from_millis(50);

/// gcbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "gcbench")]
#[command(
    author,
    version,
    about = "gcbench - rank JVM garbage collectors across heap sizes"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: discover gcbench.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the benchmark analysis and print the leaderboard
    Run(RunArgs),
    /// List the run matrix without executing it
    Plan(SweepArgs),
    /// Show the recorded history
    History {
        /// History file (default: from gcbench.toml)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Write a default gcbench.toml into the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run matrix overrides; unset flags keep the gcbench.toml values
#[derive(Args, Debug, Clone)]
pub struct SweepArgs {
    /// Java application: a `.jar` or a `.class` file
    pub artifact: PathBuf,

    /// Repetitions per collector and heap pair
    #[arg(short = 'n', long)]
    pub runs: Option<u32>,

    /// Initial heap size in MB
    #[arg(long)]
    pub init_heap: Option<u32>,

    /// Maximum heap size in MB
    #[arg(long)]
    pub max_heap: Option<u32>,

    /// Init-heap sweep step in MB
    #[arg(long)]
    pub init_heap_increment: Option<u32>,

    /// Max-heap sweep step in MB
    #[arg(long)]
    pub max_heap_increment: Option<u32>,

    /// Upper bound of the init-heap sweep in MB
    #[arg(long)]
    pub init_heap_limit: Option<u32>,

    /// Upper bound of the max-heap sweep in MB
    #[arg(long)]
    pub max_heap_limit: Option<u32>,

    /// How the two sweeps combine: crossed or paired
    #[arg(long)]
    pub pairing: Option<SweepPairing>,

    /// Collectors to test (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub collectors: Vec<Collector>,

    /// Ranking metrics (comma separated)
    #[arg(short, long, value_delimiter = ',')]
    pub metrics: Vec<Metric>,
}

impl SweepArgs {
    /// Layer the command line over file-based settings
    pub fn apply(&self, settings: &mut RunSettings) {
        settings.artifact = self.artifact.clone();
        if let Some(runs) = self.runs {
            settings.runs = runs;
        }
        if let Some(init_heap) = self.init_heap {
            settings.init_heap = init_heap;
        }
        if let Some(max_heap) = self.max_heap {
            settings.max_heap = max_heap;
        }
        if let Some(step) = self.init_heap_increment {
            settings.init_heap_increment = step;
        }
        if let Some(step) = self.max_heap_increment {
            settings.max_heap_increment = step;
        }
        if self.init_heap_limit.is_some() {
            settings.init_heap_limit = self.init_heap_limit;
        }
        if self.max_heap_limit.is_some() {
            settings.max_heap_limit = self.max_heap_limit;
        }
        if let Some(pairing) = self.pairing {
            settings.pairing = pairing;
        }
        if !self.collectors.is_empty() {
            settings.collectors = self.collectors.clone();
        }
        if !self.metrics.is_empty() {
            settings.metrics = self.metrics.clone();
        }
    }

    /// Settings from `config` with these overrides applied
    pub fn settings(&self, config: &GcbenchConfig) -> RunSettings {
        let mut settings = config.run_settings(&self.artifact);
        self.apply(&mut settings);
        settings
    }
}

/// Arguments of the `run` subcommand
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Run matrix
    #[command(flatten)]
    pub sweep: SweepArgs,

    /// JVM launcher
    #[arg(long)]
    pub java: Option<PathBuf>,

    /// Timeout for a single run (e.g., "90s", "5m")
    #[arg(long)]
    pub timeout: Option<String>,

    /// Output format: human, json, csv
    #[arg(long)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for the orchestration log, CSV export and history
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Write gcbench-results.csv into the output directory
    #[arg(long)]
    pub export_csv: bool,

    /// Append the leaderboard to the history file
    #[arg(long)]
    pub save_history: bool,

    /// Dry run - list the run matrix without executing
    #[arg(long)]
    pub dry_run: bool,
}

/// Orchestrator over `executor`, ranked with the `[ranking]` weights of
/// `config` and logging into `output_dir`.
///
/// Invalid weights are rejected here, before any run can be launched.
pub fn configured_orchestrator<E: RunExecutor>(
    executor: E,
    config: &GcbenchConfig,
    output_dir: &Path,
) -> Result<BenchmarkOrchestrator<E>, ConfigurationError> {
    let aggregator = LeaderboardAggregator::with_weights(config.ranking.weights.clone())?;
    Ok(BenchmarkOrchestrator::new(executor)
        .with_aggregator(aggregator)
        .with_output_dir(output_dir))
}

/// Run the gcbench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the gcbench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("gcbench=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("gcbench=info")
            .with_writer(std::io::stderr)
            .init();
    }

    // Explicit --config must load; a discovered one falls back to defaults
    let config = match &cli.config {
        Some(path) => GcbenchConfig::load(path)?,
        None => GcbenchConfig::discover().unwrap_or_default(),
    };

    match &cli.command {
        Commands::Run(args) if args.dry_run => print_plan(&args.sweep, &config),
        Commands::Run(args) => run_analysis(args, &config),
        Commands::Plan(sweep) => print_plan(sweep, &config),
        Commands::History { path } => show_history(path.as_deref(), &config),
        Commands::Init { force } => init_config(*force),
    }
}

fn print_plan(sweep: &SweepArgs, config: &GcbenchConfig) -> anyhow::Result<()> {
    let config = RunConfiguration::validate(&sweep.settings(config))?;
    let plan = build_plan(&config);
    print!("{}", format_plan(&config, &plan));
    Ok(())
}

fn run_analysis(args: &RunArgs, config: &GcbenchConfig) -> anyhow::Result<()> {
    let settings = args.sweep.settings(config);

    let mut options = config.runner_options()?;
    if let Some(java) = &args.java {
        options.java = java.clone();
    }
    if let Some(timeout) = &args.timeout {
        options.timeout = GcbenchConfig::parse_duration(timeout)?;
    }

    let format: OutputFormat = args
        .format
        .as_deref()
        .unwrap_or(&config.output.format)
        .parse()
        .map_err(anyhow::Error::msg)?;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));

    // Ranking weights are checked before anything is spawned
    let java = options.java.clone();
    let orchestrator = Arc::new(configured_orchestrator(
        ProcessRunner::new(options),
        config,
        &output_dir,
    )?);

    let java_version = detect_java_version(&java);
    match &java_version {
        Some(version) => tracing::info!("Using {} ({})", java.display(), version),
        None => tracing::warn!("Could not determine the version of {}", java.display()),
    }
    let progress = orchestrator.progress();
    let handle = orchestrator.spawn(settings)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    while !handle.is_finished() {
        let snapshot = progress.snapshot();
        pb.set_length(snapshot.total as u64);
        pb.set_position(snapshot.completed as u64);
        pb.set_message(snapshot.message);
        std::thread::sleep(PROGRESS_POLL);
    }

    let result = handle
        .join()
        .map_err(|_| anyhow::anyhow!("Orchestrator thread panicked"))?;
    let snapshot = progress.snapshot();
    pb.set_position(snapshot.completed as u64);
    if result.is_ok() {
        pb.finish_with_message(snapshot.message);
    } else {
        pb.abandon_with_message(snapshot.message);
        eprintln!("Orchestration log: {}", output_dir.join(LOG_FILE_NAME).display());
    }
    let outcome = result?;

    let report = build_report(
        &outcome.config,
        &outcome.aggregation(),
        &outcome.records,
        java_version,
        outcome.duration.as_secs_f64() * 1000.0,
    );

    // Generate output
    let output = match format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Csv => generate_csv_report(&report.rows)?,
        OutputFormat::Human => format_human_output(&report),
    };

    // Write output
    if let Some(ref path) = args.output {
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    if args.export_csv || config.output.export_csv {
        std::fs::create_dir_all(&output_dir)?;
        let path = output_dir.join(CSV_FILE_NAME);
        write_csv_rows(std::fs::File::create(&path)?, &report.rows)?;
        println!("CSV written to: {}", path.display());
    }

    if args.save_history || config.output.save_history {
        let mut store = HistoryStore::open(config.output.history_file())?;
        let entry = HistoryEntry::from_leaderboard(
            outcome.config.artifact().file_name(),
            &report.leaderboard,
            chrono::Utc::now(),
        );
        let index = store.record(entry)?;
        println!(
            "History entry #{} saved to: {}",
            index,
            store.path().display()
        );
    }

    if outcome.all_failed() {
        eprintln!("\nAll {} runs failed", outcome.records.len());
        std::process::exit(1);
    }

    Ok(())
}

fn show_history(path: Option<&Path>, config: &GcbenchConfig) -> anyhow::Result<()> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.output.history_file());
    let store = HistoryStore::open(&path)?;
    println!("History: {}", path.display());
    print!("{}", format_history(&store.rows()));
    Ok(())
}

fn init_config(force: bool) -> anyhow::Result<()> {
    let path = PathBuf::from(CONFIG_FILE_NAME);
    if path.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    }
    std::fs::write(&path, GcbenchConfig::default_toml())?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "gcbench",
            "run",
            "app.jar",
            "--runs",
            "5",
            "--collectors",
            "g1,zgc",
            "--metrics",
            "throughput",
            "--pairing",
            "paired",
            "--export-csv",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.sweep.runs, Some(5));
        assert_eq!(args.sweep.collectors, vec![Collector::G1, Collector::Zgc]);
        assert_eq!(args.sweep.metrics, vec![Metric::Throughput]);
        assert_eq!(args.sweep.pairing, Some(SweepPairing::Paired));
        assert!(args.export_csv);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_unknown_collector_is_rejected() {
        assert!(Cli::try_parse_from(["gcbench", "plan", "app.jar", "-c", "cms"]).is_err());
    }

    #[test]
    fn test_overrides_layer_over_config() {
        let mut config = GcbenchConfig::default();
        config.sweep.runs = 7;
        config.sweep.max_heap = 128;

        let cli = Cli::try_parse_from(["gcbench", "plan", "Main.class", "--max-heap", "256"]).unwrap();
        let Commands::Plan(sweep) = cli.command else {
            panic!("expected plan subcommand");
        };
        let settings = sweep.settings(&config);
        assert_eq!(settings.artifact, PathBuf::from("Main.class"));
        assert_eq!(settings.runs, 7);
        assert_eq!(settings.max_heap, 256);
        assert_eq!(settings.collectors, config.sweep.collectors);
    }
}
