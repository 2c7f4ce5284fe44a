//! Configuration loading from gcbench.toml
//!
//! gcbench configuration can be specified in a `gcbench.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.
//! Command line flags override file values; file values override built-in defaults.

use crate::supervisor::RunnerOptions;
use gcbench_core::{Collector, Metric, RunSettings, SweepPairing};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the configuration file looked up by [`GcbenchConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "gcbench.toml";

/// gcbench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GcbenchConfig {
    /// JVM launcher configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Run matrix configuration
    #[serde(default)]
    pub sweep: SweepConfig,
    /// Leaderboard ranking configuration
    #[serde(default)]
    pub ranking: RankingConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// JVM launcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// JVM launcher executable
    #[serde(default = "default_java")]
    pub java: String,
    /// Extra options placed before the generated collector and heap flags
    #[serde(default)]
    pub jvm_options: Vec<String>,
    /// Timeout for a single run (e.g., "90s", "5m")
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Time between SIGTERM and SIGKILL when a run times out
    #[serde(default = "default_terminate_grace")]
    pub terminate_grace: String,
    /// Scratch directory for per-run GC logs
    #[serde(default = "default_work_dir")]
    pub work_dir: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            java: default_java(),
            jvm_options: Vec::new(),
            timeout: default_timeout(),
            terminate_grace: default_terminate_grace(),
            work_dir: default_work_dir(),
        }
    }
}

fn default_java() -> String {
    "java".to_string()
}
fn default_timeout() -> String {
    "5m".to_string()
}
fn default_terminate_grace() -> String {
    "500ms".to_string()
}
fn default_work_dir() -> String {
    "target/gcbench/runs".to_string()
}

/// Run matrix configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Repetitions per (collector, heap pair)
    #[serde(default = "default_runs")]
    pub runs: u32,
    /// Initial heap size in MB
    #[serde(default = "default_init_heap")]
    pub init_heap: u32,
    /// Maximum heap size in MB
    #[serde(default = "default_max_heap")]
    pub max_heap: u32,
    /// Init-heap sweep step in MB
    #[serde(default = "default_init_heap_increment")]
    pub init_heap_increment: u32,
    /// Max-heap sweep step in MB
    #[serde(default = "default_max_heap_increment")]
    pub max_heap_increment: u32,
    /// Upper bound of the init-heap sweep
    #[serde(default)]
    pub init_heap_limit: Option<u32>,
    /// Upper bound of the max-heap sweep
    #[serde(default)]
    pub max_heap_limit: Option<u32>,
    /// "crossed" or "paired"
    #[serde(default)]
    pub pairing: SweepPairing,
    /// Collectors to test
    #[serde(default = "default_collectors")]
    pub collectors: Vec<Collector>,
    /// Metrics used for ranking
    #[serde(default = "default_metrics")]
    pub metrics: Vec<Metric>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            init_heap: default_init_heap(),
            max_heap: default_max_heap(),
            init_heap_increment: default_init_heap_increment(),
            max_heap_increment: default_max_heap_increment(),
            init_heap_limit: None,
            max_heap_limit: None,
            pairing: SweepPairing::default(),
            collectors: default_collectors(),
            metrics: default_metrics(),
        }
    }
}

fn default_runs() -> u32 {
    3
}
fn default_init_heap() -> u32 {
    4
}
fn default_max_heap() -> u32 {
    64
}
fn default_init_heap_increment() -> u32 {
    128
}
fn default_max_heap_increment() -> u32 {
    256
}
fn default_collectors() -> Vec<Collector> {
    Collector::ALL.to_vec()
}
fn default_metrics() -> Vec<Metric> {
    Metric::ALL.to_vec()
}

/// Leaderboard ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RankingConfig {
    /// Per-metric weights for the composite score; unlisted metrics weigh 1.0
    #[serde(default)]
    pub weights: BTreeMap<Metric, f64>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human", "json", "csv"
    #[serde(default = "default_format")]
    pub format: String,
    /// Output directory for the log, CSV export and history
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Write gcbench-results.csv after each orchestration
    #[serde(default)]
    pub export_csv: bool,
    /// Append a condensed entry to the history file after each orchestration
    #[serde(default)]
    pub save_history: bool,
    /// History file path (defaults to `<directory>/history.json`)
    #[serde(default)]
    pub history_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            directory: default_output_dir(),
            export_csv: false,
            save_history: false,
            history_path: None,
        }
    }
}

impl OutputConfig {
    /// Resolved history file location
    pub fn history_file(&self) -> PathBuf {
        match &self.history_path {
            Some(path) => PathBuf::from(path),
            None => Path::new(&self.directory).join("history.json"),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_output_dir() -> String {
    "target/gcbench".to_string()
}

impl GcbenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!("Ignoring {}: {}", config_path.display(), e);
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Raw run settings for `artifact` from the `[sweep]` section
    pub fn run_settings(&self, artifact: impl Into<PathBuf>) -> RunSettings {
        let sweep = &self.sweep;
        RunSettings {
            artifact: artifact.into(),
            runs: sweep.runs,
            init_heap: sweep.init_heap,
            max_heap: sweep.max_heap,
            init_heap_increment: sweep.init_heap_increment,
            max_heap_increment: sweep.max_heap_increment,
            init_heap_limit: sweep.init_heap_limit,
            max_heap_limit: sweep.max_heap_limit,
            pairing: sweep.pairing,
            collectors: sweep.collectors.clone(),
            metrics: sweep.metrics.clone(),
        }
    }

    /// Process runner options from the `[runner]` section
    pub fn runner_options(&self) -> anyhow::Result<RunnerOptions> {
        Ok(RunnerOptions {
            java: PathBuf::from(&self.runner.java),
            jvm_options: self.runner.jvm_options.clone(),
            timeout: Self::parse_duration(&self.runner.timeout)?,
            terminate_grace: Self::parse_duration(&self.runner.terminate_grace)?,
            work_dir: PathBuf::from(&self.runner.work_dir),
        })
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# gcbench Configuration

[runner]
# JVM launcher
java = "java"
# Extra JVM options placed before the generated collector and heap flags
jvm_options = []
# Timeout for a single run
timeout = "5m"
# Grace period between SIGTERM and SIGKILL when a run times out
terminate_grace = "500ms"
# Scratch directory for per-run GC logs
work_dir = "target/gcbench/runs"

[sweep]
# Repetitions per collector and heap pair (1 to 100)
runs = 3
# Initial heap size in MB (1 to 1999)
init_heap = 4
# Maximum heap size in MB (16 to 1999)
max_heap = 64
# Sweep increments in MB (1 to 999)
init_heap_increment = 128
max_heap_increment = 256
# Upper bound of the init-heap sweep (uncomment to enable)
# init_heap_limit = 64
# Upper bound of the max-heap sweep (uncomment to enable)
# max_heap_limit = 64
# How the two sweeps combine: "crossed" or "paired"
pairing = "crossed"
collectors = ["serial", "parallel", "g1", "zgc", "shenandoah"]
metrics = ["best-runtime", "avg-runtime", "throughput", "latency", "minor-pauses", "full-pauses"]

[ranking]
# Per-metric weights for the composite score (default 1.0 each)
# weights = { throughput = 2.0 }

[output]
# Default output format: human, json, csv
format = "human"
# Output directory for the log, CSV export and history
directory = "target/gcbench"
# Write gcbench-results.csv after each run
export_csv = false
# Append a summary entry to the history file after each run
save_history = false
# History file (uncomment to override)
# history_path = "target/gcbench/history.json"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration: {}", s));
        }

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok(Duration::from_nanos((value * multiplier as f64) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GcbenchConfig::default();
        assert_eq!(config.runner.java, "java");
        assert_eq!(config.sweep.init_heap, 4);
        assert_eq!(config.sweep.max_heap, 64);
        assert_eq!(config.sweep.init_heap_increment, 128);
        assert_eq!(config.sweep.max_heap_increment, 256);
        assert_eq!(config.sweep.collectors.len(), 5);
        assert!(!config.output.export_csv);
    }

    #[test]
    fn test_parse_duration() {
        let d = GcbenchConfig::parse_duration;
        assert_eq!(d("3s").unwrap(), Duration::from_secs(3));
        assert_eq!(d("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(d("100us").unwrap(), Duration::from_micros(100));
        assert_eq!(d("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(d("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(d("10").unwrap(), Duration::from_secs(10));
        assert!(d("").is_err());
        assert!(d("5 fortnights").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [runner]
            java = "/opt/jdk/bin/java"
            timeout = "90s"

            [sweep]
            runs = 2
            collectors = ["g1", "Serial"]
            metrics = ["avg-runtime", "minor-pauses"]
            pairing = "paired"

            [ranking]
            weights = { throughput = 2.0 }
        "#;

        let config: GcbenchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runner.java, "/opt/jdk/bin/java");
        assert_eq!(config.sweep.runs, 2);
        assert_eq!(config.sweep.collectors, vec![Collector::G1, Collector::Serial]);
        assert_eq!(
            config.sweep.metrics,
            vec![Metric::AvgRuntime, Metric::MinorPauseCount]
        );
        assert_eq!(config.sweep.pairing, SweepPairing::Paired);
        assert_eq!(config.ranking.weights.get(&Metric::Throughput), Some(&2.0));
        assert_eq!(config.ranking.weights.get(&Metric::Latency), None);
        // Defaults should still apply
        assert_eq!(config.sweep.init_heap, 4);
        assert_eq!(config.output.format, "human");
        assert_eq!(config.runner.terminate_grace, "500ms");
    }

    #[test]
    fn test_default_toml_parses() {
        let config: GcbenchConfig = toml::from_str(&GcbenchConfig::default_toml()).unwrap();
        assert_eq!(config.sweep.runs, 3);
        assert_eq!(config.sweep.metrics.len(), 6);

        let options = config.runner_options().unwrap();
        assert_eq!(options.timeout, Duration::from_secs(300));
        assert_eq!(options.terminate_grace, Duration::from_millis(500));
    }

    #[test]
    fn test_run_settings_and_history_path() {
        let mut config = GcbenchConfig::default();
        config.sweep.runs = 7;
        let settings = config.run_settings("app.jar");
        assert_eq!(settings.runs, 7);
        assert_eq!(settings.artifact, PathBuf::from("app.jar"));

        assert_eq!(
            config.output.history_file(),
            PathBuf::from("target/gcbench/history.json")
        );
        config.output.history_path = Some("h.json".to_string());
        assert_eq!(config.output.history_file(), PathBuf::from("h.json"));
    }
}
