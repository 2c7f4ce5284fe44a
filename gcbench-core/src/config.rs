//! Run Configuration
//!
//! `RunSettings` is the raw input collected from the command line or a config
//! file. `RunConfiguration::validate` turns it into an immutable, fully
//! range-checked configuration; any violation rejects the settings as a whole.

use crate::collector::{Collector, Metric};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Upper bound for every heap value (MB)
pub const HEAP_CEILING_MB: u32 = 1999;

/// Lower bound for the maximum heap size (MB)
pub const MAX_HEAP_FLOOR_MB: u32 = 16;

/// Upper bound for the repetition count
pub const MAX_RUNS: u32 = 100;

const MIN_INIT_HEAP_MB: u32 = 1;
const MIN_INCREMENT_MB: u32 = 1;
const MAX_INCREMENT_MB: u32 = 999;

/// Reasons a configuration is rejected before anything is spawned
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// Artifact is neither a `.jar` nor a `.class` file
    #[error("Please select a Java application class file or a jar file (got {})", .0.display())]
    UnsupportedArtifact(PathBuf),

    /// Artifact missing or unreadable at launch
    #[error("Artifact {} is not readable: {reason}", .path.display())]
    ArtifactUnreadable {
        /// Configured artifact path
        path: PathBuf,
        /// Operating system error or file type
        reason: String,
    },

    /// Numeric setting outside its allowed range
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Human readable setting name
        field: &'static str,
        /// Smallest allowed value
        min: u32,
        /// Largest allowed value
        max: u32,
        /// Rejected value
        value: u32,
    },

    /// `-Xms` above `-Xmx`
    #[error("Initial heap size ({init} MB) must not exceed maximum heap size ({max} MB)")]
    HeapOrder {
        /// Initial heap size (MB)
        init: u32,
        /// Maximum heap size (MB)
        max: u32,
    },

    /// Empty collector selection
    #[error("Please select at least one garbage collector to test")]
    NoCollectors,

    /// Empty metric selection
    #[error("Please select at least one metric to measure the performance on")]
    NoMetrics,

    /// Ranking weight that is negative or not finite
    #[error("Ranking weight for {metric} must be a finite, non-negative number, got {weight}")]
    InvalidWeight {
        /// Weighted metric
        metric: Metric,
        /// Rejected weight
        weight: f64,
    },
}

/// How the init-heap and max-heap sweeps are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SweepPairing {
    /// Every init-heap step crossed with every max-heap step (default)
    #[default]
    Crossed,
    /// Steps advance together; the shorter sweep holds its last value
    Paired,
}

impl std::str::FromStr for SweepPairing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crossed" | "cross" => Ok(SweepPairing::Crossed),
            "paired" | "zip" => Ok(SweepPairing::Paired),
            other => Err(format!("Unknown sweep pairing: {}", other)),
        }
    }
}

/// Raw, unvalidated run settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSettings {
    /// Path to a `.jar` or `.class` file
    pub artifact: PathBuf,
    /// Repetitions per (collector, heap pair)
    pub runs: u32,
    /// Initial heap size (`-Xms`) in MB
    pub init_heap: u32,
    /// Maximum heap size (`-Xmx`) in MB
    pub max_heap: u32,
    /// Init-heap sweep step in MB
    pub init_heap_increment: u32,
    /// Max-heap sweep step in MB
    pub max_heap_increment: u32,
    /// Upper bound of the init-heap sweep (defaults to `max_heap`)
    #[serde(default)]
    pub init_heap_limit: Option<u32>,
    /// Upper bound of the max-heap sweep (defaults to `max_heap`)
    #[serde(default)]
    pub max_heap_limit: Option<u32>,
    /// Sweep combination policy
    #[serde(default)]
    pub pairing: SweepPairing,
    /// Collectors to test
    pub collectors: Vec<Collector>,
    /// Metrics used for ranking
    pub metrics: Vec<Metric>,
}

impl RunSettings {
    /// Settings for `artifact` with the stock sweep: 4 MB → 64 MB, every collector and metric
    pub fn new(artifact: impl Into<PathBuf>) -> Self {
        Self {
            artifact: artifact.into(),
            runs: 3,
            init_heap: 4,
            max_heap: 64,
            init_heap_increment: 128,
            max_heap_increment: 256,
            init_heap_limit: None,
            max_heap_limit: None,
            pairing: SweepPairing::Crossed,
            collectors: Collector::ALL.to_vec(),
            metrics: Metric::ALL.to_vec(),
        }
    }
}

/// Kind of executable artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Launched with `-jar`
    Jar,
    /// Launched with `-cp <dir> <ClassName>`
    Class,
}

/// Target program reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    path: PathBuf,
    kind: ArtifactKind,
}

impl Artifact {
    /// Classify `path` by its extension
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, ConfigurationError> {
        let path = path.into();
        let kind = match path.extension().and_then(|e| e.to_str()) {
            Some("jar") => ArtifactKind::Jar,
            Some("class") => ArtifactKind::Class,
            _ => return Err(ConfigurationError::UnsupportedArtifact(path)),
        };
        Ok(Self { path, kind })
    }

    /// Path as given
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Jar or class file
    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// File name, used to key history rows
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Main class name of a `.class` artifact
    pub fn class_name(&self) -> Option<String> {
        match self.kind {
            ArtifactKind::Class => self
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned()),
            ArtifactKind::Jar => None,
        }
    }

    /// Classpath directory of a `.class` artifact
    pub fn class_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Fail unless the artifact is an existing, readable regular file
    pub fn check_readable(&self) -> Result<(), ConfigurationError> {
        let unreadable = |reason: String| ConfigurationError::ArtifactUnreadable {
            path: self.path.clone(),
            reason,
        };
        let metadata = std::fs::metadata(&self.path).map_err(|e| unreadable(e.to_string()))?;
        if !metadata.is_file() {
            return Err(unreadable("not a regular file".to_string()));
        }
        std::fs::File::open(&self.path).map_err(|e| unreadable(e.to_string()))?;
        Ok(())
    }
}

/// Validated, immutable run configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfiguration {
    artifact: Artifact,
    runs: u32,
    init_heap: u32,
    max_heap: u32,
    init_heap_increment: u32,
    max_heap_increment: u32,
    init_heap_limit: u32,
    max_heap_limit: u32,
    pairing: SweepPairing,
    collectors: BTreeSet<Collector>,
    metrics: BTreeSet<Metric>,
}

fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<u32, ConfigurationError> {
    if value < min || value > max {
        return Err(ConfigurationError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(value)
}

impl RunConfiguration {
    /// Validate raw settings. Nothing is partially applied: the first violation rejects all.
    pub fn validate(settings: &RunSettings) -> Result<Self, ConfigurationError> {
        let artifact = Artifact::from_path(&settings.artifact)?;

        let runs = check_range("Number of runs", settings.runs, 1, MAX_RUNS)?;
        let init_heap = check_range(
            "Initial heap size (MB)",
            settings.init_heap,
            MIN_INIT_HEAP_MB,
            HEAP_CEILING_MB,
        )?;
        let max_heap = check_range(
            "Maximum heap size (MB)",
            settings.max_heap,
            MAX_HEAP_FLOOR_MB,
            HEAP_CEILING_MB,
        )?;
        let init_heap_increment = check_range(
            "Initial heap increment (MB)",
            settings.init_heap_increment,
            MIN_INCREMENT_MB,
            MAX_INCREMENT_MB,
        )?;
        let max_heap_increment = check_range(
            "Maximum heap increment (MB)",
            settings.max_heap_increment,
            MIN_INCREMENT_MB,
            MAX_INCREMENT_MB,
        )?;

        if init_heap > max_heap {
            return Err(ConfigurationError::HeapOrder {
                init: init_heap,
                max: max_heap,
            });
        }

        let init_heap_limit = match settings.init_heap_limit {
            Some(limit) => check_range("Initial heap sweep limit (MB)", limit, init_heap, max_heap)?,
            None => max_heap,
        };
        let max_heap_limit = match settings.max_heap_limit {
            Some(limit) => {
                check_range("Maximum heap sweep limit (MB)", limit, max_heap, HEAP_CEILING_MB)?
            }
            None => max_heap,
        };

        let collectors: BTreeSet<Collector> = settings.collectors.iter().copied().collect();
        if collectors.is_empty() {
            return Err(ConfigurationError::NoCollectors);
        }
        let metrics: BTreeSet<Metric> = settings.metrics.iter().copied().collect();
        if metrics.is_empty() {
            return Err(ConfigurationError::NoMetrics);
        }

        Ok(Self {
            artifact,
            runs,
            init_heap,
            max_heap,
            init_heap_increment,
            max_heap_increment,
            init_heap_limit,
            max_heap_limit,
            pairing: settings.pairing,
            collectors,
            metrics,
        })
    }

    /// Target program
    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Repetitions per (collector, heap pair)
    pub fn runs(&self) -> u32 {
        self.runs
    }

    /// First init-heap value (MB)
    pub fn init_heap(&self) -> u32 {
        self.init_heap
    }

    /// First max-heap value (MB)
    pub fn max_heap(&self) -> u32 {
        self.max_heap
    }

    /// Init-heap step (MB)
    pub fn init_heap_increment(&self) -> u32 {
        self.init_heap_increment
    }

    /// Max-heap step (MB)
    pub fn max_heap_increment(&self) -> u32 {
        self.max_heap_increment
    }

    /// Inclusive upper bound of the init-heap sweep (MB)
    pub fn init_heap_limit(&self) -> u32 {
        self.init_heap_limit
    }

    /// Inclusive upper bound of the max-heap sweep (MB)
    pub fn max_heap_limit(&self) -> u32 {
        self.max_heap_limit
    }

    /// Sweep combination policy
    pub fn pairing(&self) -> SweepPairing {
        self.pairing
    }

    /// Selected collectors in enumeration order
    pub fn collectors(&self) -> impl Iterator<Item = Collector> + '_ {
        self.collectors.iter().copied()
    }

    /// Number of selected collectors
    pub fn collector_count(&self) -> usize {
        self.collectors.len()
    }

    /// Selected ranking metrics in enumeration order
    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        self.metrics.iter().copied()
    }

    /// Whether `metric` takes part in the ranking
    pub fn has_metric(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }
}

impl TryFrom<&RunSettings> for RunConfiguration {
    type Error = ConfigurationError;

    fn try_from(settings: &RunSettings) -> Result<Self, Self::Error> {
        Self::validate(settings)
    }
}
