//! Collector and metric enumerations
//!
//! Both sets are closed. Their `Ord` follows declaration order, which is the
//! iteration order used by the run matrix and the tie-breaker of the leaderboard.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Garbage collector algorithm under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Collector {
    /// Single-threaded stop-the-world collector
    #[serde(rename = "Serial", alias = "serial")]
    Serial,
    /// Throughput-oriented parallel collector
    #[serde(rename = "Parallel", alias = "parallel")]
    Parallel,
    /// Garbage-First region collector
    #[serde(rename = "G1", alias = "g1")]
    G1,
    /// Concurrent low-latency Z collector
    #[serde(rename = "ZGC", alias = "zgc")]
    Zgc,
    /// Concurrent compacting collector
    #[serde(rename = "Shenandoah", alias = "shenandoah")]
    Shenandoah,
}

impl Collector {
    /// Every collector, in enumeration order
    pub const ALL: [Collector; 5] = [
        Collector::Serial,
        Collector::Parallel,
        Collector::G1,
        Collector::Zgc,
        Collector::Shenandoah,
    ];

    /// Display name
    pub fn name(self) -> &'static str {
        match self {
            Collector::Serial => "Serial",
            Collector::Parallel => "Parallel",
            Collector::G1 => "G1",
            Collector::Zgc => "ZGC",
            Collector::Shenandoah => "Shenandoah",
        }
    }

    /// HotSpot option that selects this collector
    pub fn jvm_flag(self) -> &'static str {
        match self {
            Collector::Serial => "-XX:+UseSerialGC",
            Collector::Parallel => "-XX:+UseParallelGC",
            Collector::G1 => "-XX:+UseG1GC",
            Collector::Zgc => "-XX:+UseZGC",
            Collector::Shenandoah => "-XX:+UseShenandoahGC",
        }
    }

    /// Position in the enumeration (0-based)
    pub fn ordinal(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Collector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "serial" => Ok(Collector::Serial),
            "parallel" => Ok(Collector::Parallel),
            "g1" => Ok(Collector::G1),
            "zgc" | "z" => Ok(Collector::Zgc),
            "shenandoah" => Ok(Collector::Shenandoah),
            other => Err(format!("Unknown collector: {}", other)),
        }
    }
}

/// Metric that can take part in the leaderboard ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    /// Shortest total GC time of any single run
    BestRuntime,
    /// Mean total GC time per run
    AvgRuntime,
    /// Mean fraction of wall time not spent in GC pauses
    Throughput,
    /// Mean of the worst pause per run
    Latency,
    /// Minor (young/concurrent-cycle) pauses per run
    #[serde(alias = "minor-pauses")]
    MinorPauseCount,
    /// Full collections per run
    #[serde(alias = "full-pauses")]
    FullPauseCount,
}

impl Metric {
    /// Every metric, in enumeration order
    pub const ALL: [Metric; 6] = [
        Metric::BestRuntime,
        Metric::AvgRuntime,
        Metric::Throughput,
        Metric::Latency,
        Metric::MinorPauseCount,
        Metric::FullPauseCount,
    ];

    /// Whether a larger value ranks a collector higher
    pub fn higher_is_better(self) -> bool {
        matches!(self, Metric::Throughput)
    }

    /// Short kebab-case key, as used in config files and CLI flags
    pub fn key(self) -> &'static str {
        match self {
            Metric::BestRuntime => "best-runtime",
            Metric::AvgRuntime => "avg-runtime",
            Metric::Throughput => "throughput",
            Metric::Latency => "latency",
            Metric::MinorPauseCount => "minor-pause-count",
            Metric::FullPauseCount => "full-pause-count",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "best-runtime" | "best" => Ok(Metric::BestRuntime),
            "avg-runtime" | "avg" => Ok(Metric::AvgRuntime),
            "throughput" => Ok(Metric::Throughput),
            "latency" => Ok(Metric::Latency),
            "minor-pause-count" | "minor-pauses" => Ok(Metric::MinorPauseCount),
            "full-pause-count" | "full-pauses" => Ok(Metric::FullPauseCount),
            other => Err(format!("Unknown metric: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_order_is_declaration_order() {
        let mut shuffled = vec![
            Collector::Shenandoah,
            Collector::G1,
            Collector::Serial,
            Collector::Zgc,
            Collector::Parallel,
        ];
        shuffled.sort();
        assert_eq!(shuffled, Collector::ALL.to_vec());
    }

    #[test]
    fn test_collector_parse() {
        assert_eq!("g1".parse::<Collector>().unwrap(), Collector::G1);
        assert_eq!("ZGC".parse::<Collector>().unwrap(), Collector::Zgc);
        assert_eq!(" Shenandoah ".parse::<Collector>().unwrap(), Collector::Shenandoah);
        assert!("cms".parse::<Collector>().is_err());
    }

    #[test]
    fn test_collector_flags() {
        assert_eq!(Collector::Zgc.jvm_flag(), "-XX:+UseZGC");
        assert_eq!(Collector::Parallel.jvm_flag(), "-XX:+UseParallelGC");
    }

    #[test]
    fn test_metric_parse_aliases() {
        assert_eq!("minor-pauses".parse::<Metric>().unwrap(), Metric::MinorPauseCount);
        assert_eq!("avg_runtime".parse::<Metric>().unwrap(), Metric::AvgRuntime);
        assert!("p99".parse::<Metric>().is_err());
        assert!(Metric::Throughput.higher_is_better());
        assert!(!Metric::Latency.higher_is_better());
    }
}
