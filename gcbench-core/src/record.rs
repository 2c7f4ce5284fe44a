//! Run Records

use crate::collector::Collector;
use crate::descriptor::RunDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a run produced no usable measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// JVM exited with a non-zero status
    Exit,
    /// JVM was terminated by a signal it did not ask for
    Signal,
    /// Run exceeded the per-run timeout and was killed
    Timeout,
    /// Diagnostic output lacked the wall-time summary
    Parse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Exit => "exit",
            FailureKind::Signal => "signal",
            FailureKind::Timeout => "timeout",
            FailureKind::Parse => "parse",
        };
        f.write_str(s)
    }
}

/// Outcome of a single run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunStatus {
    /// Measurement is complete
    Succeeded,
    /// Measurement is unusable; the record is kept for the result rows
    Failed {
        /// Failure category
        kind: FailureKind,
        /// Human readable cause
        message: String,
    },
}

impl RunStatus {
    /// Whether the run failed
    pub fn is_failed(&self) -> bool {
        matches!(self, RunStatus::Failed { .. })
    }
}

/// Measurements and diagnostics of one executed `RunDescriptor`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// The executed descriptor
    pub descriptor: RunDescriptor,
    /// Wall time reported by the VM exit summary (seconds, 0 when absent)
    pub wall_time_secs: f64,
    /// Wall time measured by the runner around the child process (seconds)
    pub elapsed_secs: f64,
    /// Sum of all pause durations (seconds)
    pub gc_time_secs: f64,
    /// Minor collection count
    pub minor_pauses: u32,
    /// Full collection count
    pub full_pauses: u32,
    /// `1 - gc_time / wall_time`, clamped to `[0, 1]`
    pub throughput: f64,
    /// Longest single pause (seconds)
    pub latency_secs: f64,
    /// Success or failure
    pub status: RunStatus,
    /// Raw diagnostic text (stdout, stderr, GC log)
    pub diagnostics: String,
}

impl RunRecord {
    /// Collector this record belongs to
    pub fn collector(&self) -> Collector {
        self.descriptor.collector
    }

    /// Whether the run failed
    pub fn is_failed(&self) -> bool {
        self.status.is_failed()
    }
}
