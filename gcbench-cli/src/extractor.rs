//! GC Log Metric Extraction
//!
//! Parses JVM unified GC logging (`-Xlog:gc*` with `uptime,level,tags`
//! decorations) mixed with arbitrary program output. Recognised lines:
//!
//! - pause events: `... Pause <Kind> ... <duration>ms`. `Pause Full` counts as a
//!   full collection; every other pause (Young, Remark, Cleanup, Init Mark,
//!   Mark Start, ...) as a minor collection.
//! - the exit summary `[<uptime>s][info][gc,heap,exit] Heap`, whose uptime is
//!   the wall time of the run, or an explicit `Total wall time: <secs>s` line.
//!
//! Anything else is skipped and counted.

use crate::supervisor::RunOutput;
use gcbench_core::{FailureKind, RunDescriptor, RunRecord, RunStatus};
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

fn pause_pattern() -> &'static Regex {
    static PAUSE_RE: OnceLock<Regex> = OnceLock::new();
    // Safety: this regex literal is guaranteed to compile
    PAUSE_RE.get_or_init(|| {
        Regex::new(r"\bPause (?P<kind>\w+).*?(?P<ms>\d+(?:[.,]\d+)?)ms\s*$").unwrap()
    })
}

fn exit_summary_pattern() -> &'static Regex {
    static EXIT_RE: OnceLock<Regex> = OnceLock::new();
    // Safety: this regex literal is guaranteed to compile
    EXIT_RE.get_or_init(|| {
        Regex::new(r"^\[(?P<secs>\d+(?:[.,]\d+)?)s\].*\[gc,heap,exit\s*\]\s*Heap\s*$").unwrap()
    })
}

fn wall_time_pattern() -> &'static Regex {
    static WALL_RE: OnceLock<Regex> = OnceLock::new();
    // Safety: this regex literal is guaranteed to compile
    WALL_RE.get_or_init(|| {
        Regex::new(r"Total wall time:\s*(?P<secs>\d+(?:[.,]\d+)?)\s*s\b").unwrap()
    })
}

fn parse_number(text: &str) -> Option<f64> {
    text.replace(',', ".").parse().ok()
}

/// Values parsed from one run's diagnostic text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GcMetrics {
    /// Wall time from the exit summary; `None` when the summary is missing
    pub wall_time_secs: Option<f64>,
    /// Sum of all pause durations
    pub gc_time_secs: f64,
    /// Minor (young, remark, concurrent-phase) pauses
    pub minor_pauses: u32,
    /// Full collections
    pub full_pauses: u32,
    /// Longest single pause
    pub latency_secs: f64,
    /// Lines that matched no rule
    pub skipped_lines: usize,
}

impl GcMetrics {
    /// `1 - gc_time / wall_time`, clamped to `[0, 1]`
    pub fn throughput(&self) -> Option<f64> {
        let wall = self.wall_time_secs?;
        if wall <= 0.0 {
            return Some(if self.gc_time_secs > 0.0 { 0.0 } else { 1.0 });
        }
        Some((1.0 - self.gc_time_secs / wall).clamp(0.0, 1.0))
    }
}

/// Parse diagnostic text. Never fails; unknown lines are skipped.
pub fn extract(text: &str) -> GcMetrics {
    let mut metrics = GcMetrics::default();

    for line in text.lines() {
        let line = line.trim_end();

        if let Some(caps) = pause_pattern().captures(line) {
            if let Some(ms) = parse_number(&caps["ms"]) {
                let secs = ms / 1000.0;
                if &caps["kind"] == "Full" {
                    metrics.full_pauses += 1;
                } else {
                    metrics.minor_pauses += 1;
                }
                metrics.gc_time_secs += secs;
                metrics.latency_secs = metrics.latency_secs.max(secs);
                continue;
            }
        }

        let summary = exit_summary_pattern()
            .captures(line)
            .or_else(|| wall_time_pattern().captures(line));
        if let Some(secs) = summary.and_then(|caps| parse_number(&caps["secs"])) {
            metrics.wall_time_secs = Some(secs);
            continue;
        }

        metrics.skipped_lines += 1;
    }

    metrics
}

/// Combine a finished process with its parsed diagnostics into a record.
///
/// An unsuccessful exit takes precedence over a missing summary.
pub fn build_record(descriptor: RunDescriptor, output: RunOutput, timeout: Duration) -> RunRecord {
    let metrics = extract(&output.diagnostics);
    tracing::debug!(
        "{}: {} minor, {} full pauses, {} lines skipped",
        descriptor,
        metrics.minor_pauses,
        metrics.full_pauses,
        metrics.skipped_lines
    );

    let status = match (output.exit.failure(timeout), metrics.wall_time_secs) {
        (Some((kind, message)), _) => RunStatus::Failed { kind, message },
        (None, None) => RunStatus::Failed {
            kind: FailureKind::Parse,
            message: "GC log has no wall-time summary".to_string(),
        },
        (None, Some(_)) => RunStatus::Succeeded,
    };

    RunRecord {
        descriptor,
        wall_time_secs: metrics.wall_time_secs.unwrap_or(0.0),
        elapsed_secs: output.elapsed.as_secs_f64(),
        gc_time_secs: metrics.gc_time_secs,
        minor_pauses: metrics.minor_pauses,
        full_pauses: metrics.full_pauses,
        throughput: metrics.throughput().unwrap_or(0.0),
        latency_secs: metrics.latency_secs,
        status,
        diagnostics: output.diagnostics,
    }
}
