//! Output Formatting
//!
//! Human-readable output for the terminal:
//! - Leaderboard (`1) G1`, `2) Serial`, ...) with the aggregated figures
//! - Result table, one row per run, failed runs marked `FAILED`
//! - Run matrix listing for dry runs
//! - History table

use crate::planner::ExecutionPlan;
use gcbench_core::RunConfiguration;
use gcbench_report::{HISTORY_COLUMNS, HistoryRow, Report, ResultRow};

const RESULT_COLUMNS: [&str; 6] = [
    "GC Type",
    "Run No.",
    "GC Runtime (sec)",
    "Throughput (%)",
    "Full Pauses",
    "Minor Pauses",
];

const FAILED: &str = "FAILED";

fn result_cells(row: &ResultRow) -> [String; 6] {
    let cell = |value: Option<String>| value.unwrap_or_else(|| FAILED.to_string());
    [
        row.collector.to_string(),
        row.repetition_index.to_string(),
        cell(row.gc_runtime_seconds.map(|v| format!("{:.3}", v))),
        cell(row.throughput_percent.map(|v| format!("{:.2}", v))),
        cell(row.full_pause_count.map(|v| v.to_string())),
        cell(row.minor_pause_count.map(|v| v.to_string())),
    ]
}

fn render_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let joined: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
        .collect();
    format!("  {}\n", joined.join("  ").trim_end())
}

/// Left-aligned table with a dashed rule under the header
fn render_table(output: &mut String, header: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    output.push_str(&render_line(header.iter().copied(), &widths));
    output.push_str(&format!(
        "  {}\n",
        "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1))
    ));
    for row in rows {
        output.push_str(&render_line(row.iter().map(String::as_str), &widths));
    }
}

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("gcbench Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    output.push_str(&format!(
        "Artifact: {}  ({} runs, {} failed, {:.1} s)\n\n",
        report.meta.artifact,
        report.summary.total_runs,
        report.summary.failed,
        report.summary.total_duration_ms / 1000.0
    ));

    output.push_str("Leaderboard\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    if report.leaderboard.is_empty() {
        output.push_str("  No collector completed a successful run.\n");
    }
    for entry in &report.leaderboard {
        output.push_str(&format!(
            "  {}) {}  (score {:.3})\n",
            entry.rank, entry.collector, entry.score
        ));
        output.push_str(&format!(
            "      gc time: best {:.3} s  avg {:.3} s  stddev {:.3} s\n",
            entry.best_gc_time_secs, entry.avg_gc_time_secs, entry.gc_time.std_dev
        ));
        output.push_str(&format!(
            "      throughput: {:.2}%  latency: {:.3} s\n",
            entry.avg_throughput * 100.0,
            entry.avg_latency_secs
        ));
        output.push_str(&format!(
            "      pauses: {} minor, {} full  ({:.1} / {:.1} per run)\n",
            entry.total_minor_pauses,
            entry.total_full_pauses,
            entry.avg_minor_pauses,
            entry.avg_full_pauses
        ));
        if entry.failed_runs > 0 {
            output.push_str(&format!(
                "      {} of {} runs failed\n",
                entry.failed_runs,
                entry.failed_runs + entry.successful_runs
            ));
        }
    }

    let unranked: Vec<String> = report
        .rows
        .iter()
        .map(|r| r.collector)
        .filter(|c| report.leaderboard.iter().all(|e| e.collector != *c))
        .map(|c| c.to_string())
        .fold(Vec::new(), |mut acc, name| {
            if !acc.contains(&name) {
                acc.push(name);
            }
            acc
        });
    if !unranked.is_empty() {
        output.push_str(&format!(
            "  Not ranked (no successful run): {}\n",
            unranked.join(", ")
        ));
    }

    output.push('\n');
    output.push_str("Results\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    let rows: Vec<Vec<String>> = report
        .rows
        .iter()
        .map(|row| result_cells(row).to_vec())
        .collect();
    render_table(&mut output, &RESULT_COLUMNS, &rows);

    let failures: Vec<&ResultRow> = report.rows.iter().filter(|r| r.is_failed()).collect();
    if !failures.is_empty() {
        output.push('\n');
        for row in failures {
            output.push_str(&format!(
                "  ✗ {} {} run {}: {}\n",
                row.collector,
                row.heap,
                row.repetition_index,
                row.failure.as_deref().unwrap_or_default()
            ));
        }
    }

    output
}

/// List the run matrix without executing it
pub fn format_plan(config: &RunConfiguration, plan: &ExecutionPlan) -> String {
    let mut output = String::new();
    output.push_str("gcbench Plan:\n");
    output.push_str(&format!("├── artifact: {}\n", config.artifact().path().display()));

    let mut current = None;
    for descriptor in &plan.descriptors {
        if current != Some(descriptor.collector) {
            current = Some(descriptor.collector);
            output.push_str(&format!(
                "├── collector: {} ({})\n",
                descriptor.collector,
                descriptor.collector.jvm_flag()
            ));
        }
        output.push_str(&format!(
            "│   ├── [{}] {} run {}/{}\n",
            descriptor.sequence + 1,
            descriptor.heap,
            descriptor.repetition,
            descriptor.repetitions
        ));
    }

    output.push_str(&format!(
        "{} runs planned ({} collectors x {} heap pairs x {} repetitions).\n",
        plan.len(),
        config.collector_count(),
        plan.heap_pairs.len(),
        config.runs()
    ));
    output
}

/// Render history rows as a table
pub fn format_history(rows: &[HistoryRow]) -> String {
    let mut output = String::new();
    if rows.is_empty() {
        output.push_str("No history recorded.\n");
        return output;
    }

    let mut header = vec!["#"];
    header.extend(HISTORY_COLUMNS);
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.index.to_string()];
            cells.extend(row.cells());
            cells
        })
        .collect();
    render_table(&mut output, &header, &cells);
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcbench_core::{Collector, HeapPair};

    fn row(collector: Collector, gc: Option<f64>) -> ResultRow {
        ResultRow {
            collector,
            repetition_index: 1,
            heap: HeapPair::new(64, 64),
            gc_runtime_seconds: gc,
            throughput_percent: gc.map(|_| 95.0),
            full_pause_count: gc.map(|_| 0),
            minor_pause_count: gc.map(|_| 4),
            failure: gc.is_none().then(|| "timeout: killed".to_string()),
        }
    }

    #[test]
    fn test_result_cells() {
        assert_eq!(
            result_cells(&row(Collector::G1, Some(0.1234))),
            ["G1", "1", "0.123", "95.00", "0", "4"].map(String::from)
        );
        let failed = result_cells(&row(Collector::Zgc, None));
        assert_eq!(failed[0], "ZGC");
        assert!(failed[2..].iter().all(|c| c == FAILED));
    }

    #[test]
    fn test_table_alignment() {
        let mut output = String::new();
        render_table(
            &mut output,
            &["A", "Long"],
            &[vec!["xyz".to_string(), "1".to_string()]],
        );
        assert_eq!(output, "  A    Long\n  ---------\n  xyz  1\n");
    }
}
