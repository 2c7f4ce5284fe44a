#![warn(missing_docs)]
//! gcbench Report - Result Model and Export
//!
//! Output formats and persistence for a finished orchestration:
//! - Human-readable terminal output (rendered by the CLI)
//! - JSON (machine-readable)
//! - CSV (one line per result row)
//! - JSON history file (one condensed entry per orchestration)

mod csv;
mod history;
mod json;
mod report;

pub use self::csv::{CsvRow, generate_csv_report, read_csv_rows, write_csv_rows};
pub use history::{HISTORY_COLUMNS, HistoryEntry, HistoryError, HistoryRow, HistoryStore};
pub use json::{SCHEMA_VERSION, generate_json_report, parse_json_report};
pub use report::{
    LeaderboardEntry, MetricScore, Report, ReportConfig, ReportMeta, ReportSummary, ResultRow,
    SystemInfo,
};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Human,
    /// JSON with full schema
    Json,
    /// CSV result rows
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Human));
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
