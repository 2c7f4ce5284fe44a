//! JSON Output

use crate::report::Report;

/// Current report schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Generate a prettified JSON report.
pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Parse a report written by [`generate_json_report`]
pub fn parse_json_report(text: &str) -> Result<Report, serde_json::Error> {
    serde_json::from_str(text)
}
