//! Result Pipeline
//!
//! Turns the records of a finished orchestration into a report.
//!
//! ## Pipeline Overview
//!
//! ```text
//! RunRecord (one per descriptor, from the orchestrator)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  aggregate  │  Per-collector statistics (parallel), scaled scores, ranking
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  Build Report with metadata and summary
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable output
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`aggregate`] - Leaderboard aggregation and result rows
//! - [`report`] - Report building
//! - [`formatting`] - Human-readable output formatting
//! - [`metadata`] - System and JVM metadata collection

mod aggregate;
mod formatting;
mod metadata;
mod report;

// Re-export public API
pub use aggregate::{Aggregation, LeaderboardAggregator};
pub use formatting::{format_history, format_human_output, format_plan};
pub use metadata::{build_report_meta, detect_java_version};
pub use report::build_report;
