//! gcbench Statistical Engine
//!
//! Small, deterministic kernels used by the leaderboard:
//! - Summary statistics over per-run values
//! - Min-max normalisation and weighted composite scoring

mod scoring;
mod summary;

pub use scoring::{Criterion, Direction, ScoringError, composite_scores, min_max_scale};
pub use summary::{SummaryStatistics, compute_summary, mean};

/// Weight given to a ranking metric unless configured otherwise
pub const DEFAULT_METRIC_WEIGHT: f64 = 1.0;
