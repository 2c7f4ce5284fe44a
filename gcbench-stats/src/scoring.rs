//! Composite Scoring
//!
//! Each criterion is min-max scaled across the competitors so that 0.0 is the
//! best observed value and 1.0 the worst, regardless of whether larger or
//! smaller raw values are preferred. The composite score is the weighted mean
//! of the scaled criteria; lower composite is better.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which end of a criterion is preferred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Smaller raw values are better (pause times, pause counts)
    LowerIsBetter,
    /// Larger raw values are better (throughput)
    HigherIsBetter,
}

/// One column of raw values, one value per competitor
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    /// Raw per-competitor values
    pub values: Vec<f64>,
    /// Preferred direction
    pub direction: Direction,
    /// Relative weight in the composite
    pub weight: f64,
}

/// Inputs the composite score cannot be computed from
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// A criterion does not have one value per competitor
    #[error("Criterion {index} has {got} values, expected {expected}")]
    LengthMismatch {
        /// Criterion position
        index: usize,
        /// Competitor count
        expected: usize,
        /// Values supplied
        got: usize,
    },

    /// Weight is negative or not finite
    #[error("Criterion {index} has invalid weight {weight}")]
    InvalidWeight {
        /// Criterion position
        index: usize,
        /// Rejected weight
        weight: f64,
    },
}

/// Scale `values` into `[0, 1]` with 0 = best.
///
/// When every value is equal the criterion cannot separate the competitors
/// and all scale to 0. Non-finite values scale to 1.
pub fn min_max_scale(values: &[f64], direction: Direction) -> Vec<f64> {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let range = max - min;

    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                return 1.0;
            }
            if !(range > 0.0) {
                return 0.0;
            }
            match direction {
                Direction::LowerIsBetter => (v - min) / range,
                Direction::HigherIsBetter => (max - v) / range,
            }
        })
        .collect()
}

/// Weighted mean of the scaled criteria for `competitors` competitors
pub fn composite_scores(
    criteria: &[Criterion],
    competitors: usize,
) -> Result<Vec<f64>, ScoringError> {
    let mut totals = vec![0.0; competitors];
    let mut weight_sum = 0.0;

    for (index, criterion) in criteria.iter().enumerate() {
        if criterion.values.len() != competitors {
            return Err(ScoringError::LengthMismatch {
                index,
                expected: competitors,
                got: criterion.values.len(),
            });
        }
        if !criterion.weight.is_finite() || criterion.weight < 0.0 {
            return Err(ScoringError::InvalidWeight {
                index,
                weight: criterion.weight,
            });
        }
        if criterion.weight == 0.0 {
            continue;
        }

        let scaled = min_max_scale(&criterion.values, criterion.direction);
        for (total, s) in totals.iter_mut().zip(scaled) {
            *total += criterion.weight * s;
        }
        weight_sum += criterion.weight;
    }

    if weight_sum > 0.0 {
        for total in &mut totals {
            *total /= weight_sum;
        }
    }
    Ok(totals)
}
