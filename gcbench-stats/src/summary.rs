//! Summary Statistics
//!
//! Repetition counts are small (1-100 runs per collector), so every statistic
//! is computed from all samples; no outlier trimming is applied. A single slow
//! run is exactly what a collector comparison needs to surface.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Summary of one series of per-run values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Arithmetic mean
    pub mean: f64,
    /// 50th percentile
    pub median: f64,
    /// Sample standard deviation
    pub std_dev: f64,
    /// Smallest sample
    pub min: f64,
    /// Largest sample
    pub max: f64,
    /// 90th percentile
    pub p90: f64,
    /// Number of samples
    pub sample_count: usize,
}

fn sorted(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Percentile by linear interpolation between nearest ranks of sorted data
fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (percentile / 100.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = (lower + 1).min(n - 1);
            let fraction = rank - lower as f64;
            sorted[lower] + fraction * (sorted[upper] - sorted[lower])
        }
    }
}

/// Arithmetic mean (0 for an empty slice)
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

/// Compute summary statistics for a series of per-run values
pub fn compute_summary(samples: &[f64]) -> SummaryStatistics {
    if samples.is_empty() {
        return SummaryStatistics::default();
    }

    let sorted = sorted(samples);
    let mean = mean(samples);

    // Sample standard deviation
    let std_dev = if samples.len() < 2 {
        0.0
    } else {
        let variance =
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (samples.len() - 1) as f64;
        variance.sqrt()
    };

    SummaryStatistics {
        mean,
        median: percentile_of_sorted(&sorted, 50.0),
        std_dev,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        p90: percentile_of_sorted(&sorted, 90.0),
        sample_count: samples.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_summary() {
        let summary = compute_summary(&[0.5, 0.6, 0.4, 0.5]);
        assert!((summary.mean - 0.5).abs() < 1e-12);
        assert!((summary.median - 0.5).abs() < 1e-12);
        assert_eq!(summary.min, 0.4);
        assert_eq!(summary.max, 0.6);
        assert_eq!(summary.sample_count, 4);
        assert!(summary.std_dev > 0.0);
    }

    #[test]
    fn test_single_sample() {
        let summary = compute_summary(&[0.25]);
        assert_eq!(summary.mean, 0.25);
        assert_eq!(summary.p90, 0.25);
        assert_eq!(summary.std_dev, 0.0);
    }

    #[test]
    fn test_empty_samples() {
        let summary = compute_summary(&[]);
        assert_eq!(summary.sample_count, 0);
        assert_eq!(summary.mean, 0.0);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_percentile_interpolation() {
        let samples: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let p90 = percentile_of_sorted(&samples, 90.0);
        assert!(p90 > 89.0 && p90 < 91.0);
        assert_eq!(percentile_of_sorted(&sorted(&[3.0, 1.0, 2.0]), 50.0), 2.0);
        assert_eq!(compute_summary(&[3.0, 1.0, 2.0]).median, 2.0);
    }

    #[test]
    fn test_slow_run_is_kept() {
        // One slow repetition must move the mean and max
        let summary = compute_summary(&[0.1, 0.1, 0.1, 0.1, 2.0]);
        assert_eq!(summary.max, 2.0);
        assert!(summary.mean > 0.4);
        assert!(summary.std_dev > summary.mean);
    }
}
