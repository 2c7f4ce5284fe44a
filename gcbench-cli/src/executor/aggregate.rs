//! Leaderboard Aggregation
//!
//! Reduces the per-run records of one orchestration into per-collector
//! statistics and a total ranking.
//!
//! - Only successful records feed the statistics; a collector without any
//!   successful run is left out of the ranking but keeps its result rows.
//! - Each requested metric is min-max scaled across the ranked collectors
//!   (0 = best) and the composite score is the weighted mean of those values.
//! - Ascending composite score, ties broken by collector enumeration order.

use fxhash::FxHashMap;
use gcbench_core::{Collector, ConfigurationError, Metric, RunRecord};
use gcbench_report::{LeaderboardEntry, MetricScore, ResultRow};
use gcbench_stats::{
    Criterion, DEFAULT_METRIC_WEIGHT, Direction, ScoringError, SummaryStatistics,
    composite_scores, compute_summary, mean, min_max_scale,
};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Per-collector figures before ranking
#[derive(Debug, Clone)]
struct CollectorStatistics {
    collector: Collector,
    best_gc_time_secs: f64,
    avg_gc_time_secs: f64,
    avg_throughput: f64,
    avg_latency_secs: f64,
    total_minor_pauses: u64,
    total_full_pauses: u64,
    avg_minor_pauses: f64,
    avg_full_pauses: f64,
    successful_runs: usize,
    failed_runs: usize,
    gc_time: SummaryStatistics,
}

impl CollectorStatistics {
    /// `None` when the collector has no successful run
    fn compute(collector: Collector, records: &[&RunRecord]) -> Option<Self> {
        let successful: Vec<&RunRecord> = records.iter().copied().filter(|r| !r.is_failed()).collect();
        if successful.is_empty() {
            return None;
        }

        let gc_times: Vec<f64> = successful.iter().map(|r| r.gc_time_secs).collect();
        let throughputs: Vec<f64> = successful.iter().map(|r| r.throughput).collect();
        let latencies: Vec<f64> = successful.iter().map(|r| r.latency_secs).collect();
        let total_minor_pauses: u64 = successful.iter().map(|r| r.minor_pauses as u64).sum();
        let total_full_pauses: u64 = successful.iter().map(|r| r.full_pauses as u64).sum();
        let runs = successful.len() as f64;
        let gc_time = compute_summary(&gc_times);

        Some(Self {
            collector,
            best_gc_time_secs: gc_time.min,
            avg_gc_time_secs: gc_time.mean,
            avg_throughput: mean(&throughputs),
            avg_latency_secs: mean(&latencies),
            total_minor_pauses,
            total_full_pauses,
            avg_minor_pauses: total_minor_pauses as f64 / runs,
            avg_full_pauses: total_full_pauses as f64 / runs,
            successful_runs: successful.len(),
            failed_runs: records.len() - successful.len(),
            gc_time,
        })
    }

    fn metric_value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::BestRuntime => self.best_gc_time_secs,
            Metric::AvgRuntime => self.avg_gc_time_secs,
            Metric::Throughput => self.avg_throughput,
            Metric::Latency => self.avg_latency_secs,
            Metric::MinorPauseCount => self.avg_minor_pauses,
            Metric::FullPauseCount => self.avg_full_pauses,
        }
    }
}

fn direction(metric: Metric) -> Direction {
    if metric.higher_is_better() {
        Direction::HigherIsBetter
    } else {
        Direction::LowerIsBetter
    }
}

/// Ranked leaderboard plus one row per record
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Ranked collectors, best first
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Collectors whose every run failed, in enumeration order
    pub unranked: Vec<Collector>,
    /// One row per record, in run order
    pub rows: Vec<ResultRow>,
}

impl Aggregation {
    /// Collector identities in leaderboard order
    pub fn ranking(&self) -> Vec<Collector> {
        self.leaderboard.iter().map(|e| e.collector).collect()
    }
}

/// Reduces run records into a ranked leaderboard
#[derive(Debug, Clone, Default)]
pub struct LeaderboardAggregator {
    weights: BTreeMap<Metric, f64>,
}

impl LeaderboardAggregator {
    /// Aggregator with equal metric weights
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregator with explicit per-metric weights; unlisted metrics weigh 1.0.
    ///
    /// Weights must be finite and non-negative.
    pub fn with_weights(weights: BTreeMap<Metric, f64>) -> Result<Self, ConfigurationError> {
        if let Some((&metric, &weight)) = weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(ConfigurationError::InvalidWeight { metric, weight });
        }
        Ok(Self { weights })
    }

    fn weight(&self, metric: Metric) -> f64 {
        self.weights
            .get(&metric)
            .copied()
            .unwrap_or(DEFAULT_METRIC_WEIGHT)
    }

    /// Aggregate `records` and rank collectors on `metrics`.
    ///
    /// Deterministic: the same input always yields the same leaderboard.
    pub fn aggregate(
        &self,
        records: &[RunRecord],
        metrics: &[Metric],
    ) -> Result<Aggregation, ScoringError> {
        let metrics: BTreeSet<Metric> = metrics.iter().copied().collect();

        let mut groups: FxHashMap<Collector, Vec<&RunRecord>> = FxHashMap::default();
        for record in records {
            groups.entry(record.collector()).or_default().push(record);
        }
        let mut collectors: Vec<Collector> = groups.keys().copied().collect();
        collectors.sort();

        // Per-collector statistics are independent of each other
        let computed: Vec<(Collector, Option<CollectorStatistics>)> = collectors
            .par_iter()
            .map(|&collector| {
                let stats = groups
                    .get(&collector)
                    .and_then(|group| CollectorStatistics::compute(collector, group));
                (collector, stats)
            })
            .collect();

        let mut ranked = Vec::new();
        let mut unranked = Vec::new();
        for (collector, stats) in computed {
            match stats {
                Some(stats) => ranked.push(stats),
                None => unranked.push(collector),
            }
        }

        let criteria: Vec<Criterion> = metrics
            .iter()
            .map(|&metric| Criterion {
                values: ranked.iter().map(|s| s.metric_value(metric)).collect(),
                direction: direction(metric),
                weight: self.weight(metric),
            })
            .collect();
        let scores = composite_scores(&criteria, ranked.len())?;

        let scaled: Vec<Vec<f64>> = criteria
            .iter()
            .map(|c| min_max_scale(&c.values, c.direction))
            .collect();

        let mut order: Vec<usize> = (0..ranked.len()).collect();
        order.sort_by(|&a, &b| {
            scores[a]
                .total_cmp(&scores[b])
                .then(ranked[a].collector.cmp(&ranked[b].collector))
        });

        let leaderboard = order
            .into_iter()
            .enumerate()
            .map(|(position, index)| {
                let stats = &ranked[index];
                let metric_scores = metrics
                    .iter()
                    .zip(&scaled)
                    .map(|(&metric, scaled)| MetricScore {
                        metric,
                        value: stats.metric_value(metric),
                        scaled: scaled[index],
                    })
                    .collect();
                LeaderboardEntry {
                    rank: position + 1,
                    collector: stats.collector,
                    score: scores[index],
                    best_gc_time_secs: stats.best_gc_time_secs,
                    avg_gc_time_secs: stats.avg_gc_time_secs,
                    avg_throughput: stats.avg_throughput,
                    avg_latency_secs: stats.avg_latency_secs,
                    total_minor_pauses: stats.total_minor_pauses,
                    total_full_pauses: stats.total_full_pauses,
                    avg_minor_pauses: stats.avg_minor_pauses,
                    avg_full_pauses: stats.avg_full_pauses,
                    successful_runs: stats.successful_runs,
                    failed_runs: stats.failed_runs,
                    gc_time: stats.gc_time.clone(),
                    metric_scores,
                }
            })
            .collect();

        Ok(Aggregation {
            leaderboard,
            unranked,
            rows: records.iter().map(ResultRow::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcbench_core::{FailureKind, HeapPair, RunDescriptor, RunStatus};

    fn record(sequence: usize, collector: Collector, gc: f64, ok: bool) -> RunRecord {
        RunRecord {
            descriptor: RunDescriptor {
                sequence,
                collector,
                heap: HeapPair::new(64, 64),
                repetition: 1,
                repetitions: 1,
            },
            wall_time_secs: 2.0,
            elapsed_secs: 2.1,
            gc_time_secs: gc,
            minor_pauses: 10,
            full_pauses: 0,
            throughput: 1.0 - gc / 2.0,
            latency_secs: gc / 10.0,
            status: if ok {
                RunStatus::Succeeded
            } else {
                RunStatus::Failed {
                    kind: FailureKind::Parse,
                    message: "GC log has no wall-time summary".to_string(),
                }
            },
            diagnostics: String::new(),
        }
    }

    #[test]
    fn test_scenario_g1_beats_serial() {
        let records = vec![
            record(0, Collector::Serial, 0.5, true),
            record(1, Collector::Serial, 0.6, true),
            record(2, Collector::G1, 0.1, true),
            record(3, Collector::G1, 0.1, true),
        ];
        let aggregation = LeaderboardAggregator::new()
            .aggregate(&records, &Metric::ALL)
            .unwrap();
        assert_eq!(aggregation.ranking(), vec![Collector::G1, Collector::Serial]);

        let g1 = &aggregation.leaderboard[0];
        assert_eq!(g1.rank, 1);
        assert_eq!(g1.score, 0.0);
        assert_eq!(g1.best_gc_time_secs, 0.1);
        assert_eq!(g1.total_minor_pauses, 20);
        assert_eq!(g1.avg_minor_pauses, 10.0);

        let serial = &aggregation.leaderboard[1];
        assert_eq!(serial.best_gc_time_secs, 0.5);
        assert!((serial.avg_gc_time_secs - 0.55).abs() < 1e-12);
        // Pause counts are equal, so they scale to 0 for both
        let minor = serial
            .metric_scores
            .iter()
            .find(|m| m.metric == Metric::MinorPauseCount)
            .unwrap();
        assert_eq!(minor.scaled, 0.0);
    }

    #[test]
    fn test_failed_records_excluded_from_averages() {
        let records = vec![
            record(0, Collector::G1, 0.1, true),
            record(1, Collector::G1, 99.0, false),
        ];
        let aggregation = LeaderboardAggregator::new()
            .aggregate(&records, &[Metric::AvgRuntime])
            .unwrap();
        let g1 = &aggregation.leaderboard[0];
        assert_eq!(g1.avg_gc_time_secs, 0.1);
        assert_eq!(g1.successful_runs, 1);
        assert_eq!(g1.failed_runs, 1);

        assert_eq!(aggregation.rows.len(), 2);
        assert!(aggregation.rows[1].is_failed());
        assert_eq!(aggregation.rows[1].gc_runtime_seconds, None);
    }

    #[test]
    fn test_all_failed_collector_is_unranked() {
        let records = vec![
            record(0, Collector::Zgc, 0.3, false),
            record(1, Collector::Parallel, 0.2, true),
        ];
        let aggregation = LeaderboardAggregator::new()
            .aggregate(&records, &Metric::ALL)
            .unwrap();
        assert_eq!(aggregation.ranking(), vec![Collector::Parallel]);
        assert_eq!(aggregation.unranked, vec![Collector::Zgc]);
        // Rows keep run order
        assert_eq!(aggregation.rows[0].collector, Collector::Zgc);
        assert_eq!(aggregation.rows[1].collector, Collector::Parallel);
    }

    #[test]
    fn test_ties_follow_enumeration_order() {
        let records = vec![
            record(0, Collector::Shenandoah, 0.2, true),
            record(1, Collector::Serial, 0.2, true),
            record(2, Collector::G1, 0.2, true),
        ];
        let aggregator = LeaderboardAggregator::new();
        let first = aggregator.aggregate(&records, &Metric::ALL).unwrap();
        assert_eq!(
            first.ranking(),
            vec![Collector::Serial, Collector::G1, Collector::Shenandoah]
        );

        // Idempotent
        let second = aggregator.aggregate(&records, &Metric::ALL).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_throughput_prefers_higher() {
        let mut fast = record(0, Collector::Parallel, 0.4, true);
        fast.throughput = 0.99;
        let mut slow = record(1, Collector::Serial, 0.1, true);
        slow.throughput = 0.50;
        let aggregation = LeaderboardAggregator::new()
            .aggregate(&[fast, slow], &[Metric::Throughput])
            .unwrap();
        assert_eq!(aggregation.ranking(), vec![Collector::Parallel, Collector::Serial]);
    }

    #[test]
    fn test_weights_change_the_order() {
        // Serial wins GC time, Parallel wins throughput by a wider margin
        let mut serial = record(0, Collector::Serial, 0.1, true);
        serial.throughput = 0.5;
        let mut parallel = record(1, Collector::Parallel, 0.2, true);
        parallel.throughput = 0.9;
        let records = [serial, parallel];
        let metrics = [Metric::AvgRuntime, Metric::Throughput];

        let equal = LeaderboardAggregator::new()
            .aggregate(&records, &metrics)
            .unwrap();
        // Both score 0.5; the tie goes to Serial
        assert_eq!(equal.ranking(), vec![Collector::Serial, Collector::Parallel]);

        let mut weights = BTreeMap::new();
        weights.insert(Metric::Throughput, 3.0);
        let weighted = LeaderboardAggregator::with_weights(weights)
            .unwrap()
            .aggregate(&records, &metrics)
            .unwrap();
        assert_eq!(weighted.ranking(), vec![Collector::Parallel, Collector::Serial]);
    }

    #[test]
    fn test_invalid_weights_are_rejected() {
        for weight in [-1.0, f64::NAN, f64::INFINITY] {
            let weights = BTreeMap::from([(Metric::AvgRuntime, 1.0), (Metric::Throughput, weight)]);
            let err = LeaderboardAggregator::with_weights(weights).unwrap_err();
            assert!(matches!(
                err,
                ConfigurationError::InvalidWeight {
                    metric: Metric::Throughput,
                    ..
                }
            ));
        }

        // Zero switches a metric off and is accepted
        let weights = BTreeMap::from([(Metric::Latency, 0.0)]);
        assert!(LeaderboardAggregator::with_weights(weights).is_ok());
    }

    #[test]
    fn test_empty_records() {
        let aggregation = LeaderboardAggregator::new()
            .aggregate(&[], &Metric::ALL)
            .unwrap();
        assert!(aggregation.leaderboard.is_empty());
        assert!(aggregation.rows.is_empty());
    }
}
