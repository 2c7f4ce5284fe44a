//! Run Matrix Planner
//!
//! Expands a validated configuration into the ordered list of run descriptors.
//!
//! Heap sweeps:
//! - init heap: `init_heap, init_heap + step, ...` while `<= init_heap_limit`
//! - max heap: `max_heap, max_heap + step, ...` while `<= max_heap_limit`
//!
//! Ordering: collector (enumeration order), then heap pair, then repetition.
//! The expansion is pure and its length is known before anything runs.

use gcbench_core::{HeapPair, RunConfiguration, RunDescriptor, SweepPairing};

/// Execution plan for one orchestration
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    /// Ordered list of runs to execute
    pub descriptors: Vec<RunDescriptor>,
    /// Distinct heap pairs, in sweep order
    pub heap_pairs: Vec<HeapPair>,
}

impl ExecutionPlan {
    /// Number of runs
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the matrix has no descriptor
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Stepped values from `start` up to and including `limit`
fn sweep_steps(start: u32, step: u32, limit: u32) -> Vec<u32> {
    let step = step.max(1);
    let mut steps = Vec::new();
    let mut value = start;
    while value <= limit {
        steps.push(value);
        match value.checked_add(step) {
            Some(next) => value = next,
            None => break,
        }
    }
    // A start above the limit still yields the configured value
    if steps.is_empty() {
        steps.push(start);
    }
    steps
}

/// Heap pairs generated by the configured sweeps
pub fn heap_pairs(config: &RunConfiguration) -> Vec<HeapPair> {
    let inits = sweep_steps(
        config.init_heap(),
        config.init_heap_increment(),
        config.init_heap_limit(),
    );
    let maxes = sweep_steps(
        config.max_heap(),
        config.max_heap_increment(),
        config.max_heap_limit(),
    );

    match config.pairing() {
        SweepPairing::Crossed => inits
            .iter()
            .flat_map(|&init| maxes.iter().map(move |&max| HeapPair::new(init, max)))
            .collect(),
        SweepPairing::Paired => {
            let len = inits.len().max(maxes.len());
            (0..len)
                .map(|i| {
                    let init = inits[i.min(inits.len() - 1)];
                    let max = maxes[i.min(maxes.len() - 1)];
                    HeapPair::new(init, max)
                })
                .collect()
        }
    }
}

/// Build execution plan from a validated configuration
pub fn build_plan(config: &RunConfiguration) -> ExecutionPlan {
    let heap_pairs = heap_pairs(config);
    let repetitions = config.runs();

    let mut descriptors =
        Vec::with_capacity(config.collector_count() * heap_pairs.len() * repetitions as usize);
    for collector in config.collectors() {
        for &heap in &heap_pairs {
            for repetition in 1..=repetitions {
                descriptors.push(RunDescriptor {
                    sequence: descriptors.len(),
                    collector,
                    heap,
                    repetition,
                    repetitions,
                });
            }
        }
    }

    ExecutionPlan {
        descriptors,
        heap_pairs,
    }
}
