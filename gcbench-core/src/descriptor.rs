//! Run Descriptors

use crate::collector::Collector;
use serde::{Deserialize, Serialize};
use std::fmt;

/// `-Xms` / `-Xmx` pair in MB
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HeapPair {
    /// Initial heap size (MB)
    pub init_mb: u32,
    /// Maximum heap size (MB)
    pub max_mb: u32,
}

impl HeapPair {
    /// Create a heap pair
    pub fn new(init_mb: u32, max_mb: u32) -> Self {
        Self { init_mb, max_mb }
    }
}

impl fmt::Display for HeapPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-Xms{}m -Xmx{}m", self.init_mb, self.max_mb)
    }
}

/// One concrete execution unit of the run matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunDescriptor {
    /// 0-based position in the expanded matrix
    pub sequence: usize,
    /// Collector under test
    pub collector: Collector,
    /// Heap bounds for this run
    pub heap: HeapPair,
    /// 1-based repetition index
    pub repetition: u32,
    /// Repetitions configured for this (collector, heap) cell
    pub repetitions: u32,
}

impl fmt::Display for RunDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} run {}/{}",
            self.collector, self.heap, self.repetition, self.repetitions
        )
    }
}
