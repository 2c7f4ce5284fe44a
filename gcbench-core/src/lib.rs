#![warn(missing_docs)]
//! gcbench Core - Domain Types
//!
//! This crate holds the vocabulary shared by the orchestration engine and its
//! collaborators:
//! - `Collector` / `Metric` closed enumerations
//! - `RunSettings` (raw input) and the validated, immutable `RunConfiguration`
//! - `RunDescriptor` (one concrete execution unit) and `RunRecord` (its outcome)
//! - `Progress` reporter/handle pair shared between the orchestrator thread and observers

mod collector;
mod config;
mod descriptor;
mod progress;
mod record;

pub use collector::{Collector, Metric};
pub use config::{
    Artifact, ArtifactKind, ConfigurationError, RunConfiguration, RunSettings, SweepPairing,
    HEAP_CEILING_MB, MAX_HEAP_FLOOR_MB, MAX_RUNS,
};
pub use descriptor::{HeapPair, RunDescriptor};
pub use progress::{Phase, ProgressHandle, ProgressReporter, ProgressSnapshot, progress_channel};
pub use record::{FailureKind, RunRecord, RunStatus};
