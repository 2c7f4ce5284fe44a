//! Orchestration Progress
//!
//! A single writer (`ProgressReporter`, owned by the orchestrator thread) and
//! any number of read-only observers (`ProgressHandle`). Every update replaces
//! the whole snapshot under one write lock, so an observer never sees a level
//! from one update paired with flags from another.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// Orchestration lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Nothing launched yet
    Idle,
    /// Runs in progress
    Running,
    /// All descriptors processed
    Succeeded,
    /// Aborted by a fatal error or cancellation
    Failed,
}

/// Consistent copy of the progress state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Lifecycle state
    pub phase: Phase,
    /// Completed fraction in `[0, 1]`
    pub level: f64,
    /// Human readable status
    pub message: String,
    /// Terminal success
    pub done: bool,
    /// Terminal failure
    pub failed: bool,
    /// Descriptors processed so far
    pub completed: usize,
    /// Descriptors in the matrix
    pub total: usize,
}

impl ProgressSnapshot {
    fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            level: 0.0,
            message: "Waiting for analysis start ...".to_string(),
            done: false,
            failed: false,
            completed: 0,
            total: 0,
        }
    }

    /// Whether the orchestration reached a terminal state
    pub fn is_terminal(&self) -> bool {
        self.done || self.failed
    }
}

/// Create a connected reporter/handle pair in the idle state
pub fn progress_channel() -> (ProgressReporter, ProgressHandle) {
    let shared = Arc::new(RwLock::new(ProgressSnapshot::idle()));
    (
        ProgressReporter {
            shared: Arc::clone(&shared),
        },
        ProgressHandle { shared },
    )
}

/// Write side of the progress state
#[derive(Debug)]
pub struct ProgressReporter {
    shared: Arc<RwLock<ProgressSnapshot>>,
}

impl ProgressReporter {
    /// Another observer for this reporter
    pub fn handle(&self) -> ProgressHandle {
        ProgressHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Enter `Running` with `total` descriptors; resets any previous orchestration
    pub fn start(&self, total: usize, message: impl Into<String>) {
        *self.shared.write() = ProgressSnapshot {
            phase: Phase::Running,
            level: 0.0,
            message: message.into(),
            done: false,
            failed: false,
            completed: 0,
            total,
        };
    }

    /// Record one completed descriptor
    pub fn advance(&self, message: impl Into<String>) {
        let mut state = self.shared.write();
        state.completed = (state.completed + 1).min(state.total);
        state.level = if state.total == 0 {
            1.0
        } else {
            state.completed as f64 / state.total as f64
        };
        state.message = message.into();
    }

    /// Terminal success
    pub fn succeed(&self, message: impl Into<String>) {
        let mut state = self.shared.write();
        state.phase = Phase::Succeeded;
        state.completed = state.total;
        state.level = 1.0;
        state.done = true;
        state.failed = false;
        state.message = message.into();
    }

    /// Terminal failure; the level stays where the orchestration stopped
    pub fn fail(&self, message: impl Into<String>) {
        let mut state = self.shared.write();
        state.phase = Phase::Failed;
        state.done = false;
        state.failed = true;
        state.message = message.into();
    }
}

/// Read-only, cloneable view of the progress state
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    shared: Arc<RwLock<ProgressSnapshot>>,
}

impl ProgressHandle {
    /// Consistent copy of the whole state
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.shared.read().clone()
    }

    /// Completed fraction
    pub fn level(&self) -> f64 {
        self.shared.read().level
    }

    /// Status message
    pub fn message(&self) -> String {
        self.shared.read().message.clone()
    }

    /// Terminal success flag
    pub fn is_done(&self) -> bool {
        self.shared.read().done
    }

    /// Terminal failure flag
    pub fn is_failed(&self) -> bool {
        self.shared.read().failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let (_reporter, handle) = progress_channel();
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.phase, Phase::Idle);
        assert_eq!(snapshot.level, 0.0);
        assert!(!snapshot.is_terminal());
    }

    #[test]
    fn test_advance_is_monotonic_and_exact() {
        let (reporter, handle) = progress_channel();
        reporter.start(3, "Starting");
        let mut last = 0.0;
        for i in 0..3 {
            reporter.advance(format!("step {}", i));
            let level = handle.level();
            assert!(level > last);
            last = level;
        }
        assert_eq!(handle.level(), 1.0);
        assert_eq!(handle.message(), "step 2");

        // Extra advances never overshoot
        reporter.advance("extra");
        assert_eq!(handle.level(), 1.0);
    }

    #[test]
    fn test_terminal_states() {
        let (reporter, handle) = progress_channel();
        reporter.start(4, "Starting");
        reporter.advance("one");
        reporter.fail("boom");
        let snapshot = handle.snapshot();
        assert!(snapshot.failed);
        assert!(!snapshot.done);
        assert_eq!(snapshot.level, 0.25);
        assert_eq!(snapshot.phase, Phase::Failed);

        // A new orchestration resets everything
        reporter.start(1, "again");
        reporter.advance("done");
        reporter.succeed("finished");
        let snapshot = handle.snapshot();
        assert!(snapshot.done);
        assert!(!snapshot.failed);
        assert_eq!(snapshot.level, 1.0);
    }

    #[test]
    fn test_concurrent_reader_sees_consistent_snapshots() {
        let (reporter, handle) = progress_channel();
        reporter.start(1000, "Starting");

        let reader = std::thread::spawn(move || {
            for _ in 0..2000 {
                let s = handle.snapshot();
                let expected = if s.total == 0 {
                    0.0
                } else {
                    s.completed as f64 / s.total as f64
                };
                assert!((s.level - expected).abs() < 1e-12);
                assert!(!(s.done && s.failed));
            }
        });

        for i in 0..1000 {
            reporter.advance(format!("{}", i));
        }
        reporter.succeed("ok");
        reader.join().unwrap();
    }
}
