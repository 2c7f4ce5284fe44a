//! Result History
//!
//! A JSON file holding one condensed entry per successful orchestration: the
//! artifact file name, the best GC time of every tested collector and a UTC
//! timestamp. Rows are exposed by an opaque, stable index.

use crate::report::LeaderboardEntry;
use chrono::{DateTime, Utc};
use gcbench_core::Collector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column titles of the history table
pub const HISTORY_COLUMNS: [&str; 7] = [
    "File Name",
    "Serial",
    "Parallel",
    "G1",
    "ZGC",
    "Shenandoah",
    "Date",
];

/// History file access errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Reading or writing the file failed
    #[error("Failed to access history file {}: {source}", .path.display())]
    Io {
        /// History file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid history
    #[error("History file {} is corrupt: {source}", .path.display())]
    Corrupt {
        /// History file
        path: PathBuf,
        /// Parse error
        #[source]
        source: serde_json::Error,
    },

    /// Entries could not be serialised
    #[error("Failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One persisted orchestration summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Artifact file name
    pub artifact: String,
    /// Best GC time per ranked collector (seconds)
    pub best_gc_time_secs: BTreeMap<Collector, f64>,
    /// When the orchestration finished
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Condense a leaderboard
    pub fn from_leaderboard(
        artifact: impl Into<String>,
        leaderboard: &[LeaderboardEntry],
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            artifact: artifact.into(),
            best_gc_time_secs: leaderboard
                .iter()
                .map(|e| (e.collector, e.best_gc_time_secs))
                .collect(),
            timestamp,
        }
    }
}

/// Display form of a history entry: one cell per collector in enumeration order
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    /// Opaque row key
    pub index: usize,
    /// Artifact file name
    pub file_name: String,
    /// Best GC time per collector in enumeration order
    pub best_gc_time_secs: [Option<f64>; 5],
    /// When the orchestration finished
    pub date: DateTime<Utc>,
}

impl HistoryRow {
    /// Cells in `HISTORY_COLUMNS` order, formatted for display
    pub fn cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(HISTORY_COLUMNS.len());
        cells.push(self.file_name.clone());
        cells.extend(
            self.best_gc_time_secs
                .iter()
                .map(|v| v.map(|s| format!("{:.3}", s)).unwrap_or_default()),
        );
        cells.push(self.date.format("%Y-%m-%d %H:%M:%S").to_string());
        cells
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    version: u32,
    entries: Vec<HistoryEntry>,
}

/// JSON-file backed history of orchestration results
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Open the store at `path`; a missing file is an empty history
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();
        let entries = if path.exists() {
            let text = std::fs::read_to_string(&path).map_err(|source| HistoryError::Io {
                path: path.clone(),
                source,
            })?;
            let file: HistoryFile =
                serde_json::from_str(&text).map_err(|source| HistoryError::Corrupt {
                    path: path.clone(),
                    source,
                })?;
            file.entries
        } else {
            Vec::new()
        };
        Ok(Self { path, entries })
    }

    /// Location of the history file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `entry`, persist, and return its row index
    pub fn record(&mut self, entry: HistoryEntry) -> Result<usize, HistoryError> {
        self.entries.push(entry);
        self.save()?;
        Ok(self.entries.len() - 1)
    }

    fn save(&self) -> Result<(), HistoryError> {
        let io_err = |source| HistoryError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let file = HistoryFile {
            version: 1,
            entries: self.entries.clone(),
        };
        let text = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.path, text).map_err(io_err)
    }

    /// Entry stored under `index`
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every entry as a display row, oldest first
    pub fn rows(&self) -> Vec<HistoryRow> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let mut cells = [None; 5];
                for (slot, collector) in cells.iter_mut().zip(Collector::ALL) {
                    *slot = entry.best_gc_time_secs.get(&collector).copied();
                }
                HistoryRow {
                    index,
                    file_name: entry.artifact.clone(),
                    best_gc_time_secs: cells,
                    date: entry.timestamp,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn entry(artifact: &str, g1: f64, serial: Option<f64>) -> HistoryEntry {
        let mut best = BTreeMap::new();
        best.insert(Collector::G1, g1);
        if let Some(s) = serial {
            best.insert(Collector::Serial, s);
        }
        HistoryEntry {
            artifact: artifact.to_string(),
            best_gc_time_secs: best,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::open(dir.path().join("history.json")).unwrap();
        assert!(store.is_empty());
        assert!(store.rows().is_empty());
    }

    #[test]
    fn test_record_and_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("history.json");

        let mut store = HistoryStore::open(&path).unwrap();
        assert_eq!(store.record(entry("app.jar", 0.1, Some(0.5))).unwrap(), 0);
        assert_eq!(store.record(entry("Main.class", 0.2, None)).unwrap(), 1);

        let reopened = HistoryStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get(1).unwrap().artifact, "Main.class");

        let rows = reopened.rows();
        assert_eq!(rows[0].index, 0);
        assert_eq!(rows[0].best_gc_time_secs[0], Some(0.5));
        assert_eq!(rows[0].best_gc_time_secs[1], None);
        assert_eq!(rows[0].best_gc_time_secs[2], Some(0.1));
        assert_eq!(
            rows[1].cells(),
            vec!["Main.class", "", "", "0.200", "", "", "2024-03-01 12:30:00"]
        );
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            HistoryStore::open(&path),
            Err(HistoryError::Corrupt { .. })
        ));
    }
}
