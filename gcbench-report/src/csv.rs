//! CSV Export
//!
//! One line per result row. Failed runs keep their collector and repetition
//! index but leave every numeric cell empty.

use crate::report::ResultRow;
use gcbench_core::Collector;
use serde::{Deserialize, Serialize};
use std::io;

/// Fixed-arity CSV record; field names form the header row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvRow {
    /// Collector under test
    pub collector: Collector,
    /// 1-based repetition index
    pub repetition_index: u32,
    /// Total GC pause time; empty for a failed run
    pub gc_runtime_seconds: Option<f64>,
    /// Throughput in percent; empty for a failed run
    pub throughput_percent: Option<f64>,
    /// Full collections; empty for a failed run
    pub full_pause_count: Option<u32>,
    /// Minor pauses; empty for a failed run
    pub minor_pause_count: Option<u32>,
}

impl From<&ResultRow> for CsvRow {
    fn from(row: &ResultRow) -> Self {
        Self {
            collector: row.collector,
            repetition_index: row.repetition_index,
            gc_runtime_seconds: row.gc_runtime_seconds,
            throughput_percent: row.throughput_percent,
            full_pause_count: row.full_pause_count,
            minor_pause_count: row.minor_pause_count,
        }
    }
}

/// Write `rows` with a header line to `writer`
pub fn write_csv_rows<W: io::Write>(writer: W, rows: &[ResultRow]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(CsvRow::from(row))?;
    }
    // An empty export still carries the header
    if rows.is_empty() {
        writer.write_record([
            "collector",
            "repetition_index",
            "gc_runtime_seconds",
            "throughput_percent",
            "full_pause_count",
            "minor_pause_count",
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Render `rows` as a CSV document
pub fn generate_csv_report(rows: &[ResultRow]) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_csv_rows(&mut buffer, rows)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Parse a CSV document produced by [`write_csv_rows`]
pub fn read_csv_rows<R: io::Read>(reader: R) -> Result<Vec<CsvRow>, csv::Error> {
    csv::Reader::from_reader(reader).deserialize().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcbench_core::HeapPair;

    fn row(collector: Collector, rep: u32, gc: Option<f64>) -> ResultRow {
        ResultRow {
            collector,
            repetition_index: rep,
            heap: HeapPair::new(64, 64),
            gc_runtime_seconds: gc,
            throughput_percent: gc.map(|g| (1.0 - g / 3.0) * 100.0),
            full_pause_count: gc.map(|_| 1),
            minor_pause_count: gc.map(|_| 12),
            failure: gc.is_none().then(|| "exit: status 1".to_string()),
        }
    }

    #[test]
    fn test_header_and_failed_cells() {
        let rows = vec![
            row(Collector::G1, 1, Some(0.1)),
            row(Collector::Zgc, 1, None),
        ];
        let text = generate_csv_report(&rows).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "collector,repetition_index,gc_runtime_seconds,throughput_percent,full_pause_count,minor_pause_count"
            )
        );
        assert!(lines.next().unwrap().starts_with("G1,1,0.1,"));
        assert_eq!(lines.next(), Some("ZGC,1,,,,"));
    }

    #[test]
    fn test_empty_export_has_header() {
        let text = generate_csv_report(&[]).unwrap();
        assert!(text.starts_with("collector,repetition_index,"));
        assert!(read_csv_rows(text.as_bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_back_preserves_values() {
        let rows = vec![
            row(Collector::Serial, 1, Some(0.512_345_678)),
            row(Collector::Serial, 2, Some(1.0 / 3.0)),
            row(Collector::Shenandoah, 1, None),
        ];
        let text = generate_csv_report(&rows).unwrap();
        let parsed = read_csv_rows(text.as_bytes()).unwrap();

        assert_eq!(parsed.len(), rows.len());
        for (original, back) in rows.iter().zip(&parsed) {
            assert_eq!(back.collector, original.collector);
            assert_eq!(back.repetition_index, original.repetition_index);
            match (original.gc_runtime_seconds, back.gc_runtime_seconds) {
                (Some(a), Some(b)) => assert!((a - b).abs() < 1e-12),
                (None, None) => {}
                other => panic!("mismatched cells: {:?}", other),
            }
            assert_eq!(back.full_pause_count, original.full_pause_count);
            assert_eq!(back.minor_pause_count, original.minor_pause_count);
        }
    }
}
