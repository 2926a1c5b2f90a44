//! JSON export for finished runs
//!
//! Writes one document holding the run summary, the full snapshot and the
//! aggregated bucket series.

use crate::aggregator::{AggregatedSeries, TimeSeriesAggregator};
use crate::error::MetricsError;
use crate::export::SnapshotExporter;
use crate::summary::RunSummary;
use ratesim_core::SimulationSnapshot;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// JSON exporter for simulation snapshots
#[derive(Debug)]
pub struct JsonExporter {
    path: PathBuf,
    pretty: bool,
    aggregator: TimeSeriesAggregator,
}

impl JsonExporter {
    /// Create a new JSON exporter
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `pretty` - Whether to pretty-print the JSON
    pub fn new(path: &Path, pretty: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            pretty,
            aggregator: TimeSeriesAggregator::default(),
        }
    }

    /// Use a non-default bucketing for the exported series.
    #[must_use]
    pub fn with_aggregator(mut self, aggregator: TimeSeriesAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }
}

#[derive(Debug, Serialize)]
struct ExportData<'a> {
    summary: RunSummary,
    snapshot: &'a SimulationSnapshot,
    series: AggregatedSeries,
}

impl SnapshotExporter for JsonExporter {
    fn export(&self, snapshot: &SimulationSnapshot) -> Result<(), MetricsError> {
        let export_data = ExportData {
            summary: RunSummary::from_snapshot(snapshot)?,
            snapshot,
            series: self.aggregator.aggregate(&snapshot.samples),
        };

        let json = if self.pretty {
            serde_json::to_string_pretty(&export_data)
        } else {
            serde_json::to_string(&export_data)
        }?;

        let mut file = File::create(&self.path)
            .map_err(|e| MetricsError::ExportError(format!("Failed to create file: {e}")))?;
        file.write_all(json.as_bytes())
            .map_err(|e| MetricsError::ExportError(format!("Failed to write to file: {e}")))?;

        info!(path = %self.path.display(), bytes = json.len(), "Exported run to JSON");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures;

    #[test]
    fn test_json_export() {
        let snapshot = fixtures::snapshot();
        let temp_file = std::env::temp_dir().join("ratesim_test_run.json");

        JsonExporter::new(&temp_file, true).export(&snapshot).unwrap();

        let json_content = std::fs::read_to_string(&temp_file).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json_content).unwrap();
        assert_eq!(parsed["summary"]["total_requests"], 20);
        assert_eq!(parsed["snapshot"]["strategy"], "Fixed Rate");
        assert_eq!(parsed["snapshot"]["samples"].as_array().unwrap().len(), 20);
        assert!(!parsed["series"]["coarse"].as_array().unwrap().is_empty());

        std::fs::remove_file(temp_file).ok();
    }

    #[test]
    fn test_json_export_to_missing_directory_fails() {
        let snapshot = fixtures::snapshot();
        let path = std::env::temp_dir()
            .join("ratesim_missing_dir")
            .join("nested")
            .join("run.json");
        let result = JsonExporter::new(&path, false).export(&snapshot);
        assert!(matches!(result, Err(MetricsError::ExportError(_))));
    }
}
