//! CSV export for finished runs
//!
//! Suitable for spreadsheets and pandas. Two files are written next to the
//! given path:
//! - `{stem}_samples.csv` - one row per retained sample
//! - `{stem}_buckets.csv` - fine and coarse buckets, tagged by `series`

use crate::aggregator::TimeSeriesAggregator;
use crate::error::MetricsError;
use crate::export::SnapshotExporter;
use ratesim_core::SimulationSnapshot;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// CSV exporter for simulation snapshots
#[derive(Debug)]
pub struct CsvExporter {
    path: PathBuf,
    aggregator: TimeSeriesAggregator,
}

impl CsvExporter {
    /// Create a new CSV exporter
    ///
    /// `path` is a base path; only its parent directory and stem are used.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            aggregator: TimeSeriesAggregator::default(),
        }
    }

    #[must_use]
    pub fn with_aggregator(mut self, aggregator: TimeSeriesAggregator) -> Self {
        self.aggregator = aggregator;
        self
    }

    /// Path of the file with the given suffix
    pub fn path_for(&self, suffix: &str) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("run");
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        parent.join(format!("{stem}_{suffix}.csv"))
    }

    fn create(&self, suffix: &str) -> Result<BufWriter<File>, MetricsError> {
        let path = self.path_for(suffix);
        File::create(&path).map(BufWriter::new).map_err(|e| {
            MetricsError::ExportError(format!("Failed to create {}: {e}", path.display()))
        })
    }

    fn export_samples(&self, snapshot: &SimulationSnapshot) -> Result<(), MetricsError> {
        let mut file = self.create("samples")?;
        writeln!(file, "relative_time_secs,target_rpm,actual_rpm,was_good")?;
        for sample in &snapshot.samples {
            writeln!(
                file,
                "{},{},{},{}",
                sample.relative_time_secs, sample.target_rpm, sample.actual_rpm, sample.was_good
            )?;
        }
        file.flush()?;
        Ok(())
    }

    fn export_buckets(&self, snapshot: &SimulationSnapshot) -> Result<(), MetricsError> {
        let series = self.aggregator.aggregate(&snapshot.samples);
        let mut file = self.create("buckets")?;
        writeln!(file, "series,time_ago_secs,target_rpm,actual_rpm,good,bad")?;
        for bucket in &series.fine {
            let (good, bad) = if bucket.was_good { (1, 0) } else { (0, 1) };
            writeln!(
                file,
                "fine,{},{},{},{good},{bad}",
                bucket.time_ago_secs, bucket.target_rpm, bucket.actual_rpm
            )?;
        }
        for bucket in &series.coarse {
            writeln!(
                file,
                "coarse,{},,,{},{}",
                bucket.time_ago_secs, bucket.good, bucket.bad
            )?;
        }
        file.flush()?;
        Ok(())
    }
}

impl SnapshotExporter for CsvExporter {
    fn export(&self, snapshot: &SimulationSnapshot) -> Result<(), MetricsError> {
        self.export_samples(snapshot)?;
        self.export_buckets(snapshot)?;
        info!(
            samples = %self.path_for("samples").display(),
            buckets = %self.path_for("buckets").display(),
            "Exported run to CSV"
        );
        Ok(())
    }
}
