//! Export of finished runs for analysis with external tools
//!
//! - JSON: summary, full snapshot and both bucket series in one document.
//! - CSV: `<stem>_samples.csv` with every retained sample and
//!   `<stem>_buckets.csv` with the fine and coarse bucket series.

pub mod csv;
pub mod json;

use crate::error::MetricsError;
use ratesim_core::SimulationSnapshot;
use std::path::Path;

/// Writes a snapshot to some destination.
pub trait SnapshotExporter {
    fn export(&self, snapshot: &SimulationSnapshot) -> Result<(), MetricsError>;
}

/// Export a snapshot to a JSON file
///
/// # Example
/// ```no_run
/// use ratesim_metrics::export::export_json;
/// # fn run(snapshot: &ratesim_core::SimulationSnapshot) -> Result<(), ratesim_metrics::MetricsError> {
/// export_json(snapshot, "results/run.json", true)?;
/// # Ok(())
/// # }
/// ```
pub fn export_json(
    snapshot: &SimulationSnapshot,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), MetricsError> {
    json::JsonExporter::new(path.as_ref(), pretty).export(snapshot)
}

/// Export a snapshot to `<stem>_samples.csv` and `<stem>_buckets.csv` next to `path`
pub fn export_csv(snapshot: &SimulationSnapshot, path: impl AsRef<Path>) -> Result<(), MetricsError> {
    csv::CsvExporter::new(path.as_ref()).export(snapshot)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use ratesim_core::{
        AccumulatedStats, ParameterDescriptor, SamplePoint, ServerConfig, SimTime,
        SimulationSnapshot, TimeConfig,
    };

    pub(crate) fn snapshot() -> SimulationSnapshot {
        let samples: Vec<SamplePoint> = (0..20)
            .map(|i| SamplePoint {
                relative_time_secs: i as f64,
                target_rpm: 60.0 + i as f64,
                actual_rpm: 58.0 + i as f64,
                was_good: i % 4 != 0,
            })
            .collect();
        let mut stats = AccumulatedStats::default();
        for sample in &samples {
            stats.record(sample);
        }
        SimulationSnapshot {
            time: SimTime::from_secs(19),
            strategy: "Fixed Rate",
            target_rpm: 79.0,
            current_rpm: 77.0,
            server_config: ServerConfig::default(),
            time_config: TimeConfig::default(),
            samples,
            stats,
            parameters: vec![ParameterDescriptor::new("rate", 79.0, 1.0, 300.0, 1.0)],
        }
    }
}
