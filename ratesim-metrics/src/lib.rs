//! Aggregation, summaries and export for ratesim runs
//!
//! This crate turns the samples and statistics of a
//! [`Simulation`](ratesim_core::Simulation) into something to look at:
//!
//! - [`TimeSeriesAggregator`]: fine (rate) and coarse (outcome count) buckets
//!   keyed by time before the newest sample.
//! - [`RunSummary`]: accumulated statistics plus `hdrhistogram` percentiles of
//!   target and measured RPM.
//! - [`export`]: JSON and CSV writers.
//! - [`with_captured_metrics`]: an in-memory `metrics` recorder for the
//!   driver's counters and gauges.

pub mod aggregator;
pub mod error;
pub mod export;
pub mod recorder;
pub mod summary;

pub use aggregator::{
    AggregatedSeries, AggregatorConfig, CoarseBucket, FineBucket, TimeSeriesAggregator,
};
pub use error::MetricsError;
pub use export::{export_csv, export_json, SnapshotExporter};
pub use recorder::{with_captured_metrics, CapturedMetrics, CapturingRecorder};
pub use summary::{RpmPercentiles, RunSummary};
