//! Error types for aggregation, summaries and export

use thiserror::Error;

/// Errors raised while summarizing or exporting a run
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Histogram error: {0}")]
    Histogram(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
