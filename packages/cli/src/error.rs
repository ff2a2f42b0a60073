use std::path::PathBuf;

use thiserror::Error;

/// Errors that can stop a pipeline run.
///
/// Only boundary failures live here (missing inputs, unreadable files,
/// unwritable outputs). The computational stages themselves never
/// fail: bad geometry is flagged, join gaps and ties are data, and an
/// empty filter result is an empty table.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required input dataset does not exist.
    #[error("Missing input dataset: {path}")]
    MissingInput {
        /// Path that was expected to exist.
        path: PathBuf,
    },

    /// File read/write failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input layer could not be parsed as GeoJSON.
    #[error("GeoJSON error: {0}")]
    Geojson(#[from] geojson::Error),

    /// CSV output failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input layer was structurally unusable.
    #[error("Input error: {message}")]
    Input {
        /// Description of what went wrong.
        message: String,
    },
}
