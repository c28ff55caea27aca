//! Error type for report (de)serialization and sidecar I/O.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing a QA report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// JSON (de)serialization failed.
    #[error("report JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a report sidecar failed.
    #[error("report I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
