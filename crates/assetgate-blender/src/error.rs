//! Error types for the Blender bridge.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Blender bridge operations.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while extracting a scene snapshot.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Blender executable not found.
    #[error("Blender executable not found. Install Blender and put it on PATH, or set BLENDER_PATH")]
    BlenderNotFound,

    /// The extraction script does not exist.
    #[error("extraction script not found at: {path}")]
    ScriptNotFound { path: PathBuf },

    /// Failed to spawn the Blender process.
    #[error("failed to spawn Blender process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// The Blender process timed out.
    #[error("Blender process timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The Blender process exited with a non-zero status.
    #[error("Blender process exited with status {exit_code}: {stderr}")]
    ProcessFailed { exit_code: i32, stderr: String },

    /// Reading the snapshot envelope back failed.
    #[error("failed to read snapshot from {path}: {source}")]
    ReadSnapshotFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot envelope is not valid JSON.
    #[error("failed to parse snapshot envelope: {0}")]
    ParseFailed(#[source] serde_json::Error),

    /// The extraction script reported a failure of its own.
    #[error("snapshot extraction failed: {message}")]
    ExtractionFailed { message: String },

    /// IO error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProbeError {
    /// Creates a new process failed error.
    pub fn process_failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self::ProcessFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Creates a new extraction failed error.
    pub fn extraction_failed(message: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            message: message.into(),
        }
    }
}
