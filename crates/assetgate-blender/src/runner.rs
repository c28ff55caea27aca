//! Blender subprocess management.
//!
//! Spawns `blender --background --factory-startup --python <script>` with the
//! asset path and a snapshot output path, waits with a timeout, and parses
//! the JSON envelope the script writes.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, ProbeResult};

/// Default timeout for Blender execution (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration for the snapshot runner.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Path to the Blender executable; discovered when `None`.
    pub blender_path: Option<PathBuf>,
    /// Path to the Python extraction script.
    pub script_path: PathBuf,
    /// Timeout for Blender execution.
    pub timeout: Duration,
    /// Whether to capture Blender's stderr for error reporting.
    pub capture_output: bool,
}

impl ProbeConfig {
    /// Creates a config for the given extraction script.
    pub fn with_script(script_path: impl Into<PathBuf>) -> Self {
        Self {
            blender_path: None,
            script_path: script_path.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            capture_output: true,
        }
    }

    /// Sets the Blender executable path.
    pub fn blender_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.blender_path = Some(path.into());
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Envelope written by the extraction script.
///
/// The `snapshot` payload stays an untyped JSON value here; the consumer
/// deserializes it into its scene-snapshot types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    /// Whether extraction succeeded.
    pub ok: bool,
    /// Error message if extraction failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The scene facts document.
    #[serde(default)]
    pub snapshot: serde_json::Value,
    /// Blender version used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blender_version: Option<String>,
    /// Extraction time in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// Runs headless Blender to extract scene snapshots.
pub struct SnapshotRunner {
    config: ProbeConfig,
}

impl SnapshotRunner {
    /// Creates a runner with the given configuration.
    pub fn with_config(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// Finds the Blender executable.
    fn find_blender(&self) -> ProbeResult<PathBuf> {
        if let Some(ref path) = self.config.blender_path {
            if path.exists() {
                return Ok(path.clone());
            }
        }

        if let Ok(path) = std::env::var("BLENDER_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(path);
            }
        }

        let blender_names = if cfg!(windows) {
            vec!["blender.exe", "blender"]
        } else {
            vec!["blender"]
        };
        for name in blender_names {
            if let Ok(path) = which::which(name) {
                return Ok(path);
            }
        }

        let common_paths = if cfg!(windows) {
            vec![
                "C:\\Program Files\\Blender Foundation\\Blender 4.0\\blender.exe",
                "C:\\Program Files\\Blender Foundation\\Blender\\blender.exe",
            ]
        } else if cfg!(target_os = "macos") {
            vec!["/Applications/Blender.app/Contents/MacOS/Blender"]
        } else {
            vec!["/usr/bin/blender", "/usr/local/bin/blender", "/snap/bin/blender"]
        };
        for path_str in common_paths {
            let path = PathBuf::from(path_str);
            if path.exists() {
                return Ok(path);
            }
        }

        Err(ProbeError::BlenderNotFound)
    }

    /// Runs Blender to extract a snapshot for `asset_path`, writing the
    /// envelope to `snapshot_path`.
    pub fn probe(&self, asset_path: &Path, snapshot_path: &Path) -> ProbeResult<SnapshotEnvelope> {
        let blender_path = self.find_blender()?;

        if !self.config.script_path.exists() {
            return Err(ProbeError::ScriptNotFound {
                path: self.config.script_path.clone(),
            });
        }

        // blender --background --factory-startup --python <script> --
        //     --asset <path> --snapshot <path>
        let mut cmd = Command::new(&blender_path);
        cmd.arg("--background")
            .arg("--factory-startup")
            .arg("--python")
            .arg(&self.config.script_path)
            .arg("--")
            .arg("--asset")
            .arg(asset_path)
            .arg("--snapshot")
            .arg(snapshot_path);

        if self.config.capture_output {
            // Leave stdout unpiped; a filled stdout pipe can deadlock the
            // subprocess.
            cmd.stdout(Stdio::null()).stderr(Stdio::piped());
        }

        let child = cmd.spawn().map_err(ProbeError::SpawnFailed)?;
        let (status, stderr) =
            wait_with_timeout(child, self.config.timeout, self.config.capture_output)?;

        if !status.success() {
            return Err(ProbeError::process_failed(
                status.code().unwrap_or(-1),
                stderr,
            ));
        }

        let content = std::fs::read_to_string(snapshot_path).map_err(|source| {
            ProbeError::ReadSnapshotFailed {
                path: snapshot_path.to_path_buf(),
                source,
            }
        })?;
        let envelope: SnapshotEnvelope =
            serde_json::from_str(&content).map_err(ProbeError::ParseFailed)?;

        if !envelope.ok {
            return Err(ProbeError::extraction_failed(
                envelope
                    .error
                    .unwrap_or_else(|| "unknown extraction error".to_string()),
            ));
        }

        Ok(envelope)
    }

    /// Runs the probe with the envelope written to a temp directory.
    pub fn probe_to_temp(&self, asset_path: &Path) -> ProbeResult<SnapshotEnvelope> {
        let temp_dir = tempfile::tempdir().map_err(ProbeError::Io)?;
        let snapshot_path = temp_dir.path().join("snapshot.json");
        self.probe(asset_path, &snapshot_path)
    }
}

fn wait_with_timeout(
    mut child: Child,
    timeout: Duration,
    capture_output: bool,
) -> ProbeResult<(ExitStatus, String)> {
    let start = Instant::now();

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ProbeError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    });
                }
                std::thread::sleep(Duration::from_millis(100));
            }
            Err(e) => return Err(ProbeError::SpawnFailed(e)),
        }
    };

    let stderr = if capture_output {
        let mut buf = String::new();
        if let Some(mut err) = child.stderr.take() {
            let _ = err.read_to_string(&mut buf);
        }
        buf
    } else {
        String::new()
    };

    Ok((status, stderr))
}
