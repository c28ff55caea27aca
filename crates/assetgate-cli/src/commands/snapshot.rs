//! Snapshot command: run headless Blender to extract a scene snapshot.

use anyhow::{Context, Result};
use assetgate_blender::{ProbeConfig, SnapshotRunner};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Runs the snapshot command.
pub fn run(
    asset_path: &Path,
    script: &Path,
    blender: Option<&Path>,
    out: Option<&Path>,
    timeout_secs: u64,
) -> Result<ExitCode> {
    let mut config = ProbeConfig::with_script(script).timeout_secs(timeout_secs);
    if let Some(path) = blender {
        config = config.blender_path(path);
    }
    let runner = SnapshotRunner::with_config(config);

    let out_path: PathBuf = match out {
        Some(path) => path.to_path_buf(),
        None => default_snapshot_path(asset_path),
    };

    let envelope = runner
        .probe(asset_path, &out_path)
        .with_context(|| format!("snapshot extraction failed for {}", asset_path.display()))?;

    println!(
        "{} {} -> {}",
        "Snapshot:".cyan().bold(),
        asset_path.display(),
        out_path.display()
    );
    if let Some(version) = &envelope.blender_version {
        println!("{} Blender {}", "Via:".dimmed(), version);
    }
    if let Some(ms) = envelope.duration_ms {
        println!("{} {} ms", "Took:".dimmed(), ms);
    }

    Ok(ExitCode::SUCCESS)
}

/// `crate.glb` becomes `crate.snapshot.json` next to the asset.
fn default_snapshot_path(asset_path: &Path) -> PathBuf {
    let stem = asset_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("asset");
    asset_path.with_file_name(format!("{stem}.snapshot.json"))
}
