//! Check command: run the QA pipeline over one snapshot or a directory of
//! snapshots.

use anyhow::{Context, Result};
use assetgate_checks::QaPolicy;
use assetgate_report::{OverallStatus, QaReport};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use walkdir::WalkDir;

use crate::intake::{run_intake, make_metadata, IntakeConfig};
use crate::output::print_report;
use crate::pipeline::run_qa;
use crate::snapshot::SceneSnapshot;

/// Options for one check invocation.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Snapshot JSON to analyze.
    pub snapshot: Option<PathBuf>,
    /// Directory to scan for `*.snapshot.json` files (batch mode).
    pub input_dir: Option<PathBuf>,
    /// Original asset file; runs intake when given.
    pub asset: Option<PathBuf>,
    /// Asset category.
    pub category: String,
    /// Submission source.
    pub source: String,
    /// Submitter name.
    pub submitter: String,
    /// Policy file; category defaults are used when absent.
    pub policy: Option<PathBuf>,
    /// Directory for report sidecars; defaults to the snapshot's directory.
    pub output_dir: Option<PathBuf>,
    /// Emit the report JSON to stdout instead of the human summary.
    pub json: bool,
}

/// Runs the check command.
pub fn run(options: &CheckOptions) -> Result<ExitCode> {
    if let Some(dir) = &options.input_dir {
        return run_batch(dir, options);
    }

    let snapshot_path = options
        .snapshot
        .as_deref()
        .context("either --snapshot or --input-dir is required")?;
    let report = check_one(snapshot_path, options)?;

    if options.json {
        println!("{}", report.to_json_pretty()?);
    } else {
        print_report(&report);
    }

    Ok(exit_code(&report))
}

/// Batch mode: every `*.snapshot.json` under the directory, one summary line
/// each.
fn run_batch(dir: &Path, options: &CheckOptions) -> Result<ExitCode> {
    let mut snapshots: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(".snapshot.json"))
        })
        .map(|entry| entry.into_path())
        .collect();
    snapshots.sort();

    if snapshots.is_empty() {
        println!("No *.snapshot.json files found under {}", dir.display());
        return Ok(ExitCode::SUCCESS);
    }

    let mut failures = 0usize;
    for path in &snapshots {
        let report = check_one(path, options)?;
        let status = match report.overall_status {
            OverallStatus::Pass => "PASS".green(),
            OverallStatus::PassWithFixes => "PASS_WITH_FIXES".green(),
            OverallStatus::NeedsReview => "NEEDS_REVIEW".yellow(),
            OverallStatus::Fail => {
                failures += 1;
                "FAIL".red()
            }
        };
        println!("{:<16} {}", status, path.display());
    }

    println!();
    println!("{} checked, {} failed", snapshots.len(), failures);
    Ok(if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Runs the full pipeline for one snapshot and writes the report sidecar.
fn check_one(snapshot_path: &Path, options: &CheckOptions) -> Result<QaReport> {
    let policy = load_policy(options)?;

    let mut snapshot = SceneSnapshot::load_json(snapshot_path)
        .with_context(|| format!("failed to load snapshot {}", snapshot_path.display()))?;

    let intake_config = IntakeConfig {
        source: options.source.clone(),
        submitter: options.submitter.clone(),
        category: options.category.clone(),
        ..IntakeConfig::default()
    };

    let (metadata, intake_stage) = match &options.asset {
        Some(asset_path) => {
            let outcome = run_intake(asset_path, &intake_config);
            (outcome.metadata, Some(outcome.stage))
        }
        None => (make_metadata(&intake_config), None),
    };

    let report = run_qa(metadata, intake_stage, &mut snapshot, &policy);

    let output_dir = options
        .output_dir
        .clone()
        .or_else(|| snapshot_path.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    let sidecar = output_dir.join(QaReport::filename(&report.metadata.asset_id));
    report
        .write_json(&sidecar)
        .with_context(|| format!("failed to write report {}", sidecar.display()))?;

    Ok(report)
}

fn load_policy(options: &CheckOptions) -> Result<QaPolicy> {
    match &options.policy {
        Some(path) => {
            let mut policy = QaPolicy::load_json(path)
                .with_context(|| format!("failed to load policy {}", path.display()))?;
            // The command-line category wins over whatever the file says.
            policy.geometry.category = options.category.clone();
            policy.armature.category = options.category.clone();
            Ok(policy)
        }
        None => Ok(QaPolicy::for_category(&options.category)),
    }
}

fn exit_code(report: &QaReport) -> ExitCode {
    if report.overall_status == OverallStatus::Fail {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
