//! Intake command: filesystem-level validation without opening the scene.

use anyhow::Result;
use assetgate_report::StageStatus;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use crate::intake::{run_intake, IntakeConfig};

/// Runs the intake command.
pub fn run(
    asset_path: &Path,
    source: &str,
    submitter: &str,
    category: &str,
    max_mb: u64,
    hard_max_mb: u64,
    json: bool,
) -> Result<ExitCode> {
    let config = IntakeConfig {
        source: source.to_string(),
        submitter: submitter.to_string(),
        category: category.to_string(),
        max_size_bytes: [("*".to_string(), max_mb * 1024 * 1024)].into(),
        hard_max_bytes: hard_max_mb * 1024 * 1024,
    };

    let outcome = run_intake(asset_path, &config);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.stage)?);
    } else {
        println!(
            "{} {} as {}",
            "Intake:".cyan().bold(),
            asset_path.display(),
            outcome.metadata.asset_id
        );
        for check in &outcome.stage.checks {
            let label = match check.status {
                assetgate_report::CheckStatus::Pass => "ok".green(),
                assetgate_report::CheckStatus::Fail => "fail".red().bold(),
                assetgate_report::CheckStatus::Warning => "warn".yellow(),
                assetgate_report::CheckStatus::Skipped => "skip".dimmed(),
            };
            println!("  {} [{}] {}", label, check.name, check.message);
        }
    }

    Ok(if outcome.stage.status == StageStatus::Fail {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
