//! Human-readable report printing.

use assetgate_report::{CheckStatus, OverallStatus, QaReport, StageStatus};
use colored::Colorize;

fn check_status_label(status: CheckStatus) -> colored::ColoredString {
    match status {
        CheckStatus::Pass => "PASS".green(),
        CheckStatus::Fail => "FAIL".red().bold(),
        CheckStatus::Warning => "WARN".yellow(),
        CheckStatus::Skipped => "SKIP".dimmed(),
    }
}

fn stage_status_label(status: StageStatus) -> colored::ColoredString {
    match status {
        StageStatus::Pass => "PASS".green().bold(),
        StageStatus::Fail => "FAIL".red().bold(),
        StageStatus::Skipped => "SKIPPED".dimmed(),
    }
}

fn overall_label(status: OverallStatus) -> colored::ColoredString {
    match status {
        OverallStatus::Pass => "PASS".green().bold(),
        OverallStatus::PassWithFixes => "PASS_WITH_FIXES".green(),
        OverallStatus::NeedsReview => "NEEDS_REVIEW".yellow().bold(),
        OverallStatus::Fail => "FAIL".red().bold(),
    }
}

/// Prints a report summary: one line per stage, details for everything that
/// is not a plain PASS, fixes, flags, and the performance block.
pub fn print_report(report: &QaReport) {
    println!(
        "{} {} ({})",
        "Asset:".cyan().bold(),
        report.metadata.asset_id,
        report.metadata.category
    );
    println!(
        "{} {} submitted {} by {}",
        "Source:".dimmed(),
        report.metadata.source,
        report.metadata.submission_date,
        report.metadata.submitter
    );
    println!();

    for stage in &report.stages {
        println!("  {:<12} {}", stage.name, stage_status_label(stage.status));
        for check in &stage.checks {
            if check.status != CheckStatus::Pass {
                println!(
                    "    {} [{}] {}",
                    check_status_label(check.status),
                    check.name,
                    check.message
                );
            }
        }
        for fix in &stage.fixes {
            println!(
                "    {} {:?} on {}",
                "fixed".cyan(),
                fix.action,
                fix.target
            );
        }
        for flag in &stage.review_flags {
            println!(
                "    {} [{}] {}",
                "review".magenta(),
                flag.issue,
                flag.description
            );
        }
    }

    if let Some(perf) = &report.performance {
        println!();
        println!("{}", "Performance:".cyan().bold());
        println!("  triangles   {}", perf.triangle_count);
        println!("  draw calls  {}", perf.draw_call_estimate);
        println!("  VRAM (MB)   {:.2}", perf.vram_estimate_mb);
        println!("  bones       {}", perf.bone_count);
    }

    println!();
    println!(
        "{} {}",
        "Overall:".cyan().bold(),
        overall_label(report.overall_status)
    );
}
