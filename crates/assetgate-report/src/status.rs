//! Status vocabularies for checks, stages, reports, and review flags.
//!
//! The per-check and per-stage status spaces are deliberately distinct:
//! a check may be WARNING (informational, never blocking) while a stage is
//! only ever PASS, FAIL, or SKIPPED.

use serde::{Deserialize, Serialize};

/// Outcome of a single check within a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    /// The check ran and the measured value is acceptable.
    Pass,
    /// The check ran and found a blocking violation.
    Fail,
    /// The check ran and found a non-blocking issue worth reviewing.
    Warning,
    /// The check did not apply (missing optional data or disabled policy).
    Skipped,
}

/// Outcome of a whole pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    /// No contained check failed.
    Pass,
    /// At least one contained check failed.
    Fail,
    /// The stage exited early without running its checks.
    Skipped,
}

/// Overall verdict for a complete QA report.
///
/// Precedence is fixed: FAIL outranks NEEDS_REVIEW, which outranks
/// PASS_WITH_FIXES, which outranks PASS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    /// Every stage passed or was skipped; nothing was fixed or flagged.
    Pass,
    /// No failures or flags, but at least one automatic fix was applied.
    PassWithFixes,
    /// No failures, but at least one issue needs human judgment.
    NeedsReview,
    /// At least one stage failed.
    Fail,
}

/// Severity of a human-review flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Context for the reviewer, no action implied.
    Info,
    /// Likely a problem, worth a look.
    Warning,
    /// Definitely wrong, must be resolved before acceptance.
    Error,
}
