//! Report entity types and the report builder.
//!
//! A pipeline run produces one [`QaReport`]: asset metadata, an ordered list
//! of [`StageResult`]s, optional performance estimates, and the overall
//! verdict computed by [`ReportBuilder::finalize`]. Entities are created once
//! per run and only ever extended by explicit append; nothing is shared
//! across runs.

use crate::error::ReportError;
use crate::measured::Measured;
use crate::status::{CheckStatus, OverallStatus, Severity, StageStatus};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result of a single check. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Check name, unique within its stage (e.g. `"polycount_budget"`).
    pub name: String,
    /// Outcome of the check.
    pub status: CheckStatus,
    /// What was measured; shape is check-specific.
    pub measured_value: Measured,
    /// The limit the measurement was compared against, or `Null`.
    pub threshold: Measured,
    /// Human-readable summary.
    pub message: String,
}

impl CheckResult {
    /// Creates a new check result.
    pub fn new(
        name: impl Into<String>,
        status: CheckStatus,
        measured_value: impl Into<Measured>,
        threshold: impl Into<Measured>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status,
            measured_value: measured_value.into(),
            threshold: threshold.into(),
            message: message.into(),
        }
    }
}

/// The fixed vocabulary of automatic fix actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixAction {
    /// Recalculate face normals to a consistent outward winding.
    RecalculateNormals,
    /// Merge vertices closer than the configured distance.
    MergeByDistance,
    /// Resize over-limit images to the nearest power of two within limits.
    ResizeTextures,
    /// Clamp per-vertex bone influences and renormalize weights.
    LimitBoneWeights,
}

/// Audit record for one applied fix. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixEntry {
    /// Which fix was applied.
    pub action: FixAction,
    /// Object or image name the fix targeted, or `"scene"`.
    pub target: String,
    /// State before the fix (action-specific shape).
    pub before_value: Measured,
    /// State after the fix.
    pub after_value: Measured,
}

impl FixEntry {
    /// Creates a new fix entry.
    pub fn new(
        action: FixAction,
        target: impl Into<String>,
        before_value: impl Into<Measured>,
        after_value: impl Into<Measured>,
    ) -> Self {
        Self {
            action,
            target: target.into(),
            before_value: before_value.into(),
            after_value: after_value.into(),
        }
    }
}

/// A non-automatable issue routed to human review.
///
/// Carries no remediation obligation; its presence alone routes the asset to
/// the review queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewFlag {
    /// `"{stage}:{check}"` key identifying the triggering check.
    pub issue: String,
    /// How serious the reviewer should treat the issue.
    pub severity: Severity,
    /// What to look at and why it could not be auto-fixed.
    pub description: String,
}

impl ReviewFlag {
    /// Creates a new review flag.
    pub fn new(
        issue: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
    ) -> Self {
        Self {
            issue: issue.into(),
            severity,
            description: description.into(),
        }
    }
}

/// Result of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    /// Stage name (e.g. `"geometry"`, `"remediation"`).
    pub name: String,
    /// Stage outcome.
    pub status: StageStatus,
    /// Ordered check results.
    pub checks: Vec<CheckResult>,
    /// Applied fixes (populated by the remediation stage only).
    #[serde(default)]
    pub fixes: Vec<FixEntry>,
    /// Human-review flags (populated by the remediation stage only).
    #[serde(default)]
    pub review_flags: Vec<ReviewFlag>,
}

impl StageResult {
    /// Builds a stage result from its checks, deriving the stage status.
    ///
    /// The stage is FAIL iff at least one check is FAIL; WARNING and SKIPPED
    /// checks never fail a stage.
    pub fn from_checks(name: impl Into<String>, checks: Vec<CheckResult>) -> Self {
        let status = if checks.iter().any(|c| c.status == CheckStatus::Fail) {
            StageStatus::Fail
        } else {
            StageStatus::Pass
        };
        Self {
            name: name.into(),
            status,
            checks,
            fixes: Vec::new(),
            review_flags: Vec::new(),
        }
    }

    /// Builds a globally skipped stage carrying a single explanatory check.
    pub fn skipped(name: impl Into<String>, check: CheckResult) -> Self {
        Self {
            name: name.into(),
            status: StageStatus::Skipped,
            checks: vec![check],
            fixes: Vec::new(),
            review_flags: Vec::new(),
        }
    }

    /// Builds the remediation stage result.
    ///
    /// Remediation never fails the pipeline; it either fixes or flags.
    pub fn remediation(fixes: Vec<FixEntry>, review_flags: Vec<ReviewFlag>) -> Self {
        Self {
            name: "remediation".to_string(),
            status: StageStatus::Pass,
            checks: Vec::new(),
            fixes,
            review_flags,
        }
    }

    /// Looks up a check by name.
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

/// Derived performance metrics for the whole asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceEstimates {
    /// Total triangles across all mesh objects.
    pub triangle_count: u64,
    /// Sum of material slot counts (one draw call per slot).
    pub draw_call_estimate: u64,
    /// Estimated texture VRAM in megabytes, including mip chains.
    pub vram_estimate_mb: f64,
    /// Total bones across all armatures.
    pub bone_count: u64,
}

/// Identity and provenance of one asset submission.
///
/// `asset_id` is freshly generated per run; two runs over the same file must
/// yield different IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    /// Unique per-submission identifier.
    pub asset_id: String,
    /// Where the asset came from (drop folder, DCC bridge, ...).
    pub source: String,
    /// Asset category (e.g. `"env_prop"`, `"character"`).
    pub category: String,
    /// ISO date the asset was submitted.
    pub submission_date: String,
    /// RFC 3339 timestamp of this pipeline run.
    pub processing_timestamp: String,
    /// Who submitted the asset.
    pub submitter: String,
}

/// Descriptor recorded by the external export layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportInfo {
    /// Export file format (e.g. `"fbx"`, `"glb"`).
    pub format: String,
    /// Path the export was written to.
    pub path: String,
    /// Axis convention of the exported file (e.g. `"Y-up"`).
    pub axis_convention: String,
    /// Uniform scale applied on export.
    pub scale: f64,
}

/// Complete QA report for one asset submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaReport {
    /// Asset identity and provenance.
    pub metadata: AssetMetadata,
    /// Overall verdict across all stages.
    pub overall_status: OverallStatus,
    /// Ordered stage results.
    pub stages: Vec<StageResult>,
    /// Derived performance metrics, if the scene stage ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceEstimates>,
    /// Export descriptor, if the external export layer ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportInfo>,
}

impl QaReport {
    /// Generates the standard sidecar filename for a given asset ID.
    ///
    /// ```
    /// use assetgate_report::QaReport;
    /// assert_eq!(QaReport::filename("asset-ab12"), "asset-ab12.qa.json");
    /// ```
    pub fn filename(asset_id: &str) -> String {
        format!("{}.qa.json", asset_id)
    }

    /// Looks up a stage by name.
    pub fn stage(&self, name: &str) -> Option<&StageResult> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Serializes the report to JSON.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serializes the report to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a report from JSON.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the report as pretty-printed JSON to `path`.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json_pretty()?;
        std::fs::write(path, json).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads a report from a JSON sidecar at `path`.
    pub fn load_json(path: &Path) -> Result<Self, ReportError> {
        let json = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Accumulates stage results and computes the overall verdict.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    metadata: AssetMetadata,
    stages: Vec<StageResult>,
    performance: Option<PerformanceEstimates>,
    export: Option<ExportInfo>,
}

impl ReportBuilder {
    /// Creates a builder for one asset submission.
    pub fn new(metadata: AssetMetadata) -> Self {
        Self {
            metadata,
            stages: Vec::new(),
            performance: None,
            export: None,
        }
    }

    /// Appends a finalized stage result.
    pub fn add_stage(&mut self, stage: StageResult) {
        self.stages.push(stage);
    }

    /// Records the performance estimates.
    pub fn set_performance(&mut self, performance: PerformanceEstimates) {
        self.performance = Some(performance);
    }

    /// Records the export descriptor.
    pub fn set_export(&mut self, export: ExportInfo) {
        self.export = Some(export);
    }

    /// Computes the overall verdict and produces the report.
    pub fn finalize(self) -> QaReport {
        let overall_status = self.compute_status();
        QaReport {
            metadata: self.metadata,
            overall_status,
            stages: self.stages,
            performance: self.performance,
            export: self.export,
        }
    }

    /// Aggregation precedence: FAIL, then NEEDS_REVIEW, then PASS_WITH_FIXES,
    /// then PASS. Evaluated over all stages, remediation included.
    fn compute_status(&self) -> OverallStatus {
        if self.stages.iter().any(|s| s.status == StageStatus::Fail) {
            return OverallStatus::Fail;
        }
        if self.stages.iter().any(|s| !s.review_flags.is_empty()) {
            return OverallStatus::NeedsReview;
        }
        if self.stages.iter().any(|s| !s.fixes.is_empty()) {
            return OverallStatus::PassWithFixes;
        }
        OverallStatus::Pass
    }
}
