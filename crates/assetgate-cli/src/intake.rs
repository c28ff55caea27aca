//! Intake and triage.
//!
//! Filesystem-level validation that runs before any scene extraction: format
//! allowlist, existence, size limits, and a content digest for the audit
//! trail. Later checks are skipped once a FAIL is recorded, since nothing
//! downstream could run anyway.

use assetgate_report::{AssetMetadata, CheckResult, CheckStatus, Measured, StageResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// File extensions accepted into the pipeline.
pub const ACCEPTED_EXTENSIONS: [&str; 4] = ["fbx", "gltf", "glb", "obj"];

/// Configuration for intake validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Where the asset came from.
    pub source: String,
    /// Who submitted it.
    pub submitter: String,
    /// Asset category.
    pub category: String,
    /// Per-category size limit in bytes; the `"*"` key is the default.
    pub max_size_bytes: BTreeMap<String, u64>,
    /// Absolute reject threshold regardless of category.
    pub hard_max_bytes: u64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            source: "unknown".to_string(),
            submitter: "unknown".to_string(),
            category: "env_prop".to_string(),
            max_size_bytes: BTreeMap::from([("*".to_string(), 500 * 1024 * 1024)]),
            hard_max_bytes: 1024 * 1024 * 1024,
        }
    }
}

/// Intake stage result plus the metadata minted for this submission.
#[derive(Debug, Clone)]
pub struct IntakeOutcome {
    /// Freshly generated metadata for this run.
    pub metadata: AssetMetadata,
    /// The intake stage result.
    pub stage: StageResult,
}

/// Generates a fresh asset ID. Two runs over the same file get different IDs.
pub fn new_asset_id() -> String {
    format!("asset-{:032x}", rand::random::<u128>())
}

/// Mints metadata for one submission.
pub fn make_metadata(config: &IntakeConfig) -> AssetMetadata {
    let now = Utc::now();
    AssetMetadata {
        asset_id: new_asset_id(),
        source: config.source.clone(),
        category: config.category.clone(),
        submission_date: now.date_naive().to_string(),
        processing_timestamp: now.to_rfc3339(),
        submitter: config.submitter.clone(),
    }
}

/// Runs intake validation for one submitted file.
pub fn run_intake(asset_path: &Path, config: &IntakeConfig) -> IntakeOutcome {
    let metadata = make_metadata(config);
    let mut checks: Vec<CheckResult> = Vec::new();

    let accepted: Vec<Measured> = ACCEPTED_EXTENSIONS
        .iter()
        .map(|e| Measured::Text(format!(".{e}")))
        .collect();
    let ext = asset_path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    if !ACCEPTED_EXTENSIONS.contains(&ext.as_str()) {
        checks.push(CheckResult::new(
            "format",
            CheckStatus::Fail,
            if ext.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{ext}")
            },
            Measured::List(accepted),
            format!(
                "Unsupported format '.{}'. Accepted: .fbx, .gltf, .glb, .obj",
                ext
            ),
        ));
        return finish(metadata, checks);
    }
    checks.push(CheckResult::new(
        "format",
        CheckStatus::Pass,
        format!(".{ext}"),
        Measured::List(accepted),
        "Format accepted",
    ));

    if !asset_path.exists() {
        checks.push(CheckResult::new(
            "file_exists",
            CheckStatus::Fail,
            asset_path.display().to_string(),
            Measured::Null,
            format!("File not found: {}", asset_path.display()),
        ));
        return finish(metadata, checks);
    }
    checks.push(CheckResult::new(
        "file_exists",
        CheckStatus::Pass,
        asset_path.display().to_string(),
        Measured::Null,
        "File found",
    ));

    let file_size = std::fs::metadata(asset_path).map(|m| m.len()).unwrap_or(0);
    let category_limit = config
        .max_size_bytes
        .get(&config.category)
        .or_else(|| config.max_size_bytes.get("*"))
        .copied();

    if file_size > config.hard_max_bytes {
        checks.push(CheckResult::new(
            "file_size",
            CheckStatus::Fail,
            file_size,
            config.hard_max_bytes,
            format!(
                "File size {} B exceeds hard limit {} B",
                file_size, config.hard_max_bytes
            ),
        ));
        return finish(metadata, checks);
    }

    match category_limit {
        Some(limit) if file_size > limit => {
            checks.push(CheckResult::new(
                "file_size",
                CheckStatus::Warning,
                file_size,
                limit,
                format!(
                    "File size {} B exceeds category limit {} B for '{}'",
                    file_size, limit, config.category
                ),
            ));
        }
        _ => {
            checks.push(CheckResult::new(
                "file_size",
                CheckStatus::Pass,
                file_size,
                category_limit.unwrap_or(config.hard_max_bytes),
                "File size within limits",
            ));
        }
    }

    checks.push(digest_check(asset_path));

    finish(metadata, checks)
}

/// Records the BLAKE3 digest of the submitted file for the audit trail.
fn digest_check(asset_path: &Path) -> CheckResult {
    match std::fs::read(asset_path) {
        Ok(bytes) => {
            let digest = blake3::hash(&bytes).to_hex().to_string();
            CheckResult::new(
                "content_digest",
                CheckStatus::Pass,
                digest,
                Measured::Null,
                "Content digest recorded",
            )
        }
        Err(e) => CheckResult::new(
            "content_digest",
            CheckStatus::Fail,
            asset_path.display().to_string(),
            Measured::Null,
            format!("Could not read file for digest: {e}"),
        ),
    }
}

fn finish(metadata: AssetMetadata, checks: Vec<CheckResult>) -> IntakeOutcome {
    IntakeOutcome {
        metadata,
        stage: StageResult::from_checks("intake", checks),
    }
}

/// Metadata with fixed provenance fields, for tests.
#[cfg(test)]
pub fn test_metadata(category: &str) -> AssetMetadata {
    AssetMetadata {
        asset_id: new_asset_id(),
        source: "test".to_string(),
        category: category.to_string(),
        submission_date: "2024-03-11".to_string(),
        processing_timestamp: "2024-03-11T14:02:55Z".to_string(),
        submitter: "artist01".to_string(),
    }
}
