//! Auto-remediation.
//!
//! Pure decision logic over the finalized Stage-1 results: four deterministic
//! fix actions, each triggered by specific upstream check failures, plus a
//! fixed rule table that promotes non-automatable issues to review flags.
//! Every applied fix is logged as a `FixEntry` with before/after values. The
//! remediation stage itself always reports PASS - it either fixes or flags,
//! never fails the pipeline.

use assetgate_report::{
    CheckResult, CheckStatus, FixAction, FixEntry, Measured, ReviewFlag, Severity, StageResult,
};
use serde::{Deserialize, Serialize};

/// Configuration for the remediation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemediationConfig {
    /// Threshold for merge-by-distance.
    pub merge_distance: f64,
    /// Hard limit for skinning influences per vertex.
    pub max_bone_influences: usize,
    /// Maximum texture dimension for standard assets.
    pub max_texture_resolution: u32,
    /// Hero assets resize against 4096 instead of the standard limit.
    pub hero_asset: bool,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            merge_distance: 0.0001,
            max_bone_influences: 4,
            max_texture_resolution: 2048,
            hero_asset: false,
        }
    }
}

/// Texture resolution ceiling applied to hero assets.
const HERO_RESOLUTION_LIMIT: u32 = 4096;

/// A mesh object that can have geometry fixes applied to it.
pub trait FixableMesh {
    fn name(&self) -> &str;

    /// Current vertex count.
    fn vertex_count(&self) -> usize;

    /// Recalculates face normals to a consistent outward winding.
    fn recalculate_normals(&mut self);

    /// Merges vertices closer than `threshold`; returns the vertex count
    /// after the merge.
    fn merge_by_distance(&mut self, threshold: f64) -> usize;
}

/// An image that can be resized in place.
pub trait FixableImage {
    fn name(&self) -> &str;

    /// Current (width, height) in pixels.
    fn size(&self) -> (u32, u32);

    /// Resizes the image in place.
    fn scale(&mut self, width: u32, height: u32);
}

/// A skinned mesh whose influence counts can be inspected.
pub trait FixableSkinnedMesh {
    fn name(&self) -> &str;

    /// Maximum non-zero influence count on any vertex.
    fn max_influences(&self) -> usize;
}

/// Mutable access to the scene for remediation.
///
/// Fixes must be applied sequentially per object; the engine only decides
/// what to do and records the audit trail.
pub trait RemediationContext {
    fn mesh_objects(&mut self) -> Vec<&mut dyn FixableMesh>;
    fn images(&mut self) -> Vec<&mut dyn FixableImage>;
    fn skinned_meshes(&self) -> Vec<&dyn FixableSkinnedMesh>;

    /// Clamps influences to `limit` and renormalizes weights on every
    /// skinned mesh in the scene.
    fn limit_bone_weights(&mut self, limit: usize);
}

/// Review-flag rule table: (stage, check, trigger status, severity,
/// description). Evaluated in order; matches append flags without touching
/// the scene.
const REVIEW_RULES: &[(&str, &str, CheckStatus, Severity, &str)] = &[
    (
        "uv",
        "uv_overlap",
        CheckStatus::Fail,
        Severity::Warning,
        "UV islands overlap; may be intentional (mirroring/tiling)",
    ),
    (
        "pbr",
        "albedo_range",
        CheckStatus::Warning,
        Severity::Warning,
        "Albedo values outside PBR range; may be stylistic",
    ),
    (
        "pbr",
        "metalness_binary",
        CheckStatus::Warning,
        Severity::Warning,
        "Metalness gradient detected; verify intent",
    ),
    (
        "pbr",
        "roughness_range",
        CheckStatus::Warning,
        Severity::Warning,
        "Extreme roughness values; verify intent",
    ),
    (
        "geometry",
        "non_manifold",
        CheckStatus::Fail,
        Severity::Error,
        "Non-manifold geometry; requires manual retopology",
    ),
    (
        "geometry",
        "interior_faces",
        CheckStatus::Fail,
        Severity::Error,
        "Interior faces; requires manual removal",
    ),
    (
        "uv",
        "texel_density",
        CheckStatus::Warning,
        Severity::Warning,
        "Texel density outliers; requires artistic judgment",
    ),
    (
        "scene",
        "lod_presence",
        CheckStatus::Fail,
        Severity::Warning,
        "LODs missing; requires artist to create",
    ),
];

/// Finds a check by stage and name in the Stage-1 results.
fn find_check<'a>(
    stage1_results: &'a [StageResult],
    stage_name: &str,
    check_name: &str,
) -> Option<&'a CheckResult> {
    stage1_results
        .iter()
        .find(|s| s.name == stage_name)
        .and_then(|s| s.check(check_name))
}

fn check_failed(stage1_results: &[StageResult], stage_name: &str, check_name: &str) -> bool {
    find_check(stage1_results, stage_name, check_name)
        .map(|c| c.status == CheckStatus::Fail)
        .unwrap_or(false)
}

/// Largest power of two that is <= n (minimum 1).
fn largest_pot(n: u32) -> u32 {
    if n == 0 {
        return 1;
    }
    let mut pot = 1u32;
    while pot * 2 <= n {
        pot *= 2;
    }
    pot
}

/// Computes the resized (width, height), preserving aspect ratio.
///
/// The largest dimension scales to the largest power of two <= limit; the
/// other scales proportionally and then rounds down to its own power of two.
fn compute_new_size(w: u32, h: u32, limit: u32) -> (u32, u32) {
    let max_dim = w.max(h);
    let target = largest_pot(limit);
    let scale = target as f64 / max_dim as f64;
    (
        largest_pot((w as f64 * scale) as u32),
        largest_pot((h as f64 * scale) as u32),
    )
}

fn collect_review_flags(stage1_results: &[StageResult]) -> Vec<ReviewFlag> {
    let mut flags = Vec::new();

    for &(stage_name, check_name, trigger_status, severity, description) in REVIEW_RULES {
        if let Some(check) = find_check(stage1_results, stage_name, check_name) {
            if check.status == trigger_status {
                flags.push(ReviewFlag::new(
                    format!("{}:{}", stage_name, check_name),
                    severity,
                    description,
                ));
            }
        }
    }

    // Polycount violations always escalate; there is no safe automatic
    // decimation or subdivision.
    if check_failed(stage1_results, "geometry", "polycount_budget") {
        flags.push(ReviewFlag::new(
            "geometry:polycount_budget",
            Severity::Error,
            "Polycount violation; requires manual retopology or LOD",
        ));
    }

    flags
}

/// Applies the auto-fix actions and populates the human review queue.
///
/// Each fix fires only when its triggering Stage-1 check returned FAIL.
pub fn run_remediation(
    context: &mut dyn RemediationContext,
    stage1_results: &[StageResult],
    config: &RemediationConfig,
) -> StageResult {
    let mut fixes: Vec<FixEntry> = Vec::new();

    // Fix 1: recalculate normals (trigger: geometry:normal_consistency FAIL).
    if let Some(check) = find_check(stage1_results, "geometry", "normal_consistency") {
        if check.status == CheckStatus::Fail {
            let before = check.measured_value.clone();
            for obj in context.mesh_objects() {
                obj.recalculate_normals();
                fixes.push(FixEntry::new(
                    FixAction::RecalculateNormals,
                    obj.name().to_string(),
                    before.clone(),
                    0,
                ));
            }
        }
    }

    // Fix 2: merge by distance (trigger: geometry:degenerate_faces FAIL or
    // geometry:loose_geometry FAIL).
    let needs_merge = check_failed(stage1_results, "geometry", "degenerate_faces")
        || check_failed(stage1_results, "geometry", "loose_geometry");
    if needs_merge {
        for obj in context.mesh_objects() {
            let before_verts = obj.vertex_count();
            let after_verts = obj.merge_by_distance(config.merge_distance);
            fixes.push(FixEntry::new(
                FixAction::MergeByDistance,
                obj.name().to_string(),
                before_verts,
                after_verts,
            ));
        }
    }

    // Fix 3: resize textures (trigger: texture:resolution_limit FAIL).
    if check_failed(stage1_results, "texture", "resolution_limit") {
        let limit = if config.hero_asset {
            HERO_RESOLUTION_LIMIT
        } else {
            config.max_texture_resolution
        };
        for img in context.images() {
            let (w, h) = img.size();
            if w > limit || h > limit {
                let (new_w, new_h) = compute_new_size(w, h, limit);
                img.scale(new_w, new_h);
                fixes.push(FixEntry::new(
                    FixAction::ResizeTextures,
                    img.name().to_string(),
                    Measured::list([w, h]),
                    Measured::list([new_w, new_h]),
                ));
            }
        }
    }

    // Fix 4: limit bone weights (trigger: armature:vertex_weights FAIL).
    if check_failed(stage1_results, "armature", "vertex_weights") {
        let before_max = context
            .skinned_meshes()
            .iter()
            .map(|m| m.max_influences())
            .max()
            .unwrap_or(0);
        context.limit_bone_weights(config.max_bone_influences);
        fixes.push(FixEntry::new(
            FixAction::LimitBoneWeights,
            "scene",
            before_max,
            config.max_bone_influences,
        ));
    }

    let review_flags = collect_review_flags(stage1_results);

    StageResult::remediation(fixes, review_flags)
}
