//! Armature and rig checks.
//!
//! Validates bone budgets, naming conventions, vertex weight validity, and
//! hierarchy integrity. Assets without an armature skip the whole stage
//! cleanly when their category does not require one; categories that do
//! require an armature get a FAIL on `armature_present` instead.
//!
//! `vertex_weights()` contract: one entry per vertex, holding that vertex's
//! *non-zero* weights. An empty list means the vertex has no group
//! assignments at all.

use assetgate_report::{CheckResult, CheckStatus, Measured, StageResult};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Vertices whose summed weight is below this are zero-weight.
const ZERO_WEIGHT_EPS: f32 = 1e-6;

/// Allowed deviation of a weight sum from 1.0.
const NORMALIZATION_TOLERANCE: f32 = 0.001;

/// Configuration for armature checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmatureConfig {
    /// Total bone budget across all armatures in the scene.
    pub max_bones: u64,
    /// Maximum non-zero weights per vertex.
    pub max_influences_per_vertex: usize,
    /// Regex every bone name must match; `None` disables the naming check.
    pub bone_naming_pattern: Option<String>,
    /// Categories for which a missing armature is an error.
    pub categories_requiring_armature: Vec<String>,
    /// Category of the asset being checked.
    pub category: String,
}

impl Default for ArmatureConfig {
    fn default() -> Self {
        Self {
            max_bones: 75,
            max_influences_per_vertex: 4,
            bone_naming_pattern: None,
            categories_requiring_armature: vec!["character".to_string()],
            category: "env_prop".to_string(),
        }
    }
}

/// A single bone inside an armature. A bone is a root iff it has no parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bone {
    /// Bone name.
    pub name: String,
    /// Parent bone name, or `None` for a root bone.
    pub parent: Option<String>,
}

/// An armature object in the scene.
pub trait ArmatureObject {
    fn name(&self) -> &str;
    fn bones(&self) -> Vec<Bone>;
}

/// A mesh object with skinning data.
pub trait SkinnedMesh {
    fn name(&self) -> &str;

    /// One entry per vertex: the list of its non-zero weights.
    fn vertex_weights(&self) -> Vec<Vec<f32>>;
}

/// Access to armature and skinned-mesh data.
pub trait ArmatureContext {
    fn armature_objects(&self) -> Vec<&dyn ArmatureObject>;
    fn skinned_meshes(&self) -> Vec<&dyn SkinnedMesh>;
}

fn check_armature_present(
    armatures: &[&dyn ArmatureObject],
    config: &ArmatureConfig,
) -> CheckResult {
    let present = !armatures.is_empty();
    let required = config
        .categories_requiring_armature
        .contains(&config.category);

    if !present && required {
        return CheckResult::new(
            "armature_present",
            CheckStatus::Fail,
            0,
            1,
            format!(
                "Category '{}' requires an armature but none found",
                config.category
            ),
        );
    }

    CheckResult::new(
        "armature_present",
        CheckStatus::Pass,
        armatures.len(),
        1,
        if present {
            format!("{} armature(s) found", armatures.len())
        } else {
            format!(
                "No armature (not required for category '{}')",
                config.category
            )
        },
    )
}

fn check_bone_count(armatures: &[&dyn ArmatureObject], config: &ArmatureConfig) -> CheckResult {
    let total: u64 = armatures.iter().map(|a| a.bones().len() as u64).sum();

    if total > config.max_bones {
        CheckResult::new(
            "bone_count",
            CheckStatus::Fail,
            total,
            config.max_bones,
            format!(
                "Total bone count {} exceeds limit {}",
                total, config.max_bones
            ),
        )
    } else {
        CheckResult::new(
            "bone_count",
            CheckStatus::Pass,
            total,
            config.max_bones,
            format!(
                "Total bone count {} within limit {}",
                total, config.max_bones
            ),
        )
    }
}

fn check_bone_naming(armatures: &[&dyn ArmatureObject], config: &ArmatureConfig) -> CheckResult {
    let Some(pattern_str) = &config.bone_naming_pattern else {
        return CheckResult::new(
            "bone_naming",
            CheckStatus::Skipped,
            Measured::map([
                ("violations", Measured::List(Vec::new())),
                ("count", Measured::Int(0)),
            ]),
            Measured::Null,
            "Bone naming check skipped (no pattern configured)",
        );
    };

    let Ok(pattern) = Regex::new(pattern_str) else {
        return CheckResult::new(
            "bone_naming",
            CheckStatus::Skipped,
            Measured::map([
                ("violations", Measured::List(Vec::new())),
                ("count", Measured::Int(0)),
            ]),
            Measured::Text(pattern_str.clone()),
            format!("Bone naming check skipped (invalid pattern '{pattern_str}')"),
        );
    };

    let violations: Vec<String> = armatures
        .iter()
        .flat_map(|a| a.bones())
        .filter(|b| !pattern.is_match(&b.name))
        .map(|b| b.name)
        .collect();

    let count = violations.len();
    CheckResult::new(
        "bone_naming",
        if count > 0 { CheckStatus::Fail } else { CheckStatus::Pass },
        Measured::map([
            ("violations", Measured::from(violations)),
            ("count", Measured::Int(count as i64)),
        ]),
        Measured::Text(pattern_str.clone()),
        if count > 0 {
            format!(
                "{} bone name(s) do not match pattern '{}'",
                count, pattern_str
            )
        } else {
            format!("All bone names match pattern '{}'", pattern_str)
        },
    )
}

/// Classifies every vertex once: zero-weight wins over all other categories;
/// otherwise a vertex can be both over-influenced and unnormalized.
fn check_vertex_weights(meshes: &[&dyn SkinnedMesh], config: &ArmatureConfig) -> CheckResult {
    let mut zero_weight_count = 0usize;
    let mut excess_influences_count = 0usize;
    let mut unnormalized_count = 0usize;

    for mesh in meshes {
        for weights in mesh.vertex_weights() {
            let total: f32 = weights.iter().sum();
            if total < ZERO_WEIGHT_EPS {
                zero_weight_count += 1;
            } else {
                if weights.len() > config.max_influences_per_vertex {
                    excess_influences_count += 1;
                }
                if (total - 1.0).abs() > NORMALIZATION_TOLERANCE {
                    unnormalized_count += 1;
                }
            }
        }
    }

    let measured = Measured::map([
        ("zero_weight_count", Measured::Int(zero_weight_count as i64)),
        (
            "excess_influences_count",
            Measured::Int(excess_influences_count as i64),
        ),
        ("unnormalized_count", Measured::Int(unnormalized_count as i64)),
    ]);

    let has_violation =
        zero_weight_count > 0 || excess_influences_count > 0 || unnormalized_count > 0;

    if has_violation {
        let mut parts = Vec::new();
        if zero_weight_count > 0 {
            parts.push(format!("{} zero-weight vertex(ices)", zero_weight_count));
        }
        if excess_influences_count > 0 {
            parts.push(format!(
                "{} vertex(ices) with >{} influences",
                excess_influences_count, config.max_influences_per_vertex
            ));
        }
        if unnormalized_count > 0 {
            parts.push(format!("{} unnormalized vertex(ices)", unnormalized_count));
        }
        return CheckResult::new(
            "vertex_weights",
            CheckStatus::Fail,
            measured,
            config.max_influences_per_vertex,
            parts.join("; "),
        );
    }

    CheckResult::new(
        "vertex_weights",
        CheckStatus::Pass,
        measured,
        config.max_influences_per_vertex,
        "All vertex weights valid",
    )
}

/// Each armature should have exactly one root bone; an armature with `R`
/// roots contributes `max(R - 1, 0)` orphans.
fn check_bone_hierarchy(armatures: &[&dyn ArmatureObject]) -> CheckResult {
    let mut total_root_count = 0usize;
    let mut total_orphan_count = 0usize;

    for arm in armatures {
        let root_count = arm.bones().iter().filter(|b| b.parent.is_none()).count();
        total_root_count += root_count;
        total_orphan_count += root_count.saturating_sub(1);
    }

    let measured = Measured::map([
        ("root_count", Measured::Int(total_root_count as i64)),
        ("orphan_count", Measured::Int(total_orphan_count as i64)),
    ]);
    let threshold = Measured::map([("max_roots_per_armature", Measured::Int(1))]);

    if total_orphan_count > 0 {
        CheckResult::new(
            "bone_hierarchy",
            CheckStatus::Fail,
            measured,
            threshold,
            format!(
                "Hierarchy invalid: {} root bone(s), {} orphan bone(s)",
                total_root_count, total_orphan_count
            ),
        )
    } else {
        CheckResult::new(
            "bone_hierarchy",
            CheckStatus::Pass,
            measured,
            threshold,
            format!(
                "Bone hierarchy valid: {} root bone(s), no orphans",
                total_root_count
            ),
        )
    }
}

/// Runs all armature checks and returns a stage result.
///
/// Early-exits with a SKIPPED stage when no armatures exist and the asset
/// category does not require one.
pub fn check_armature(context: &dyn ArmatureContext, config: &ArmatureConfig) -> StageResult {
    let armatures = context.armature_objects();

    if armatures.is_empty()
        && !config
            .categories_requiring_armature
            .contains(&config.category)
    {
        return StageResult::skipped(
            "armature",
            CheckResult::new(
                "armature_present",
                CheckStatus::Skipped,
                0,
                Measured::Null,
                format!(
                    "No armature; category '{}' does not require one",
                    config.category
                ),
            ),
        );
    }

    let skinned_meshes = context.skinned_meshes();

    let checks = vec![
        check_armature_present(&armatures, config),
        check_bone_count(&armatures, config),
        check_bone_naming(&armatures, config),
        check_vertex_weights(&skinned_meshes, config),
        check_bone_hierarchy(&armatures),
    ];

    StageResult::from_checks("armature", checks)
}
