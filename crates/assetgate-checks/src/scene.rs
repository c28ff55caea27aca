//! Scene and hierarchy checks, plus performance estimates.
//!
//! Validates scene-level conventions (object naming, orphan data blocks,
//! LOD/collision mesh presence) and derives performance metrics. The
//! estimator always runs, independent of check outcomes; callers pass the
//! estimates on to the report builder.

use assetgate_report::{CheckResult, CheckStatus, Measured, PerformanceEstimates, StageResult};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Mip-chain overhead applied to raw texture bytes.
const MIP_MULTIPLIER: f64 = 4.0 / 3.0;

/// Configuration for scene checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Regex every mesh object name should match (WARNING if violated).
    pub object_naming_pattern: String,
    /// Require at least one object matching `lod_suffix_pattern`.
    pub require_lod: bool,
    /// Require at least one object matching `collision_suffix_pattern`.
    pub require_collision: bool,
    /// Regex that identifies LOD meshes by name.
    pub lod_suffix_pattern: String,
    /// Regex that identifies collision meshes by name.
    pub collision_suffix_pattern: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            object_naming_pattern: "^[A-Za-z0-9_]+$".to_string(),
            require_lod: false,
            require_collision: false,
            lod_suffix_pattern: r"_LOD\d+$".to_string(),
            collision_suffix_pattern: "_Collision$".to_string(),
        }
    }
}

/// A mesh object as the scene checks see it.
pub trait SceneMesh {
    fn name(&self) -> &str;
    fn triangle_count(&self) -> u64;
    fn material_slot_count(&self) -> u64;
}

/// An armature object as the scene checks see it.
pub trait SceneArmature {
    fn name(&self) -> &str;
    fn bone_count(&self) -> u64;
}

/// An image data-block, for VRAM estimation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Color channels (3 for RGB, 4 for RGBA).
    pub channels: u32,
    /// Bits per channel (8 for standard images).
    pub bit_depth: u32,
}

/// Data blocks with zero users, by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrphanCounts {
    pub meshes: u64,
    pub materials: u64,
    pub images: u64,
}

impl OrphanCounts {
    /// Total orphan blocks across all categories.
    pub fn total(&self) -> u64 {
        self.meshes + self.materials + self.images
    }
}

/// Access to scene-level data.
pub trait SceneContext {
    fn mesh_objects(&self) -> Vec<&dyn SceneMesh>;
    fn armature_objects(&self) -> Vec<&dyn SceneArmature>;

    /// De-duplicated list of images referenced in the scene.
    fn unique_images(&self) -> Vec<SceneImage>;

    fn orphan_counts(&self) -> OrphanCounts;
}

fn check_naming_conventions(meshes: &[&dyn SceneMesh], config: &SceneConfig) -> CheckResult {
    let Ok(pattern) = Regex::new(&config.object_naming_pattern) else {
        return CheckResult::new(
            "naming_conventions",
            CheckStatus::Skipped,
            Measured::map([
                ("violations", Measured::List(Vec::new())),
                ("count", Measured::Int(0)),
            ]),
            Measured::Text(config.object_naming_pattern.clone()),
            format!(
                "Naming check skipped (invalid pattern '{}')",
                config.object_naming_pattern
            ),
        );
    };

    let violations: Vec<String> = meshes
        .iter()
        .filter(|m| !pattern.is_match(m.name()))
        .map(|m| m.name().to_string())
        .collect();
    let count = violations.len();
    CheckResult::new(
        "naming_conventions",
        if count > 0 { CheckStatus::Warning } else { CheckStatus::Pass },
        Measured::map([
            ("violations", Measured::from(violations)),
            ("count", Measured::Int(count as i64)),
        ]),
        Measured::Text(config.object_naming_pattern.clone()),
        if count > 0 {
            format!(
                "{} object name(s) do not match pattern '{}'",
                count, config.object_naming_pattern
            )
        } else {
            format!(
                "All object names match pattern '{}'",
                config.object_naming_pattern
            )
        },
    )
}

fn check_orphan_data(orphans: OrphanCounts) -> CheckResult {
    let total = orphans.total();
    CheckResult::new(
        "orphan_data",
        if total > 0 { CheckStatus::Warning } else { CheckStatus::Pass },
        total,
        0,
        if total > 0 {
            format!(
                "{} orphan data block(s) found: {} mesh(es), {} material(s), {} image(s)",
                total, orphans.meshes, orphans.materials, orphans.images
            )
        } else {
            "No orphan data blocks".to_string()
        },
    )
}

fn check_suffix_presence(
    name: &str,
    label: &str,
    meshes: &[&dyn SceneMesh],
    required: bool,
    suffix_pattern: &str,
) -> CheckResult {
    if !required {
        return CheckResult::new(
            name,
            CheckStatus::Skipped,
            0,
            Measured::Null,
            format!("{} presence check skipped (not required)", label),
        );
    }

    let Ok(pattern) = Regex::new(suffix_pattern) else {
        return CheckResult::new(
            name,
            CheckStatus::Skipped,
            0,
            Measured::Text(suffix_pattern.to_string()),
            format!(
                "{} presence check skipped (invalid pattern '{}')",
                label, suffix_pattern
            ),
        );
    };

    let count = meshes.iter().filter(|m| pattern.is_match(m.name())).count();
    if count == 0 {
        CheckResult::new(
            name,
            CheckStatus::Fail,
            0,
            Measured::Text(suffix_pattern.to_string()),
            format!(
                "No {} objects found matching '{}' (required)",
                label.to_lowercase(),
                suffix_pattern
            ),
        )
    } else {
        CheckResult::new(
            name,
            CheckStatus::Pass,
            count,
            Measured::Text(suffix_pattern.to_string()),
            format!(
                "{} {} object(s) found matching '{}'",
                count,
                label.to_lowercase(),
                suffix_pattern
            ),
        )
    }
}

fn compute_performance(
    meshes: &[&dyn SceneMesh],
    armatures: &[&dyn SceneArmature],
    images: &[SceneImage],
) -> PerformanceEstimates {
    let triangle_count: u64 = meshes.iter().map(|m| m.triangle_count()).sum();
    let draw_call_estimate: u64 = meshes.iter().map(|m| m.material_slot_count()).sum();

    let mut vram_estimate_mb = 0.0f64;
    for img in images {
        let bytes =
            img.width as f64 * img.height as f64 * img.channels as f64 * img.bit_depth as f64 / 8.0;
        vram_estimate_mb += bytes / 1024.0 / 1024.0 * MIP_MULTIPLIER;
    }

    let bone_count: u64 = armatures.iter().map(|a| a.bone_count()).sum();

    PerformanceEstimates {
        triangle_count,
        draw_call_estimate,
        vram_estimate_mb,
        bone_count,
    }
}

/// Runs all scene checks and computes performance estimates.
///
/// Naming and orphan-data are WARNING-only; LOD and collision presence can
/// fail the stage when required by policy.
pub fn check_scene(
    context: &dyn SceneContext,
    config: &SceneConfig,
) -> (StageResult, PerformanceEstimates) {
    let meshes = context.mesh_objects();
    let armatures = context.armature_objects();
    let images = context.unique_images();
    let orphans = context.orphan_counts();

    let checks = vec![
        check_naming_conventions(&meshes, config),
        check_orphan_data(orphans),
        check_suffix_presence(
            "lod_presence",
            "LOD",
            &meshes,
            config.require_lod,
            &config.lod_suffix_pattern,
        ),
        check_suffix_presence(
            "collision_presence",
            "Collision",
            &meshes,
            config.require_collision,
            &config.collision_suffix_pattern,
        ),
    ];

    let stage = StageResult::from_checks("scene", checks);
    let perf = compute_performance(&meshes, &armatures, &images);

    (stage, perf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetgate_report::StageStatus;
    use pretty_assertions::assert_eq;

    struct MeshFixture {
        name: String,
        triangles: u64,
        slots: u64,
    }

    impl SceneMesh for MeshFixture {
        fn name(&self) -> &str {
            &self.name
        }

        fn triangle_count(&self) -> u64 {
            self.triangles
        }

        fn material_slot_count(&self) -> u64 {
            self.slots
        }
    }

    struct ArmatureFixture {
        name: String,
        bones: u64,
    }

    impl SceneArmature for ArmatureFixture {
        fn name(&self) -> &str {
            &self.name
        }

        fn bone_count(&self) -> u64 {
            self.bones
        }
    }

    struct Scene {
        meshes: Vec<MeshFixture>,
        armatures: Vec<ArmatureFixture>,
        images: Vec<SceneImage>,
        orphans: OrphanCounts,
    }

    impl Scene {
        fn empty() -> Self {
            Self {
                meshes: vec![],
                armatures: vec![],
                images: vec![],
                orphans: OrphanCounts::default(),
            }
        }
    }

    impl SceneContext for Scene {
        fn mesh_objects(&self) -> Vec<&dyn SceneMesh> {
            self.meshes.iter().map(|m| m as &dyn SceneMesh).collect()
        }

        fn armature_objects(&self) -> Vec<&dyn SceneArmature> {
            self.armatures.iter().map(|a| a as &dyn SceneArmature).collect()
        }

        fn unique_images(&self) -> Vec<SceneImage> {
            self.images.clone()
        }

        fn orphan_counts(&self) -> OrphanCounts {
            self.orphans
        }
    }

    fn mesh(name: &str, triangles: u64, slots: u64) -> MeshFixture {
        MeshFixture {
            name: name.to_string(),
            triangles,
            slots,
        }
    }

    #[test]
    fn bad_object_name_is_a_warning_not_a_fail() {
        let mut scene = Scene::empty();
        scene.meshes.push(mesh("Prop Crate.001", 100, 1));
        let (stage, _) = check_scene(&scene, &SceneConfig::default());

        assert_eq!(
            stage.check("naming_conventions").unwrap().status,
            CheckStatus::Warning
        );
        assert_eq!(stage.status, StageStatus::Pass);
    }

    #[test]
    fn orphan_blocks_are_a_warning() {
        let mut scene = Scene::empty();
        scene.orphans = OrphanCounts {
            meshes: 1,
            materials: 2,
            images: 0,
        };
        let (stage, _) = check_scene(&scene, &SceneConfig::default());

        let check = stage.check("orphan_data").unwrap();
        assert_eq!(check.status, CheckStatus::Warning);
        assert_eq!(check.measured_value, Measured::Int(3));
    }

    #[test]
    fn lod_and_collision_skipped_by_default() {
        let (stage, _) = check_scene(&Scene::empty(), &SceneConfig::default());
        assert_eq!(
            stage.check("lod_presence").unwrap().status,
            CheckStatus::Skipped
        );
        assert_eq!(
            stage.check("collision_presence").unwrap().status,
            CheckStatus::Skipped
        );
    }

    #[test]
    fn missing_lod_fails_when_required() {
        let mut scene = Scene::empty();
        scene.meshes.push(mesh("Prop_Crate", 100, 1));
        let config = SceneConfig {
            require_lod: true,
            ..SceneConfig::default()
        };
        let (stage, _) = check_scene(&scene, &config);

        assert_eq!(
            stage.check("lod_presence").unwrap().status,
            CheckStatus::Fail
        );
        assert_eq!(stage.status, StageStatus::Fail);
    }

    #[test]
    fn lod_suffix_matches_anywhere_from_the_end() {
        let mut scene = Scene::empty();
        scene.meshes.push(mesh("Prop_Crate", 100, 1));
        scene.meshes.push(mesh("Prop_Crate_LOD1", 50, 1));
        let config = SceneConfig {
            require_lod: true,
            ..SceneConfig::default()
        };
        let (stage, _) = check_scene(&scene, &config);

        let check = stage.check("lod_presence").unwrap();
        assert_eq!(check.status, CheckStatus::Pass);
        assert_eq!(check.measured_value, Measured::Int(1));
    }

    #[test]
    fn collision_presence_passes_when_present() {
        let mut scene = Scene::empty();
        scene.meshes.push(mesh("Prop_Crate_Collision", 12, 1));
        let config = SceneConfig {
            require_collision: true,
            ..SceneConfig::default()
        };
        let (stage, _) = check_scene(&scene, &config);
        assert_eq!(
            stage.check("collision_presence").unwrap().status,
            CheckStatus::Pass
        );
    }

    #[test]
    fn performance_estimates_sum_everything() {
        let mut scene = Scene::empty();
        scene.meshes.push(mesh("Prop_A", 1_000, 2));
        scene.meshes.push(mesh("Prop_B", 500, 1));
        scene.armatures.push(ArmatureFixture {
            name: "RIG_A".to_string(),
            bones: 30,
        });
        // One 1024x1024 RGBA8 image: 4 MiB raw, 16/3 MiB with mips.
        scene.images.push(SceneImage {
            width: 1024,
            height: 1024,
            channels: 4,
            bit_depth: 8,
        });

        let (_, perf) = check_scene(&scene, &SceneConfig::default());
        assert_eq!(perf.triangle_count, 1_500);
        assert_eq!(perf.draw_call_estimate, 3);
        assert_eq!(perf.bone_count, 30);
        assert!((perf.vram_estimate_mb - 16.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn estimator_runs_even_when_checks_fail() {
        let mut scene = Scene::empty();
        scene.meshes.push(mesh("Prop_Crate", 100, 1));
        let config = SceneConfig {
            require_lod: true,
            require_collision: true,
            ..SceneConfig::default()
        };
        let (stage, perf) = check_scene(&scene, &config);
        assert_eq!(stage.status, StageStatus::Fail);
        assert_eq!(perf.triangle_count, 100);
    }
}
