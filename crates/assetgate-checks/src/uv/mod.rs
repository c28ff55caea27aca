//! UV checks.
//!
//! Validates UV layouts across all mesh objects: missing layers, out-of-bounds
//! coordinates, overlapping islands (spatial-hash accelerated), texel density,
//! and the secondary lightmap channel.

pub mod overlap;


use assetgate_report::{CheckResult, CheckStatus, Measured, StageResult};
use serde::{Deserialize, Serialize};

pub use overlap::{UvTriangle, GRID_DIM};

use overlap::{overlapping_pair_count, triangle_area};

/// Configuration for UV checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UvConfig {
    /// Acceptable (min, max) texel density range, expressed as
    /// UV-area / world-area.
    pub texel_density_target: (f64, f64),
    /// If true, the lightmap layer must exist on every mesh and be
    /// overlap-free.
    pub require_lightmap_uv2: bool,
    /// Primary UV layer name.
    pub uv_layer_name: String,
    /// Lightmap UV layer name.
    pub lightmap_layer_name: String,
}

impl Default for UvConfig {
    fn default() -> Self {
        Self {
            texel_density_target: (512.0, 1024.0),
            require_lightmap_uv2: false,
            uv_layer_name: "UVMap".to_string(),
            lightmap_layer_name: "UVMap2".to_string(),
        }
    }
}

/// A mesh object's UV data.
pub trait UvMesh {
    /// Object name.
    fn name(&self) -> &str;

    /// Names of the UV layers present on this mesh.
    fn uv_layer_names(&self) -> Vec<String>;

    /// Raw UV loop coordinates for one layer.
    fn uv_loops(&self, layer: &str) -> Vec<[f64; 2]>;

    /// UV-space triangles for one layer.
    fn uv_triangles(&self, layer: &str) -> Vec<UvTriangle>;

    /// World-space surface area of the mesh.
    fn world_surface_area(&self) -> f64;
}

/// Access to the mesh objects of the loaded scene.
pub trait UvContext {
    fn mesh_objects(&self) -> Vec<&dyn UvMesh>;
}

fn check_missing_uvs(objects: &[&dyn UvMesh]) -> CheckResult {
    let count = objects
        .iter()
        .filter(|o| o.uv_layer_names().is_empty())
        .count();
    CheckResult::new(
        "missing_uvs",
        if count > 0 { CheckStatus::Fail } else { CheckStatus::Pass },
        count,
        0,
        if count > 0 {
            format!("{} mesh object(s) have no UV layers", count)
        } else {
            "All mesh objects have UV layers".to_string()
        },
    )
}

fn check_uv_bounds(objects: &[&dyn UvMesh], config: &UvConfig) -> CheckResult {
    let mut count = 0usize;
    for obj in objects {
        if !obj.uv_layer_names().contains(&config.uv_layer_name) {
            continue;
        }
        for [u, v] in obj.uv_loops(&config.uv_layer_name) {
            if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
                count += 1;
            }
        }
    }
    CheckResult::new(
        "uv_bounds",
        if count > 0 { CheckStatus::Fail } else { CheckStatus::Pass },
        count,
        0,
        if count > 0 {
            format!("{} UV loop(s) outside [0, 1] bounds", count)
        } else {
            "All UV coordinates within [0, 1]".to_string()
        },
    )
}

fn check_uv_overlap(objects: &[&dyn UvMesh], config: &UvConfig) -> CheckResult {
    let mut all_tris = Vec::new();
    for obj in objects {
        if obj.uv_layer_names().contains(&config.uv_layer_name) {
            all_tris.extend(obj.uv_triangles(&config.uv_layer_name));
        }
    }

    let overlap_count = overlapping_pair_count(&all_tris);
    CheckResult::new(
        "uv_overlap",
        if overlap_count > 0 { CheckStatus::Fail } else { CheckStatus::Pass },
        overlap_count,
        0,
        if overlap_count > 0 {
            format!("{} overlapping UV island pair(s) found", overlap_count)
        } else {
            "No overlapping UV islands".to_string()
        },
    )
}

fn check_texel_density(objects: &[&dyn UvMesh], config: &UvConfig) -> CheckResult {
    let (min_target, max_target) = config.texel_density_target;
    let mut densities = Vec::new();

    for obj in objects {
        if !obj.uv_layer_names().contains(&config.uv_layer_name) {
            continue;
        }
        let uv_area: f64 = obj
            .uv_triangles(&config.uv_layer_name)
            .iter()
            .map(triangle_area)
            .sum();
        let world_area = obj.world_surface_area();
        if world_area > 0.0 && uv_area > 0.0 {
            densities.push(uv_area / world_area);
        }
    }

    if densities.is_empty() {
        return CheckResult::new(
            "texel_density",
            CheckStatus::Skipped,
            Measured::map([
                ("min", Measured::Float(0.0)),
                ("max", Measured::Float(0.0)),
                ("mean", Measured::Float(0.0)),
                ("outlier_count", Measured::Int(0)),
            ]),
            config.texel_density_target,
            "No UV data available for texel density check",
        );
    }

    let d_min = densities.iter().copied().fold(f64::INFINITY, f64::min);
    let d_max = densities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let d_mean = densities.iter().sum::<f64>() / densities.len() as f64;
    let outlier_count = densities
        .iter()
        .filter(|&&d| d < min_target || d > max_target)
        .count();

    let measured = Measured::map([
        ("min", Measured::Float(d_min)),
        ("max", Measured::Float(d_max)),
        ("mean", Measured::Float(d_mean)),
        ("outlier_count", Measured::Int(outlier_count as i64)),
    ]);
    CheckResult::new(
        "texel_density",
        if outlier_count > 0 { CheckStatus::Warning } else { CheckStatus::Pass },
        measured,
        config.texel_density_target,
        if outlier_count > 0 {
            format!(
                "Texel density: {} island(s) outside target range ({}, {}) - flagged for human review",
                outlier_count, min_target, max_target
            )
        } else {
            format!(
                "Texel density within target range ({}, {})",
                min_target, max_target
            )
        },
    )
}

fn check_lightmap_uv2(objects: &[&dyn UvMesh], config: &UvConfig) -> CheckResult {
    if !config.require_lightmap_uv2 {
        return CheckResult::new(
            "lightmap_uv2",
            CheckStatus::Skipped,
            Measured::map([
                ("present", Measured::Bool(false)),
                ("overlap_count", Measured::Int(0)),
            ]),
            0,
            "Lightmap UV2 check skipped (not required)",
        );
    }

    let missing = objects
        .iter()
        .filter(|o| !o.uv_layer_names().contains(&config.lightmap_layer_name))
        .count();
    if missing > 0 {
        return CheckResult::new(
            "lightmap_uv2",
            CheckStatus::Fail,
            Measured::map([
                ("present", Measured::Bool(false)),
                ("overlap_count", Measured::Int(0)),
            ]),
            0,
            format!(
                "Lightmap UV layer '{}' missing on {} object(s)",
                config.lightmap_layer_name, missing
            ),
        );
    }

    let mut all_tris = Vec::new();
    for obj in objects {
        all_tris.extend(obj.uv_triangles(&config.lightmap_layer_name));
    }
    let overlap_count = overlapping_pair_count(&all_tris);

    CheckResult::new(
        "lightmap_uv2",
        if overlap_count > 0 { CheckStatus::Fail } else { CheckStatus::Pass },
        Measured::map([
            ("present", Measured::Bool(true)),
            ("overlap_count", Measured::Int(overlap_count as i64)),
        ]),
        0,
        if overlap_count > 0 {
            format!("Lightmap UV2 has {} overlapping island pair(s)", overlap_count)
        } else {
            "Lightmap UV2 present with no overlaps".to_string()
        },
    )
}

/// Runs all UV checks and returns a stage result.
///
/// `texel_density` is WARNING-only and never fails the stage.
pub fn check_uvs(context: &dyn UvContext, config: &UvConfig) -> StageResult {
    let objects = context.mesh_objects();

    let checks = vec![
        check_missing_uvs(&objects),
        check_uv_bounds(&objects, config),
        check_uv_overlap(&objects, config),
        check_texel_density(&objects, config),
        check_lightmap_uv2(&objects, config),
    ];

    StageResult::from_checks("uv", checks)
}
