//! PBR material checks.
//!
//! Validates metal/roughness workflow compliance, material slot budgets,
//! pixel-value sanity for albedo/metalness/roughness maps, normal-map
//! correctness, and shader-graph structural health.
//!
//! Pixel data conventions: `albedo_pixels()` returns flat RGBA floats in
//! sRGB `[0, 1]`; metalness, roughness, and normal-map pixels are linear.

pub mod graph;

#[cfg(test)]
mod tests;

use assetgate_report::{CheckResult, CheckStatus, Measured, StageResult};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

pub use graph::{NodeLink, ShaderGraph, ShaderNode};

/// Values below this count as pure zero, above `1 - EPS` as pure one.
const NEAR_EPS: f32 = 1e-6;

/// Fixed seed for pixel subsampling, so repeated runs over the same snapshot
/// report identical fractions.
const SAMPLE_SEED: u64 = 0x9e3779b97f4a7c15;

/// Configuration for PBR material checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PbrConfig {
    /// Maximum material slots allowed per mesh object.
    pub max_material_slots: u64,
    /// Minimum allowed sRGB value (0-255) for albedo pixels.
    pub albedo_min_srgb: i64,
    /// Maximum allowed sRGB value (0-255) for albedo pixels.
    pub albedo_max_srgb: i64,
    /// Maximum pixels sampled per population for the pixel checks.
    pub sample_cap: usize,
    /// Metalness values in `(threshold, 1 - threshold)` count as gradient.
    pub metalness_binary_threshold: f32,
}

impl Default for PbrConfig {
    fn default() -> Self {
        Self {
            max_material_slots: 3,
            albedo_min_srgb: 30,
            albedo_max_srgb: 240,
            sample_cap: 1000,
            metalness_binary_threshold: 0.1,
        }
    }
}

/// Pixel data for one normal map image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalMapData {
    /// Image name, for reporting.
    pub image_name: String,
    /// Color-space setting on the image (expected `"Non-Color"`).
    pub colorspace: String,
    /// Flat RGBA pixels in linear `[0, 1]`, if available.
    pub pixels: Option<Vec<f32>>,
}

/// A material with PBR node-graph information and pixel accessors.
pub trait PbrMaterial {
    /// Material name.
    fn name(&self) -> &str;

    /// True if the material has any shader nodes at all.
    fn has_nodes(&self) -> bool;

    /// True if a principled (metal/roughness) node drives the surface output.
    fn uses_principled_bsdf(&self) -> bool;

    /// True if a specular BSDF or glossiness input is in use.
    fn uses_spec_gloss(&self) -> bool;

    /// The material's shading graph structure, if it has nodes.
    fn shader_graph(&self) -> Option<ShaderGraph>;

    /// Flat RGBA pixels in sRGB `[0, 1]` from the base-color texture.
    fn albedo_pixels(&self) -> Option<Vec<f32>>;

    /// Flat RGBA pixels in linear `[0, 1]` from the metallic texture.
    fn metalness_pixels(&self) -> Option<Vec<f32>>;

    /// Flat RGBA pixels in linear `[0, 1]` from the roughness texture.
    fn roughness_pixels(&self) -> Option<Vec<f32>>;

    /// Pixel data for each image feeding a normal-map node.
    fn normal_maps(&self) -> Vec<NormalMapData>;
}

/// A mesh object exposing its material slot count.
pub trait PbrMesh {
    fn name(&self) -> &str;
    fn material_slot_count(&self) -> u64;
}

/// Access to the loaded scene for PBR checking.
pub trait PbrContext {
    fn mesh_objects(&self) -> Vec<&dyn PbrMesh>;
    fn materials(&self) -> Vec<&dyn PbrMaterial>;
}

/// Deterministically picks up to `cap` indices out of `total`.
fn sample_indices(total: usize, cap: usize) -> Vec<usize> {
    if total <= cap {
        (0..total).collect()
    } else {
        let mut rng = Pcg32::seed_from_u64(SAMPLE_SEED);
        rand::seq::index::sample(&mut rng, total, cap).into_vec()
    }
}

/// Extracts up to `cap` (R, G, B) samples from a flat RGBA buffer.
fn rgb_samples(pixels: &[f32], cap: usize) -> Vec<[f32; 3]> {
    let total = pixels.len() / 4;
    sample_indices(total, cap)
        .into_iter()
        .map(|i| [pixels[i * 4], pixels[i * 4 + 1], pixels[i * 4 + 2]])
        .collect()
}

/// Extracts up to `cap` R-channel samples from a flat RGBA buffer.
fn r_samples(pixels: &[f32], cap: usize) -> Vec<f32> {
    let total = pixels.len() / 4;
    sample_indices(total, cap)
        .into_iter()
        .map(|i| pixels[i * 4])
        .collect()
}

/// Re-caps an aggregated sample pool collected across materials.
fn recap<T: Copy>(samples: Vec<T>, cap: usize) -> Vec<T> {
    if samples.len() <= cap {
        samples
    } else {
        sample_indices(samples.len(), cap)
            .into_iter()
            .map(|i| samples[i])
            .collect()
    }
}

fn check_pbr_workflow(materials: &[&dyn PbrMaterial]) -> CheckResult {
    let non_compliant: Vec<String> = materials
        .iter()
        .filter(|m| !m.uses_principled_bsdf() || m.uses_spec_gloss())
        .map(|m| m.name().to_string())
        .collect();
    let count = non_compliant.len();
    CheckResult::new(
        "pbr_workflow",
        if count > 0 { CheckStatus::Fail } else { CheckStatus::Pass },
        non_compliant.clone(),
        0,
        if count > 0 {
            format!(
                "{} material(s) not using the metal/roughness workflow: {}",
                count,
                non_compliant
                    .iter()
                    .map(|n| format!("'{n}'"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        } else {
            "All materials use the metal/roughness workflow".to_string()
        },
    )
}

fn check_material_slots(meshes: &[&dyn PbrMesh], config: &PbrConfig) -> CheckResult {
    let mut worst_count = 0u64;
    let mut worst_object = String::new();
    for obj in meshes {
        if obj.material_slot_count() > worst_count {
            worst_count = obj.material_slot_count();
            worst_object = obj.name().to_string();
        }
    }
    let failed = worst_count > config.max_material_slots;
    CheckResult::new(
        "material_slots",
        if failed { CheckStatus::Fail } else { CheckStatus::Pass },
        Measured::map([
            ("max", Measured::Int(worst_count as i64)),
            ("object", Measured::Text(worst_object.clone())),
        ]),
        config.max_material_slots,
        if failed {
            format!(
                "Object '{}' has {} material slot(s) (limit {})",
                worst_object, worst_count, config.max_material_slots
            )
        } else {
            format!(
                "All objects within material slot limit of {}",
                config.max_material_slots
            )
        },
    )
}

fn check_albedo_range(materials: &[&dyn PbrMaterial], config: &PbrConfig) -> CheckResult {
    let mut all_rgb: Vec<[f32; 3]> = Vec::new();
    for mat in materials {
        if let Some(pix) = mat.albedo_pixels() {
            all_rgb.extend(rgb_samples(&pix, config.sample_cap));
        }
    }

    let threshold = Measured::map([
        ("min", Measured::Int(config.albedo_min_srgb)),
        ("max", Measured::Int(config.albedo_max_srgb)),
    ]);

    if all_rgb.is_empty() {
        return CheckResult::new(
            "albedo_range",
            CheckStatus::Pass,
            Measured::map([
                ("fraction_out_of_range", Measured::Float(0.0)),
                ("sample_count", Measured::Int(0)),
            ]),
            threshold,
            "No albedo textures found - skipped",
        );
    }

    let all_rgb = recap(all_rgb, config.sample_cap);
    let out_of_range = all_rgb
        .iter()
        .filter(|[r, g, b]| {
            [r, g, b].iter().any(|&&c| {
                let v = (c * 255.0).round() as i64;
                v < config.albedo_min_srgb || v > config.albedo_max_srgb
            })
        })
        .count();
    let fraction = out_of_range as f64 / all_rgb.len() as f64;
    let warning = fraction > 0.05;
    CheckResult::new(
        "albedo_range",
        if warning { CheckStatus::Warning } else { CheckStatus::Pass },
        Measured::map([
            ("fraction_out_of_range", Measured::Float(fraction)),
            ("sample_count", Measured::Int(all_rgb.len() as i64)),
        ]),
        threshold,
        if warning {
            format!(
                "{:.1}% of sampled albedo pixels outside sRGB [{}, {}] range - flagged for review",
                fraction * 100.0,
                config.albedo_min_srgb,
                config.albedo_max_srgb
            )
        } else {
            "Albedo pixel values within expected sRGB range".to_string()
        },
    )
}

fn check_metalness_binary(materials: &[&dyn PbrMaterial], config: &PbrConfig) -> CheckResult {
    let mut all_values: Vec<f32> = Vec::new();
    for mat in materials {
        if let Some(pix) = mat.metalness_pixels() {
            all_values.extend(r_samples(&pix, config.sample_cap));
        }
    }

    if all_values.is_empty() {
        return CheckResult::new(
            "metalness_binary",
            CheckStatus::Pass,
            Measured::map([("fraction_gradient", Measured::Float(0.0))]),
            Measured::Float(config.metalness_binary_threshold as f64),
            "No metalness textures found - skipped",
        );
    }

    let all_values = recap(all_values, config.sample_cap);
    let t = config.metalness_binary_threshold;
    let gradient = all_values
        .iter()
        .filter(|&&v| v > t && v < 1.0 - t)
        .count();
    let fraction = gradient as f64 / all_values.len() as f64;
    let warning = fraction > 0.10;
    CheckResult::new(
        "metalness_binary",
        if warning { CheckStatus::Warning } else { CheckStatus::Pass },
        Measured::map([("fraction_gradient", Measured::Float(fraction))]),
        Measured::Float(t as f64),
        if warning {
            format!(
                "{:.1}% of metalness pixels are gradient values (between {:.2} and {:.2}) - flagged for review",
                fraction * 100.0,
                t,
                1.0 - t
            )
        } else {
            "Metalness values are predominantly binary (near 0 or 1)".to_string()
        },
    )
}

fn check_roughness_range(materials: &[&dyn PbrMaterial], config: &PbrConfig) -> CheckResult {
    let mut all_values: Vec<f32> = Vec::new();
    for mat in materials {
        if let Some(pix) = mat.roughness_pixels() {
            all_values.extend(r_samples(&pix, config.sample_cap));
        }
    }

    if all_values.is_empty() {
        return CheckResult::new(
            "roughness_range",
            CheckStatus::Pass,
            Measured::map([
                ("fraction_pure_zero", Measured::Float(0.0)),
                ("fraction_pure_one", Measured::Float(0.0)),
            ]),
            Measured::Float(0.5),
            "No roughness textures found - skipped",
        );
    }

    let all_values = recap(all_values, config.sample_cap);
    let total = all_values.len();
    let pure_zero = all_values.iter().filter(|&&v| v < NEAR_EPS).count();
    let pure_one = all_values.iter().filter(|&&v| v > 1.0 - NEAR_EPS).count();
    let frac_zero = pure_zero as f64 / total as f64;
    let frac_one = pure_one as f64 / total as f64;
    let warning = frac_zero > 0.5 || frac_one > 0.5;
    CheckResult::new(
        "roughness_range",
        if warning { CheckStatus::Warning } else { CheckStatus::Pass },
        Measured::map([
            ("fraction_pure_zero", Measured::Float(frac_zero)),
            ("fraction_pure_one", Measured::Float(frac_one)),
        ]),
        Measured::Float(0.5),
        if warning {
            format!(
                "Roughness dominated by extreme values (pure 0: {:.1}%, pure 1: {:.1}%) - flagged for review",
                frac_zero * 100.0,
                frac_one * 100.0
            )
        } else {
            "Roughness values have reasonable spread".to_string()
        },
    )
}

/// Tangent-space normal maps must be Non-Color and blue-channel dominant.
fn check_normal_map(materials: &[&dyn PbrMaterial]) -> CheckResult {
    let mut colorspace_violations: Vec<String> = Vec::new();
    let mut channel_violations: Vec<String> = Vec::new();

    for mat in materials {
        for nm in mat.normal_maps() {
            if nm.colorspace != "Non-Color" {
                colorspace_violations.push(nm.image_name.clone());
            }
            if let Some(pixels) = &nm.pixels {
                let total = pixels.len() / 4;
                if total == 0 {
                    continue;
                }
                let mut sums = [0.0f64; 3];
                for i in 0..total {
                    sums[0] += pixels[i * 4] as f64;
                    sums[1] += pixels[i * 4 + 1] as f64;
                    sums[2] += pixels[i * 4 + 2] as f64;
                }
                let mean_r = sums[0] / total as f64;
                let mean_g = sums[1] / total as f64;
                let mean_b = sums[2] / total as f64;
                if !(mean_b > mean_r && mean_b > mean_g) {
                    channel_violations.push(nm.image_name.clone());
                }
            }
        }
    }

    let failed = !colorspace_violations.is_empty() || !channel_violations.is_empty();
    CheckResult::new(
        "normal_map",
        if failed { CheckStatus::Fail } else { CheckStatus::Pass },
        Measured::map([
            ("colorspace_violations", Measured::from(colorspace_violations.clone())),
            ("channel_violations", Measured::from(channel_violations.clone())),
        ]),
        Measured::Null,
        if failed {
            format!(
                "Normal map issues - colorspace violations: {:?}, channel violations: {:?}",
                colorspace_violations, channel_violations
            )
        } else {
            "All normal maps use correct colorspace and are blue-channel dominant".to_string()
        },
    )
}

/// Flags node-graph issues: empty material slots, orphan image-texture
/// nodes, and directed cycles.
fn check_node_graph(materials: &[&dyn PbrMaterial]) -> CheckResult {
    let mut issues: Vec<String> = Vec::new();
    for mat in materials {
        if !mat.has_nodes() {
            issues.push(format!("'{}': empty material slot (no nodes)", mat.name()));
        } else if mat.uses_principled_bsdf() {
            if let Some(graph) = mat.shader_graph() {
                let orphans = graph.orphan_image_node_count();
                if orphans > 0 {
                    issues.push(format!(
                        "'{}': {} orphan image texture node(s) not connected to any output",
                        mat.name(),
                        orphans
                    ));
                }
                if graph.has_cycles() {
                    issues.push(format!("'{}': cycle detected in node graph", mat.name()));
                }
            }
        }
    }

    let count = issues.len();
    CheckResult::new(
        "node_graph",
        if count > 0 { CheckStatus::Warning } else { CheckStatus::Pass },
        Measured::from(issues),
        Measured::Null,
        if count > 0 {
            format!("{} node graph issue(s) detected - flagged for review", count)
        } else {
            "Node graphs are clean (no orphans, cycles, or empty slots)".to_string()
        },
    )
}

/// Runs all PBR checks and returns a stage result.
///
/// Only `pbr_workflow`, `material_slots`, and `normal_map` can fail the
/// stage; the pixel-statistics checks and `node_graph` are WARNING-only.
pub fn check_pbr(context: &dyn PbrContext, config: &PbrConfig) -> StageResult {
    let meshes = context.mesh_objects();
    let materials = context.materials();

    let checks = vec![
        check_pbr_workflow(&materials),
        check_material_slots(&meshes, config),
        check_albedo_range(&materials, config),
        check_metalness_binary(&materials, config),
        check_roughness_range(&materials, config),
        check_normal_map(&materials),
        check_node_graph(&materials),
    ];

    StageResult::from_checks("pbr", checks)
}
