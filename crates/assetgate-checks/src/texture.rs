//! Texture checks.
//!
//! Validates the textures referenced by the scene's materials: missing file
//! references, resolution limits, power-of-two dimensions, per-material
//! texture budget, bit depth, and inferred color-space correctness.

use assetgate_report::{CheckResult, CheckStatus, Measured, StageResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bit depths considered standard (RGB8 / RGBA8).
const STANDARD_DEPTHS: [u32; 2] = [24, 32];

const SRGB_KEYWORDS: [&str; 6] = [
    "albedo", "diffuse", "color", "colour", "basecolor", "base_color",
];
const LINEAR_KEYWORDS: [&str; 11] = [
    "normal",
    "rough",
    "roughness",
    "metal",
    "metallic",
    "ao",
    "ambient_occlusion",
    "specular",
    "height",
    "bump",
    "displacement",
];

/// Configuration for texture checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    /// Maximum allowed dimension for standard assets.
    pub max_resolution_standard: u32,
    /// Maximum allowed dimension for hero assets.
    pub max_resolution_hero: u32,
    /// Use the hero limit instead of the standard one.
    pub is_hero_asset: bool,
    /// Maximum image-texture nodes permitted on a single material.
    pub max_textures_per_material: usize,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            max_resolution_standard: 2048,
            max_resolution_hero: 4096,
            is_hero_asset: false,
            max_textures_per_material: 8,
        }
    }
}

/// One image-texture node in a material's shading graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureNodeRef {
    /// Downstream socket name the node's color output feeds (falls back to
    /// the image name when unconnected).
    pub socket_name: String,
    /// Referenced image name.
    pub image_name: String,
    /// True when the image's file reference does not resolve.
    pub file_missing: bool,
}

/// A material and its image-texture nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialTextures {
    /// Material name.
    pub name: String,
    /// Image-texture nodes in the material's graph.
    pub nodes: Vec<TextureNodeRef>,
}

/// An image data-block as the texture checks see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Image name.
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Total bits per pixel (e.g. 24 for RGB8, 32 for RGBA8).
    pub depth: u32,
    /// Declared color-space name (e.g. `"sRGB"`, `"Non-Color"`).
    pub colorspace: String,
}

/// Access to materials and the de-duplicated image list.
pub trait TextureContext {
    fn materials(&self) -> Vec<MaterialTextures>;
    fn images(&self) -> Vec<ImageInfo>;
}

/// Expected color space inferred from naming keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExpectedColorSpace {
    Srgb,
    NonColor,
}

impl ExpectedColorSpace {
    fn as_str(self) -> &'static str {
        match self {
            ExpectedColorSpace::Srgb => "sRGB",
            ExpectedColorSpace::NonColor => "Non-Color",
        }
    }
}

/// Infers the expected color space from socket and image name keywords.
///
/// The socket name is checked before the image name so explicit wiring takes
/// priority; within each, color keywords win over linear keywords.
fn infer_expected_colorspace(socket_name: &str, image_name: &str) -> Option<ExpectedColorSpace> {
    for text in [socket_name.to_lowercase(), image_name.to_lowercase()] {
        if SRGB_KEYWORDS.iter().any(|kw| text.contains(kw)) {
            return Some(ExpectedColorSpace::Srgb);
        }
        if LINEAR_KEYWORDS.iter().any(|kw| text.contains(kw)) {
            return Some(ExpectedColorSpace::NonColor);
        }
    }
    None
}

/// True for sizes of the form 2^k, k >= 0. Zero is never a power of two.
fn is_power_of_two(n: u32) -> bool {
    n > 0 && (n & (n - 1)) == 0
}

fn check_missing_textures(materials: &[MaterialTextures]) -> CheckResult {
    let broken = materials
        .iter()
        .flat_map(|m| m.nodes.iter())
        .filter(|n| n.file_missing)
        .count();
    CheckResult::new(
        "missing_textures",
        if broken > 0 { CheckStatus::Fail } else { CheckStatus::Pass },
        broken,
        0,
        if broken > 0 {
            format!("{} texture reference(s) with missing files", broken)
        } else {
            "All texture references resolve to existing files".to_string()
        },
    )
}

fn check_resolution_limit(images: &[ImageInfo], config: &TextureConfig) -> CheckResult {
    let limit = if config.is_hero_asset {
        config.max_resolution_hero
    } else {
        config.max_resolution_standard
    };
    let violations: Vec<Measured> = images
        .iter()
        .filter(|img| img.width > limit || img.height > limit)
        .map(|img| {
            Measured::map([
                ("name", Measured::Text(img.name.clone())),
                ("size", Measured::list([img.width, img.height])),
                ("limit", Measured::Int(limit as i64)),
            ])
        })
        .collect();
    let count = violations.len();
    CheckResult::new(
        "resolution_limit",
        if count > 0 { CheckStatus::Fail } else { CheckStatus::Pass },
        Measured::map([("violations", Measured::List(violations))]),
        limit,
        if count > 0 {
            format!("{} image(s) exceed resolution limit of {}px", count, limit)
        } else {
            format!("All images within resolution limit of {}px", limit)
        },
    )
}

fn check_power_of_two(images: &[ImageInfo]) -> CheckResult {
    let violations: Vec<Measured> = images
        .iter()
        .filter(|img| !is_power_of_two(img.width) || !is_power_of_two(img.height))
        .map(|img| {
            Measured::map([
                ("name", Measured::Text(img.name.clone())),
                ("size", Measured::list([img.width, img.height])),
            ])
        })
        .collect();
    let count = violations.len();
    CheckResult::new(
        "power_of_two",
        if count > 0 { CheckStatus::Fail } else { CheckStatus::Pass },
        Measured::map([("violations", Measured::List(violations))]),
        0,
        if count > 0 {
            format!("{} image(s) have non-power-of-two dimensions", count)
        } else {
            "All images have power-of-two dimensions".to_string()
        },
    )
}

fn check_texture_count(materials: &[MaterialTextures], config: &TextureConfig) -> CheckResult {
    let mut worst_count = 0usize;
    let mut worst_mat = String::new();
    for mat in materials {
        if mat.nodes.len() > worst_count {
            worst_count = mat.nodes.len();
            worst_mat = mat.name.clone();
        }
    }
    let failed = worst_count > config.max_textures_per_material;
    CheckResult::new(
        "texture_count",
        if failed { CheckStatus::Fail } else { CheckStatus::Pass },
        Measured::map([
            ("max", Measured::Int(worst_count as i64)),
            ("material", Measured::Text(worst_mat.clone())),
        ]),
        config.max_textures_per_material,
        if failed {
            format!(
                "Material '{}' has {} texture(s) (limit {})",
                worst_mat, worst_count, config.max_textures_per_material
            )
        } else {
            format!(
                "All materials within texture limit of {}",
                config.max_textures_per_material
            )
        },
    )
}

fn check_channel_depth(images: &[ImageInfo]) -> CheckResult {
    let flagged: Vec<Measured> = images
        .iter()
        .filter(|img| !STANDARD_DEPTHS.contains(&img.depth))
        .map(|img| {
            Measured::map([
                ("name", Measured::Text(img.name.clone())),
                ("depth", Measured::Int(img.depth as i64)),
            ])
        })
        .collect();
    let count = flagged.len();
    CheckResult::new(
        "channel_depth",
        if count > 0 { CheckStatus::Warning } else { CheckStatus::Pass },
        Measured::map([("images", Measured::List(flagged))]),
        Measured::list(STANDARD_DEPTHS),
        if count > 0 {
            format!(
                "{} image(s) have non-standard bit depth (16-bit or HDR) - flagged for review",
                count
            )
        } else {
            "All images have standard bit depth (24 or 32)".to_string()
        },
    )
}

fn check_color_space(materials: &[MaterialTextures], images: &[ImageInfo]) -> CheckResult {
    let image_by_name: BTreeMap<&str, &ImageInfo> =
        images.iter().map(|img| (img.name.as_str(), img)).collect();
    let mut violations = Vec::new();

    for mat in materials {
        for node in &mat.nodes {
            let Some(expected) = infer_expected_colorspace(&node.socket_name, &node.image_name)
            else {
                continue; // No keyword match, no judgment possible.
            };
            let Some(img) = image_by_name.get(node.image_name.as_str()) else {
                continue; // Image not available in this scene.
            };

            let acceptable = match expected {
                // Both "Non-Color" and "Linear" are fine for linear maps.
                ExpectedColorSpace::NonColor => {
                    img.colorspace == "Non-Color" || img.colorspace == "Linear"
                }
                ExpectedColorSpace::Srgb => img.colorspace == "sRGB",
            };
            if !acceptable {
                violations.push(Measured::map([
                    ("name", Measured::Text(node.image_name.clone())),
                    ("expected", Measured::Text(expected.as_str().to_string())),
                    ("actual", Measured::Text(img.colorspace.clone())),
                ]));
            }
        }
    }

    let count = violations.len();
    CheckResult::new(
        "color_space",
        if count > 0 { CheckStatus::Warning } else { CheckStatus::Pass },
        Measured::map([("violations", Measured::List(violations))]),
        Measured::Null,
        if count > 0 {
            format!("{} color space mismatch(es) detected - flagged for review", count)
        } else {
            "All texture color spaces match expected values".to_string()
        },
    )
}

/// Runs all texture checks and returns a stage result.
///
/// `channel_depth` and `color_space` are WARNING-only and never fail the
/// stage.
pub fn check_textures(context: &dyn TextureContext, config: &TextureConfig) -> StageResult {
    let materials = context.materials();
    let images = context.images();

    let checks = vec![
        check_missing_textures(&materials),
        check_resolution_limit(&images, config),
        check_power_of_two(&images),
        check_texture_count(&materials, config),
        check_channel_depth(&images),
        check_color_space(&materials, &images),
    ];

    StageResult::from_checks("texture", checks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetgate_report::StageStatus;
    use pretty_assertions::assert_eq;

    struct Scene {
        materials: Vec<MaterialTextures>,
        images: Vec<ImageInfo>,
    }

    impl TextureContext for Scene {
        fn materials(&self) -> Vec<MaterialTextures> {
            self.materials.clone()
        }

        fn images(&self) -> Vec<ImageInfo> {
            self.images.clone()
        }
    }

    fn node(socket: &str, image: &str) -> TextureNodeRef {
        TextureNodeRef {
            socket_name: socket.to_string(),
            image_name: image.to_string(),
            file_missing: false,
        }
    }

    fn image(name: &str, size: u32, depth: u32, colorspace: &str) -> ImageInfo {
        ImageInfo {
            name: name.to_string(),
            width: size,
            height: size,
            depth,
            colorspace: colorspace.to_string(),
        }
    }

    fn clean_scene() -> Scene {
        Scene {
            materials: vec![MaterialTextures {
                name: "M_Crate".to_string(),
                nodes: vec![
                    node("Base Color", "T_Crate_Albedo"),
                    node("Roughness", "T_Crate_Roughness"),
                ],
            }],
            images: vec![
                image("T_Crate_Albedo", 1024, 24, "sRGB"),
                image("T_Crate_Roughness", 1024, 24, "Non-Color"),
            ],
        }
    }

    #[test]
    fn clean_scene_passes_all_checks() {
        let stage = check_textures(&clean_scene(), &TextureConfig::default());
        assert_eq!(stage.status, StageStatus::Pass);
        for check in &stage.checks {
            assert_eq!(check.status, CheckStatus::Pass, "{} should pass", check.name);
        }
    }

    #[test]
    fn missing_file_reference_fails() {
        let mut scene = clean_scene();
        scene.materials[0].nodes[0].file_missing = true;
        let stage = check_textures(&scene, &TextureConfig::default());

        let check = stage.check("missing_textures").unwrap();
        assert_eq!(check.status, CheckStatus::Fail);
        assert_eq!(check.measured_value, Measured::Int(1));
    }

    #[test]
    fn oversized_image_fails_standard_limit() {
        let mut scene = clean_scene();
        scene.images[0] = image("T_Crate_Albedo", 4096, 24, "sRGB");
        let stage = check_textures(&scene, &TextureConfig::default());

        let check = stage.check("resolution_limit").unwrap();
        assert_eq!(check.status, CheckStatus::Fail);
        assert_eq!(check.threshold, Measured::Int(2048));
    }

    #[test]
    fn hero_asset_uses_hero_limit() {
        let mut scene = clean_scene();
        scene.images[0] = image("T_Crate_Albedo", 4096, 24, "sRGB");
        let config = TextureConfig {
            is_hero_asset: true,
            ..TextureConfig::default()
        };
        let stage = check_textures(&scene, &config);
        assert_eq!(
            stage.check("resolution_limit").unwrap().status,
            CheckStatus::Pass
        );
    }

    #[test]
    fn power_of_two_accepts_exactly_powers() {
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(2));
        assert!(is_power_of_two(1024));
        assert!(is_power_of_two(4096));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(3));
        assert!(!is_power_of_two(1000));
        assert!(!is_power_of_two(1536));
    }

    #[test]
    fn non_power_of_two_image_fails() {
        let mut scene = clean_scene();
        scene.images[1] = image("T_Crate_Roughness", 1000, 24, "Non-Color");
        let stage = check_textures(&scene, &TextureConfig::default());
        assert_eq!(
            stage.check("power_of_two").unwrap().status,
            CheckStatus::Fail
        );
    }

    #[test]
    fn texture_budget_reports_worst_material() {
        let mut scene = clean_scene();
        scene.materials.push(MaterialTextures {
            name: "M_Greedy".to_string(),
            nodes: (0..9)
                .map(|i| node("Base Color", &format!("T_Layer_{i}_albedo")))
                .collect(),
        });
        for i in 0..9 {
            scene
                .images
                .push(image(&format!("T_Layer_{i}_albedo"), 512, 24, "sRGB"));
        }
        let stage = check_textures(&scene, &TextureConfig::default());

        let check = stage.check("texture_count").unwrap();
        assert_eq!(check.status, CheckStatus::Fail);
        match &check.measured_value {
            Measured::Map(map) => {
                assert_eq!(map.get("max"), Some(&Measured::Int(9)));
                assert_eq!(
                    map.get("material"),
                    Some(&Measured::Text("M_Greedy".to_string()))
                );
            }
            other => panic!("expected map, got {other:?}"),
        }
    }

    #[test]
    fn odd_bit_depth_is_warning_only() {
        let mut scene = clean_scene();
        scene.images[1] = image("T_Crate_Roughness", 1024, 16, "Non-Color");
        let stage = check_textures(&scene, &TextureConfig::default());

        assert_eq!(
            stage.check("channel_depth").unwrap().status,
            CheckStatus::Warning
        );
        assert_eq!(stage.status, StageStatus::Pass);
    }

    #[test]
    fn colorspace_inference_prefers_socket_over_image_name() {
        // Socket says roughness (linear) even though the image name says
        // albedo; the socket wins.
        assert_eq!(
            infer_expected_colorspace("Roughness", "T_Crate_Albedo"),
            Some(ExpectedColorSpace::NonColor)
        );
        assert_eq!(
            infer_expected_colorspace("Base Color", "whatever"),
            Some(ExpectedColorSpace::Srgb)
        );
        assert_eq!(
            infer_expected_colorspace("Fac", "T_Crate_Normal"),
            Some(ExpectedColorSpace::NonColor)
        );
        assert_eq!(infer_expected_colorspace("Fac", "T_Mystery"), None);
    }

    #[test]
    fn srgb_normal_map_is_a_colorspace_warning() {
        let mut scene = clean_scene();
        scene.materials[0]
            .nodes
            .push(node("Normal", "T_Crate_Normal"));
        scene.images.push(image("T_Crate_Normal", 1024, 24, "sRGB"));
        let stage = check_textures(&scene, &TextureConfig::default());

        let check = stage.check("color_space").unwrap();
        assert_eq!(check.status, CheckStatus::Warning);
        assert_eq!(stage.status, StageStatus::Pass);
    }

    #[test]
    fn linear_declared_colorspace_is_accepted_for_linear_maps() {
        let mut scene = clean_scene();
        scene.images[1] = image("T_Crate_Roughness", 1024, 24, "Linear");
        let stage = check_textures(&scene, &TextureConfig::default());
        assert_eq!(
            stage.check("color_space").unwrap().status,
            CheckStatus::Pass
        );
    }

    #[test]
    fn unmatched_keywords_are_skipped() {
        let scene = Scene {
            materials: vec![MaterialTextures {
                name: "M_Odd".to_string(),
                nodes: vec![node("Fac", "T_Mystery")],
            }],
            images: vec![image("T_Mystery", 512, 24, "sRGB")],
        };
        let stage = check_textures(&scene, &TextureConfig::default());
        assert_eq!(
            stage.check("color_space").unwrap().status,
            CheckStatus::Pass
        );
    }
}
