//! Policy bundle for a full pipeline run.
//!
//! A `QaPolicy` carries one config per stage, loaded from a JSON document or
//! built from defaults for a given asset category. Missing fields fall back
//! to the per-stage defaults, so a policy file only has to state what it
//! changes.

use crate::armature::ArmatureConfig;
use crate::geometry::GeometryConfig;
use crate::pbr::PbrConfig;
use crate::remediate::RemediationConfig;
use crate::scene::SceneConfig;
use crate::texture::TextureConfig;
use crate::uv::UvConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a policy file.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Reading the policy file failed.
    #[error("failed to read policy file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The policy file is not valid JSON for this schema.
    #[error("failed to parse policy file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Per-stage configuration for one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QaPolicy {
    pub geometry: GeometryConfig,
    pub uv: UvConfig,
    pub texture: TextureConfig,
    pub pbr: PbrConfig,
    pub armature: ArmatureConfig,
    pub scene: SceneConfig,
    pub remediation: RemediationConfig,
}

impl QaPolicy {
    /// Builds the default policy for an asset category.
    ///
    /// Hero props get the hero texture limits; everything else keeps the
    /// standard defaults.
    pub fn for_category(category: &str) -> Self {
        let mut policy = Self::default();
        policy.geometry.category = category.to_string();
        policy.armature.category = category.to_string();
        if category == "hero_prop" {
            policy.texture.is_hero_asset = true;
            policy.remediation.hero_asset = true;
        }
        policy
    }

    /// Loads a policy from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, PolicyError> {
        let json = std::fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Serializes the policy to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, PolicyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_the_stage_configs() {
        let policy = QaPolicy::default();
        assert_eq!(policy.geometry.category, "env_prop");
        assert_eq!(policy.armature.max_bones, 75);
        assert_eq!(policy.texture.max_resolution_standard, 2048);
        assert_eq!(policy.pbr.sample_cap, 1000);
        assert!(!policy.uv.require_lightmap_uv2);
    }

    #[test]
    fn hero_prop_category_enables_hero_limits() {
        let policy = QaPolicy::for_category("hero_prop");
        assert!(policy.texture.is_hero_asset);
        assert!(policy.remediation.hero_asset);
        assert_eq!(policy.geometry.category, "hero_prop");
    }

    #[test]
    fn partial_policy_files_keep_defaults_elsewhere() {
        let json = r#"{
            "geometry": { "category": "vehicle" },
            "armature": { "max_bones": 120, "category": "vehicle" },
            "uv": { "require_lightmap_uv2": true }
        }"#;
        let policy: QaPolicy = serde_json::from_str(json).unwrap();

        assert_eq!(policy.geometry.category, "vehicle");
        assert_eq!(policy.armature.max_bones, 120);
        assert!(policy.uv.require_lightmap_uv2);
        // Untouched sections fall back to defaults.
        assert_eq!(policy.texture.max_textures_per_material, 8);
        assert_eq!(policy.remediation.max_bone_influences, 4);
        assert_eq!(
            policy
                .geometry
                .triangle_budgets
                .get("vehicle")
                .copied()
                .unwrap(),
            (10_000, 25_000)
        );
    }

    #[test]
    fn policy_round_trips_through_json() {
        let policy = QaPolicy::for_category("character");
        let json = policy.to_json_pretty().unwrap();
        let back: QaPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back.geometry.category, "character");
        assert_eq!(back.armature.category, "character");
    }

    #[test]
    fn load_json_reads_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(&path, r#"{ "texture": { "is_hero_asset": true } }"#).unwrap();

        let policy = QaPolicy::load_json(&path).unwrap();
        assert!(policy.texture.is_hero_asset);
        assert!(QaPolicy::load_json(&dir.path().join("missing.json")).is_err());
    }
}
