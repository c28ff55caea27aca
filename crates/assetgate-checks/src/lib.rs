//! assetgate check engines.
//!
//! Six Stage-1 engines inspect an asset's geometry, UV layout, textures, PBR
//! materials, armature, and scene hygiene; the remediation engine then decides
//! which failures are auto-fixable and which go to human review. Every engine
//! is a pure function over capability traits (implemented by the scene
//! snapshot in production and by in-memory doubles in tests) and a policy
//! config, returning an [`assetgate_report::StageResult`].
//!
//! # Example
//!
//! ```no_run
//! use assetgate_checks::geometry::{check_geometry, GeometryConfig, GeometryContext};
//!
//! fn run(scene: &dyn GeometryContext) {
//!     let config = GeometryConfig::default();
//!     let stage = check_geometry(scene, &config);
//!     if stage.status == assetgate_report::StageStatus::Fail {
//!         for check in &stage.checks {
//!             eprintln!("{}: {}", check.name, check.message);
//!         }
//!     }
//! }
//! ```

pub mod armature;
pub mod geometry;
pub mod pbr;
pub mod policy;
pub mod remediate;
pub mod scene;
pub mod texture;
pub mod uv;

pub use policy::{PolicyError, QaPolicy};
