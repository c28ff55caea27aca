//! Pipeline orchestration.
//!
//! Runs the six Stage-1 check engines in a fixed order over one scene
//! snapshot, hands the complete set of results to the remediation engine, and
//! assembles the final report. Remediation only runs once every Stage-1
//! result is finalized.

use crate::snapshot::SceneSnapshot;
use assetgate_checks::armature::check_armature;
use assetgate_checks::geometry::check_geometry;
use assetgate_checks::pbr::check_pbr;
use assetgate_checks::remediate::run_remediation;
use assetgate_checks::scene::check_scene;
use assetgate_checks::texture::check_textures;
use assetgate_checks::uv::check_uvs;
use assetgate_checks::QaPolicy;
use assetgate_report::{
    AssetMetadata, PerformanceEstimates, QaReport, ReportBuilder, StageResult,
};

/// Stage results plus derived performance metrics for one run.
#[derive(Debug, Clone)]
pub struct QaRunOutcome {
    /// All stage results in pipeline order, remediation last.
    pub stages: Vec<StageResult>,
    /// Performance estimates from the scene stage.
    pub performance: PerformanceEstimates,
}

/// Runs Stage-1 checks and remediation over a snapshot.
pub fn run_checks(snapshot: &mut SceneSnapshot, policy: &QaPolicy) -> QaRunOutcome {
    let geometry = check_geometry(snapshot, &policy.geometry);
    let uv = check_uvs(snapshot, &policy.uv);
    let texture = check_textures(snapshot, &policy.texture);
    let pbr = check_pbr(snapshot, &policy.pbr);
    let armature = check_armature(snapshot, &policy.armature);
    let (scene, performance) = check_scene(snapshot, &policy.scene);

    let stage1 = vec![geometry, uv, texture, pbr, armature, scene];
    let remediation = run_remediation(snapshot, &stage1, &policy.remediation);

    let mut stages = stage1;
    stages.push(remediation);

    QaRunOutcome {
        stages,
        performance,
    }
}

/// Runs the full pipeline and builds the report.
///
/// `intake_stage`, when present, leads the stage list so the report reads in
/// pipeline order.
pub fn run_qa(
    metadata: AssetMetadata,
    intake_stage: Option<StageResult>,
    snapshot: &mut SceneSnapshot,
    policy: &QaPolicy,
) -> QaReport {
    let outcome = run_checks(snapshot, policy);

    let mut builder = ReportBuilder::new(metadata);
    if let Some(stage) = intake_stage {
        builder.add_stage(stage);
    }
    for stage in outcome.stages {
        builder.add_stage(stage);
    }
    builder.set_performance(outcome.performance);
    builder.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake;
    use crate::snapshot::{ImageSnapshot, MeshSnapshot, UvLayerSnapshot};
    use assetgate_report::{CheckStatus, OverallStatus, StageStatus};
    use pretty_assertions::assert_eq;

    /// A closed tetrahedron with a clean UV layout and enough triangles to
    /// clear the env_prop budget floor.
    fn healthy_snapshot() -> SceneSnapshot {
        let mut mesh = MeshSnapshot {
            name: "Prop_Tetra".to_string(),
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.5, 1.0, 0.0],
                [0.5, 0.5, 1.0],
            ],
            faces: vec![[0, 1, 2], [0, 3, 1], [1, 3, 2], [2, 3, 0]],
            triangle_count: Some(800),
            material_slot_count: 1,
            // UV area 0.09 over 1e-4 m^2 puts texel density at 900, inside
            // the default (512, 1024) target window.
            world_surface_area: Some(0.0001),
            ..MeshSnapshot::default()
        };
        mesh.uv_layers.insert(
            "UVMap".to_string(),
            UvLayerSnapshot {
                loops: vec![[0.1, 0.1], [0.4, 0.1], [0.1, 0.4]],
                triangles: vec![
                    [[0.1, 0.1], [0.4, 0.1], [0.1, 0.4]],
                    [[0.6, 0.6], [0.9, 0.6], [0.6, 0.9]],
                ],
            },
        );
        mesh.rebuild_topology();

        SceneSnapshot {
            meshes: vec![mesh],
            images: vec![ImageSnapshot {
                name: "T_Tetra_Albedo".to_string(),
                width: 1024,
                height: 1024,
                ..ImageSnapshot::default()
            }],
            ..SceneSnapshot::default()
        }
    }

    #[test]
    fn stages_arrive_in_pipeline_order() {
        let mut snapshot = healthy_snapshot();
        let outcome = run_checks(&mut snapshot, &QaPolicy::default());
        let names: Vec<&str> = outcome.stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["geometry", "uv", "texture", "pbr", "armature", "scene", "remediation"]
        );
    }

    #[test]
    fn healthy_prop_passes_end_to_end() {
        let mut snapshot = healthy_snapshot();
        let report = run_qa(
            intake::test_metadata("env_prop"),
            None,
            &mut snapshot,
            &QaPolicy::default(),
        );

        assert_eq!(report.overall_status, OverallStatus::Pass);
        assert_eq!(report.stage("armature").unwrap().status, StageStatus::Skipped);
        let perf = report.performance.as_ref().unwrap();
        assert_eq!(perf.triangle_count, 800);
        assert_eq!(perf.draw_call_estimate, 1);
    }

    #[test]
    fn oversized_texture_is_fixed_and_flagged_outcome_is_review_free() {
        let mut snapshot = healthy_snapshot();
        snapshot.images[0].width = 4096;
        snapshot.images[0].height = 4096;

        let report = run_qa(
            intake::test_metadata("env_prop"),
            None,
            &mut snapshot,
            &QaPolicy::default(),
        );

        // resolution_limit fails the texture stage, so the overall verdict is
        // FAIL even though a resize fix was recorded.
        assert_eq!(report.overall_status, OverallStatus::Fail);
        let remediation = report.stage("remediation").unwrap();
        assert_eq!(remediation.fixes.len(), 1);
        assert_eq!(snapshot.images[0].width, 2048);
    }

    #[test]
    fn warning_only_issues_route_to_review() {
        let mut snapshot = healthy_snapshot();
        // Density far outside the default (512, 1024) target window.
        snapshot.meshes[0].world_surface_area = Some(100.0);

        let report = run_qa(
            intake::test_metadata("env_prop"),
            None,
            &mut snapshot,
            &QaPolicy::default(),
        );

        assert_eq!(report.overall_status, OverallStatus::NeedsReview);
        let uv_stage = report.stage("uv").unwrap();
        assert_eq!(uv_stage.status, StageStatus::Pass);
        assert_eq!(
            uv_stage.check("texel_density").unwrap().status,
            CheckStatus::Warning
        );
        let flags = &report.stage("remediation").unwrap().review_flags;
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].issue, "uv:texel_density");
    }

    #[test]
    fn remediation_observes_all_stage1_results() {
        let mut snapshot = healthy_snapshot();
        // Degenerate sliver face triggers the merge fix.
        snapshot.meshes[0].positions.push([2.0, 0.0, 0.0]);
        snapshot.meshes[0].positions.push([3.0, 0.0, 0.0]);
        snapshot.meshes[0].positions.push([4.0, 0.0, 0.0]);
        snapshot.meshes[0].faces.push([4, 5, 6]);
        snapshot.meshes[0].rebuild_topology();

        let report = run_qa(
            intake::test_metadata("env_prop"),
            None,
            &mut snapshot,
            &QaPolicy::default(),
        );

        let remediation = report.stage("remediation").unwrap();
        assert!(remediation
            .fixes
            .iter()
            .any(|f| f.action == assetgate_report::FixAction::MergeByDistance));
        assert_eq!(remediation.status, StageStatus::Pass);
    }
}
