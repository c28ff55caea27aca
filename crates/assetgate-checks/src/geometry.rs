//! Geometry checks.
//!
//! Validates mesh topology: polycount budget, non-manifold edges, degenerate
//! faces, winding consistency, loose geometry, and interior faces. All six
//! checks always run; earlier failures never short-circuit later checks.

use assetgate_report::{CheckResult, CheckStatus, StageResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Faces with an area below this are degenerate (strict `<`).
const DEGENERATE_AREA_EPS: f64 = 1e-6;

/// Budget applied when the asset category has no configured budget.
const FALLBACK_BUDGET: (u64, u64) = (500, 5_000);

fn default_budgets() -> BTreeMap<String, (u64, u64)> {
    BTreeMap::from([
        ("env_prop".to_string(), (500, 5_000)),
        ("hero_prop".to_string(), (5_000, 15_000)),
        ("character".to_string(), (15_000, 30_000)),
        ("vehicle".to_string(), (10_000, 25_000)),
    ])
}

fn default_category() -> String {
    "env_prop".to_string()
}

/// Configuration for geometry checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Asset category -> (min_tris, max_tris).
    pub triangle_budgets: BTreeMap<String, (u64, u64)>,
    /// Which budget to enforce for this asset.
    pub category: String,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            triangle_budgets: default_budgets(),
            category: default_category(),
        }
    }
}

/// A single mesh object with its topology.
///
/// Element handles are plain indices into the mesh's face/edge/vertex tables;
/// adjacency is whatever the snapshot (or test double) computed up front.
pub trait GeometryMesh {
    /// Object name.
    fn name(&self) -> &str;

    /// Total triangles in this object (after triangulation).
    fn triangle_count(&self) -> u64;

    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Number of edges.
    fn edge_count(&self) -> usize;

    /// Number of faces.
    fn face_count(&self) -> usize;

    /// Area of one face.
    fn face_area(&self, face: usize) -> f64;

    /// Edge handles bounding one face, in traversal order.
    fn face_edges(&self, face: usize) -> Vec<usize>;

    /// Face handles linked to one edge.
    fn edge_link_faces(&self, edge: usize) -> Vec<usize>;

    /// Number of faces linked to one vertex.
    fn vertex_link_face_count(&self, vert: usize) -> usize;

    /// The vertex at which `face` starts its traversal of `edge`, if the
    /// face contains that edge.
    fn edge_start_vertex_in_face(&self, edge: usize, face: usize) -> Option<usize>;

    /// An edge is manifold when linked by exactly two faces; boundary edges
    /// are not manifold.
    fn edge_is_manifold(&self, edge: usize) -> bool {
        self.edge_link_faces(edge).len() == 2
    }
}

/// Access to the mesh objects of the loaded scene.
pub trait GeometryContext {
    fn mesh_objects(&self) -> Vec<&dyn GeometryMesh>;
}

fn check_polycount(meshes: &[&dyn GeometryMesh], config: &GeometryConfig) -> CheckResult {
    let total: u64 = meshes.iter().map(|m| m.triangle_count()).sum();
    let (min_tris, max_tris) = config
        .triangle_budgets
        .get(&config.category)
        .copied()
        .unwrap_or_else(|| {
            config
                .triangle_budgets
                .get("env_prop")
                .copied()
                .unwrap_or(FALLBACK_BUDGET)
        });

    if total < min_tris || total > max_tris {
        CheckResult::new(
            "polycount_budget",
            CheckStatus::Fail,
            total,
            max_tris,
            format!(
                "Triangle count {} outside budget ({}, {}) for '{}'",
                total, min_tris, max_tris, config.category
            ),
        )
    } else {
        CheckResult::new(
            "polycount_budget",
            CheckStatus::Pass,
            total,
            max_tris,
            format!(
                "Triangle count {} within budget ({}, {})",
                total, min_tris, max_tris
            ),
        )
    }
}

fn check_non_manifold(meshes: &[&dyn GeometryMesh]) -> CheckResult {
    let count: usize = meshes
        .iter()
        .map(|m| (0..m.edge_count()).filter(|&e| !m.edge_is_manifold(e)).count())
        .sum();
    CheckResult::new(
        "non_manifold",
        if count > 0 { CheckStatus::Fail } else { CheckStatus::Pass },
        count,
        0,
        if count > 0 {
            format!("{} non-manifold edge(s) found", count)
        } else {
            "No non-manifold edges".to_string()
        },
    )
}

fn check_degenerate_faces(meshes: &[&dyn GeometryMesh]) -> CheckResult {
    let count: usize = meshes
        .iter()
        .map(|m| {
            (0..m.face_count())
                .filter(|&f| m.face_area(f) < DEGENERATE_AREA_EPS)
                .count()
        })
        .sum();
    CheckResult::new(
        "degenerate_faces",
        if count > 0 { CheckStatus::Fail } else { CheckStatus::Pass },
        count,
        0,
        if count > 0 {
            format!("{} degenerate face(s) found (area < 1e-6)", count)
        } else {
            "No degenerate faces".to_string()
        },
    )
}

/// Two faces sharing an edge are consistently wound when they traverse that
/// edge in opposite directions. Both faces starting the edge at the same
/// vertex means one of them has a flipped normal; both are flagged.
fn check_normal_consistency(meshes: &[&dyn GeometryMesh]) -> CheckResult {
    let mut flagged: BTreeSet<(usize, usize)> = BTreeSet::new();

    for (mesh_idx, mesh) in meshes.iter().enumerate() {
        for edge in 0..mesh.edge_count() {
            let link_faces = mesh.edge_link_faces(edge);
            if link_faces.len() != 2 {
                continue;
            }
            let (f1, f2) = (link_faces[0], link_faces[1]);
            let v1 = mesh.edge_start_vertex_in_face(edge, f1);
            let v2 = mesh.edge_start_vertex_in_face(edge, f2);
            if let (Some(v1), Some(v2)) = (v1, v2) {
                if v1 == v2 {
                    flagged.insert((mesh_idx, f1));
                    flagged.insert((mesh_idx, f2));
                }
            }
        }
    }

    let count = flagged.len();
    CheckResult::new(
        "normal_consistency",
        if count > 0 { CheckStatus::Fail } else { CheckStatus::Pass },
        count,
        0,
        if count > 0 {
            format!("{} face(s) with inconsistent normals", count)
        } else {
            "Face normals consistent".to_string()
        },
    )
}

fn check_loose_geometry(meshes: &[&dyn GeometryMesh]) -> CheckResult {
    let mut count = 0usize;
    for mesh in meshes {
        count += (0..mesh.vertex_count())
            .filter(|&v| mesh.vertex_link_face_count(v) == 0)
            .count();
        count += (0..mesh.edge_count())
            .filter(|&e| mesh.edge_link_faces(e).is_empty())
            .count();
    }
    CheckResult::new(
        "loose_geometry",
        if count > 0 { CheckStatus::Fail } else { CheckStatus::Pass },
        count,
        0,
        if count > 0 {
            format!("{} loose vertex/edge element(s) found", count)
        } else {
            "No loose geometry".to_string()
        },
    )
}

/// Heuristic: a face whose every bounding edge is shared by more than two
/// faces is likely enclosed inside the mesh volume.
fn check_interior_faces(meshes: &[&dyn GeometryMesh]) -> CheckResult {
    let mut count = 0usize;
    for mesh in meshes {
        for face in 0..mesh.face_count() {
            let edges = mesh.face_edges(face);
            if !edges.is_empty()
                && edges.iter().all(|&e| mesh.edge_link_faces(e).len() > 2)
            {
                count += 1;
            }
        }
    }
    CheckResult::new(
        "interior_faces",
        if count > 0 { CheckStatus::Fail } else { CheckStatus::Pass },
        count,
        0,
        if count > 0 {
            format!("{} potential interior face(s) found", count)
        } else {
            "No interior faces detected".to_string()
        },
    )
}

/// Runs all geometry checks and returns a stage result.
pub fn check_geometry(context: &dyn GeometryContext, config: &GeometryConfig) -> StageResult {
    let meshes = context.mesh_objects();

    let checks = vec![
        check_polycount(&meshes, config),
        check_non_manifold(&meshes),
        check_degenerate_faces(&meshes),
        check_normal_consistency(&meshes),
        check_loose_geometry(&meshes),
        check_interior_faces(&meshes),
    ];

    StageResult::from_checks("geometry", checks)
}
