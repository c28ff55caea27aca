//! Scene snapshot: the production adapter behind the check engines.
//!
//! Headless Blender dumps the loaded scene's facts into this document; the
//! snapshot types then implement every capability trait the check engines
//! consume. Adjacency (edge tables, link-face lists) is derived from the face
//! list on load rather than trusted from the extractor.
//!
//! Remediation mutates the snapshot in memory and the report records the
//! before/after values; pushing those changes back into the authoring tool is
//! the extraction layer's concern.

use assetgate_checks::armature::{ArmatureContext, ArmatureObject, Bone, SkinnedMesh};
use assetgate_checks::geometry::{GeometryContext, GeometryMesh};
use assetgate_checks::pbr::{
    NormalMapData, PbrContext, PbrMaterial, PbrMesh, ShaderGraph,
};
use assetgate_checks::remediate::{
    FixableImage, FixableMesh, FixableSkinnedMesh, RemediationContext,
};
use assetgate_checks::scene::{
    OrphanCounts, SceneArmature, SceneContext, SceneImage, SceneMesh,
};
use assetgate_checks::texture::{ImageInfo, MaterialTextures, TextureContext, TextureNodeRef};
use assetgate_checks::uv::{UvContext, UvMesh, UvTriangle};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Reading the snapshot file failed.
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot is not valid JSON for this schema.
    #[error("failed to parse snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One UV layer on a mesh.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UvLayerSnapshot {
    /// Raw UV loop coordinates.
    pub loops: Vec<[f64; 2]>,
    /// UV-space triangles.
    pub triangles: Vec<UvTriangle>,
}

/// Derived adjacency for one mesh. Rebuilt from the face list, never
/// serialized.
#[derive(Debug, Clone, Default)]
pub(crate) struct Topology {
    /// Undirected edges as sorted vertex pairs.
    edges: Vec<(usize, usize)>,
    /// Faces linked to each edge.
    edge_faces: Vec<Vec<usize>>,
    /// Edge handles bounding each face, in traversal order.
    face_edges: Vec<[usize; 3]>,
    /// Linked-face count per vertex.
    vert_face_counts: Vec<usize>,
}

impl Topology {
    fn build(vertex_count: usize, faces: &[[usize; 3]]) -> Self {
        let mut edge_index: HashMap<(usize, usize), usize> = HashMap::new();
        let mut edges = Vec::new();
        let mut edge_faces: Vec<Vec<usize>> = Vec::new();
        let mut face_edges = Vec::with_capacity(faces.len());
        let mut vert_face_counts = vec![0usize; vertex_count];

        for (fi, tri) in faces.iter().enumerate() {
            let mut handles = [0usize; 3];
            for (slot, &(a, b)) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])]
                .iter()
                .enumerate()
            {
                let key = if a < b { (a, b) } else { (b, a) };
                let ei = *edge_index.entry(key).or_insert_with(|| {
                    edges.push(key);
                    edge_faces.push(Vec::new());
                    edges.len() - 1
                });
                edge_faces[ei].push(fi);
                handles[slot] = ei;
            }
            face_edges.push(handles);
            for &v in tri {
                if v < vertex_count {
                    vert_face_counts[v] += 1;
                }
            }
        }

        Self {
            edges,
            edge_faces,
            face_edges,
            vert_face_counts,
        }
    }
}

/// One mesh object in the snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSnapshot {
    /// Object name.
    pub name: String,
    /// Vertex positions.
    pub positions: Vec<[f64; 3]>,
    /// Triangulated faces as vertex index triples.
    pub faces: Vec<[usize; 3]>,
    /// Triangle count reported by the extractor; falls back to the face list
    /// length.
    pub triangle_count: Option<u64>,
    /// Material slots on this object.
    pub material_slot_count: u64,
    /// UV layers by name.
    pub uv_layers: BTreeMap<String, UvLayerSnapshot>,
    /// World-space surface area; computed from the faces when absent.
    pub world_surface_area: Option<f64>,
    /// Extra loose edges (vertex pairs not part of any face).
    pub loose_edges: Vec<(usize, usize)>,

    #[serde(skip)]
    pub(crate) topology: Topology,
}

impl MeshSnapshot {
    /// Rebuilds derived adjacency from the face list. Must run after
    /// deserialization and after any topology mutation.
    pub fn rebuild_topology(&mut self) {
        let mut topo = Topology::build(self.positions.len(), &self.faces);
        for &(a, b) in &self.loose_edges {
            let key = if a < b { (a, b) } else { (b, a) };
            topo.edges.push(key);
            topo.edge_faces.push(Vec::new());
        }
        self.topology = topo;
    }

    fn face_area_3d(&self, face: usize) -> f64 {
        let [a, b, c] = self.faces[face];
        let (p, q, r) = (self.positions[a], self.positions[b], self.positions[c]);
        let u = [q[0] - p[0], q[1] - p[1], q[2] - p[2]];
        let v = [r[0] - p[0], r[1] - p[1], r[2] - p[2]];
        let cross = [
            u[1] * v[2] - u[2] * v[1],
            u[2] * v[0] - u[0] * v[2],
            u[0] * v[1] - u[1] * v[0],
        ];
        0.5 * (cross[0] * cross[0] + cross[1] * cross[1] + cross[2] * cross[2]).sqrt()
    }

    /// Directed vertex pairs of a face's traversal.
    fn directed_edges(&self, face: usize) -> [(usize, usize); 3] {
        let [a, b, c] = self.faces[face];
        [(a, b), (b, c), (c, a)]
    }

    /// Merges vertices closer than `threshold` and remaps the face list.
    ///
    /// Clustering is grid-based: vertices landing in the same cell (or
    /// already-claimed neighbor cell) collapse to the first representative.
    fn merge_vertices(&mut self, threshold: f64) -> usize {
        if threshold <= 0.0 || self.positions.is_empty() {
            return self.positions.len();
        }

        let cell = |p: &[f64; 3]| -> (i64, i64, i64) {
            (
                (p[0] / threshold).floor() as i64,
                (p[1] / threshold).floor() as i64,
                (p[2] / threshold).floor() as i64,
            )
        };

        let mut representative: HashMap<(i64, i64, i64), usize> = HashMap::new();
        let mut remap = vec![0usize; self.positions.len()];
        let mut kept: Vec<[f64; 3]> = Vec::new();

        for (i, pos) in self.positions.iter().enumerate() {
            let key = cell(pos);
            match representative.get(&key) {
                Some(&rep) => remap[i] = rep,
                None => {
                    let rep = kept.len();
                    representative.insert(key, rep);
                    kept.push(*pos);
                    remap[i] = rep;
                }
            }
        }

        self.positions = kept;
        for face in &mut self.faces {
            for v in face.iter_mut() {
                *v = remap[*v];
            }
        }
        self.loose_edges = self
            .loose_edges
            .iter()
            .map(|&(a, b)| (remap[a], remap[b]))
            .collect();
        self.rebuild_topology();
        self.positions.len()
    }

    /// Rewinds faces to a consistent orientation per connected component.
    ///
    /// Breadth-first over manifold edges: a neighbor traversing the shared
    /// edge in the same direction as the current face gets its vertex order
    /// reversed.
    fn make_windings_consistent(&mut self) {
        let mut visited = vec![false; self.faces.len()];
        let mut queue = std::collections::VecDeque::new();

        for seed in 0..self.faces.len() {
            if visited[seed] {
                continue;
            }
            visited[seed] = true;
            queue.push_back(seed);

            while let Some(face) = queue.pop_front() {
                let handles = self.topology.face_edges[face];
                for &edge in &handles {
                    let linked = self.topology.edge_faces[edge].clone();
                    if linked.len() != 2 {
                        continue;
                    }
                    for &neighbor in &linked {
                        if neighbor == face || visited[neighbor] {
                            continue;
                        }
                        let (u, v) = self.topology.edges[edge];
                        let this_dir = self
                            .directed_edges(face)
                            .iter()
                            .any(|&(a, b)| a == u && b == v);
                        let neighbor_dir = self
                            .directed_edges(neighbor)
                            .iter()
                            .any(|&(a, b)| a == u && b == v);
                        if this_dir == neighbor_dir {
                            self.faces[neighbor].reverse();
                        }
                        visited[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }
        }
        self.rebuild_topology();
    }
}

/// One material in the snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialSnapshot {
    /// Material name.
    pub name: String,
    /// Image-texture nodes referenced by this material.
    pub texture_nodes: Vec<TextureNodeRef>,
    /// Whether the material has any shader nodes.
    pub has_nodes: bool,
    /// Whether a principled node drives the surface output.
    pub uses_principled_bsdf: bool,
    /// Whether specular/glossiness inputs are in use.
    pub uses_spec_gloss: bool,
    /// Node/link structure of the shading graph.
    pub shader_graph: Option<ShaderGraph>,
    /// Flat RGBA base-color pixels, sRGB.
    pub albedo_pixels: Option<Vec<f32>>,
    /// Flat RGBA metallic pixels, linear.
    pub metalness_pixels: Option<Vec<f32>>,
    /// Flat RGBA roughness pixels, linear.
    pub roughness_pixels: Option<Vec<f32>>,
    /// Pixel data for images feeding normal-map nodes.
    pub normal_maps: Vec<NormalMapData>,
}

/// One image data-block in the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSnapshot {
    /// Image name.
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Total bits per pixel.
    pub depth: u32,
    /// Color channels.
    pub channels: u32,
    /// Bits per channel.
    pub bit_depth: u32,
    /// Declared color-space name.
    pub colorspace: String,
}

impl Default for ImageSnapshot {
    fn default() -> Self {
        Self {
            name: String::new(),
            width: 0,
            height: 0,
            depth: 32,
            channels: 4,
            bit_depth: 8,
            colorspace: "sRGB".to_string(),
        }
    }
}

/// One armature in the snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmatureSnapshot {
    /// Object name.
    pub name: String,
    /// Bones with parent links.
    pub bones: Vec<Bone>,
}

/// One skinned mesh in the snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinnedMeshSnapshot {
    /// Object name.
    pub name: String,
    /// Per-vertex non-zero weights.
    pub vertex_weights: Vec<Vec<f32>>,
}

/// The complete scene-facts document for one asset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSnapshot {
    pub meshes: Vec<MeshSnapshot>,
    pub materials: Vec<MaterialSnapshot>,
    pub images: Vec<ImageSnapshot>,
    pub armatures: Vec<ArmatureSnapshot>,
    pub skinned_meshes: Vec<SkinnedMeshSnapshot>,
    pub orphans: OrphanCounts,
}

impl SceneSnapshot {
    /// Parses a snapshot from JSON and derives adjacency.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let mut snapshot: SceneSnapshot = serde_json::from_str(json)?;
        snapshot.finalize();
        Ok(snapshot)
    }

    /// Parses a snapshot from an already-deserialized JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SnapshotError> {
        let mut snapshot: SceneSnapshot = serde_json::from_value(value)?;
        snapshot.finalize();
        Ok(snapshot)
    }

    /// Loads a snapshot from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self, SnapshotError> {
        let json = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Rebuilds all derived data.
    pub fn finalize(&mut self) {
        for mesh in &mut self.meshes {
            mesh.rebuild_topology();
        }
    }
}

// ---------------------------------------------------------------------------
// Capability trait implementations
// ---------------------------------------------------------------------------

impl GeometryMesh for MeshSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn triangle_count(&self) -> u64 {
        self.triangle_count.unwrap_or(self.faces.len() as u64)
    }

    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn edge_count(&self) -> usize {
        self.topology.edges.len()
    }

    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn face_area(&self, face: usize) -> f64 {
        self.face_area_3d(face)
    }

    fn face_edges(&self, face: usize) -> Vec<usize> {
        self.topology.face_edges[face].to_vec()
    }

    fn edge_link_faces(&self, edge: usize) -> Vec<usize> {
        self.topology.edge_faces[edge].clone()
    }

    fn vertex_link_face_count(&self, vert: usize) -> usize {
        self.topology.vert_face_counts[vert]
    }

    fn edge_start_vertex_in_face(&self, edge: usize, face: usize) -> Option<usize> {
        let (u, v) = self.topology.edges[edge];
        self.directed_edges(face)
            .iter()
            .find(|&&(a, b)| (a == u && b == v) || (a == v && b == u))
            .map(|&(a, _)| a)
    }
}

impl UvMesh for MeshSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn uv_layer_names(&self) -> Vec<String> {
        self.uv_layers.keys().cloned().collect()
    }

    fn uv_loops(&self, layer: &str) -> Vec<[f64; 2]> {
        self.uv_layers
            .get(layer)
            .map(|l| l.loops.clone())
            .unwrap_or_default()
    }

    fn uv_triangles(&self, layer: &str) -> Vec<UvTriangle> {
        self.uv_layers
            .get(layer)
            .map(|l| l.triangles.clone())
            .unwrap_or_default()
    }

    fn world_surface_area(&self) -> f64 {
        self.world_surface_area
            .unwrap_or_else(|| (0..self.faces.len()).map(|f| self.face_area_3d(f)).sum())
    }
}

impl PbrMesh for MeshSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn material_slot_count(&self) -> u64 {
        self.material_slot_count
    }
}

impl SceneMesh for MeshSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn triangle_count(&self) -> u64 {
        GeometryMesh::triangle_count(self)
    }

    fn material_slot_count(&self) -> u64 {
        self.material_slot_count
    }
}

impl PbrMaterial for MaterialSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_nodes(&self) -> bool {
        self.has_nodes
    }

    fn uses_principled_bsdf(&self) -> bool {
        self.uses_principled_bsdf
    }

    fn uses_spec_gloss(&self) -> bool {
        self.uses_spec_gloss
    }

    fn shader_graph(&self) -> Option<ShaderGraph> {
        self.shader_graph.clone()
    }

    fn albedo_pixels(&self) -> Option<Vec<f32>> {
        self.albedo_pixels.clone()
    }

    fn metalness_pixels(&self) -> Option<Vec<f32>> {
        self.metalness_pixels.clone()
    }

    fn roughness_pixels(&self) -> Option<Vec<f32>> {
        self.roughness_pixels.clone()
    }

    fn normal_maps(&self) -> Vec<NormalMapData> {
        self.normal_maps.clone()
    }
}

impl ArmatureObject for ArmatureSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn bones(&self) -> Vec<Bone> {
        self.bones.clone()
    }
}

impl SceneArmature for ArmatureSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn bone_count(&self) -> u64 {
        self.bones.len() as u64
    }
}

impl SkinnedMesh for SkinnedMeshSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn vertex_weights(&self) -> Vec<Vec<f32>> {
        self.vertex_weights.clone()
    }
}

impl GeometryContext for SceneSnapshot {
    fn mesh_objects(&self) -> Vec<&dyn GeometryMesh> {
        self.meshes.iter().map(|m| m as &dyn GeometryMesh).collect()
    }
}

impl UvContext for SceneSnapshot {
    fn mesh_objects(&self) -> Vec<&dyn UvMesh> {
        self.meshes.iter().map(|m| m as &dyn UvMesh).collect()
    }
}

impl TextureContext for SceneSnapshot {
    fn materials(&self) -> Vec<MaterialTextures> {
        self.materials
            .iter()
            .map(|m| MaterialTextures {
                name: m.name.clone(),
                nodes: m.texture_nodes.clone(),
            })
            .collect()
    }

    fn images(&self) -> Vec<ImageInfo> {
        self.images
            .iter()
            .map(|img| ImageInfo {
                name: img.name.clone(),
                width: img.width,
                height: img.height,
                depth: img.depth,
                colorspace: img.colorspace.clone(),
            })
            .collect()
    }
}

impl PbrContext for SceneSnapshot {
    fn mesh_objects(&self) -> Vec<&dyn PbrMesh> {
        self.meshes.iter().map(|m| m as &dyn PbrMesh).collect()
    }

    fn materials(&self) -> Vec<&dyn PbrMaterial> {
        self.materials.iter().map(|m| m as &dyn PbrMaterial).collect()
    }
}

impl ArmatureContext for SceneSnapshot {
    fn armature_objects(&self) -> Vec<&dyn ArmatureObject> {
        self.armatures
            .iter()
            .map(|a| a as &dyn ArmatureObject)
            .collect()
    }

    fn skinned_meshes(&self) -> Vec<&dyn SkinnedMesh> {
        self.skinned_meshes
            .iter()
            .map(|m| m as &dyn SkinnedMesh)
            .collect()
    }
}

impl SceneContext for SceneSnapshot {
    fn mesh_objects(&self) -> Vec<&dyn SceneMesh> {
        self.meshes.iter().map(|m| m as &dyn SceneMesh).collect()
    }

    fn armature_objects(&self) -> Vec<&dyn SceneArmature> {
        self.armatures
            .iter()
            .map(|a| a as &dyn SceneArmature)
            .collect()
    }

    fn unique_images(&self) -> Vec<SceneImage> {
        self.images
            .iter()
            .map(|img| SceneImage {
                width: img.width,
                height: img.height,
                channels: img.channels,
                bit_depth: img.bit_depth,
            })
            .collect()
    }

    fn orphan_counts(&self) -> OrphanCounts {
        self.orphans
    }
}

// ---------------------------------------------------------------------------
// Remediation mutation entry points
// ---------------------------------------------------------------------------

impl FixableMesh for MeshSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn recalculate_normals(&mut self) {
        self.make_windings_consistent();
    }

    fn merge_by_distance(&mut self, threshold: f64) -> usize {
        self.merge_vertices(threshold)
    }
}

impl FixableImage for ImageSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn scale(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

impl FixableSkinnedMesh for SkinnedMeshSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_influences(&self) -> usize {
        self.vertex_weights
            .iter()
            .map(|w| w.len())
            .max()
            .unwrap_or(0)
    }
}

impl RemediationContext for SceneSnapshot {
    fn mesh_objects(&mut self) -> Vec<&mut dyn FixableMesh> {
        self.meshes
            .iter_mut()
            .map(|m| m as &mut dyn FixableMesh)
            .collect()
    }

    fn images(&mut self) -> Vec<&mut dyn FixableImage> {
        self.images
            .iter_mut()
            .map(|i| i as &mut dyn FixableImage)
            .collect()
    }

    fn skinned_meshes(&self) -> Vec<&dyn FixableSkinnedMesh> {
        self.skinned_meshes
            .iter()
            .map(|m| m as &dyn FixableSkinnedMesh)
            .collect()
    }

    fn limit_bone_weights(&mut self, limit: usize) {
        for mesh in &mut self.skinned_meshes {
            for weights in &mut mesh.vertex_weights {
                if weights.len() > limit {
                    weights.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
                    weights.truncate(limit);
                }
                let total: f32 = weights.iter().sum();
                if total > 0.0 {
                    for w in weights.iter_mut() {
                        *w /= total;
                    }
                }
            }
        }
    }
}
