use super::*;
use assetgate_report::StageStatus;
use pretty_assertions::assert_eq;

struct MaterialFixture {
    name: String,
    has_nodes: bool,
    principled: bool,
    spec_gloss: bool,
    graph: Option<ShaderGraph>,
    albedo: Option<Vec<f32>>,
    metalness: Option<Vec<f32>>,
    roughness: Option<Vec<f32>>,
    normal_maps: Vec<NormalMapData>,
}

impl MaterialFixture {
    fn principled(name: &str) -> Self {
        Self {
            name: name.to_string(),
            has_nodes: true,
            principled: true,
            spec_gloss: false,
            graph: Some(clean_graph()),
            albedo: None,
            metalness: None,
            roughness: None,
            normal_maps: Vec::new(),
        }
    }
}

impl PbrMaterial for MaterialFixture {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_nodes(&self) -> bool {
        self.has_nodes
    }

    fn uses_principled_bsdf(&self) -> bool {
        self.principled
    }

    fn uses_spec_gloss(&self) -> bool {
        self.spec_gloss
    }

    fn shader_graph(&self) -> Option<ShaderGraph> {
        self.graph.clone()
    }

    fn albedo_pixels(&self) -> Option<Vec<f32>> {
        self.albedo.clone()
    }

    fn metalness_pixels(&self) -> Option<Vec<f32>> {
        self.metalness.clone()
    }

    fn roughness_pixels(&self) -> Option<Vec<f32>> {
        self.roughness.clone()
    }

    fn normal_maps(&self) -> Vec<NormalMapData> {
        self.normal_maps.clone()
    }
}

struct MeshFixture {
    name: String,
    slots: u64,
}

impl PbrMesh for MeshFixture {
    fn name(&self) -> &str {
        &self.name
    }

    fn material_slot_count(&self) -> u64 {
        self.slots
    }
}

struct Scene {
    meshes: Vec<MeshFixture>,
    materials: Vec<MaterialFixture>,
}

impl PbrContext for Scene {
    fn mesh_objects(&self) -> Vec<&dyn PbrMesh> {
        self.meshes.iter().map(|m| m as &dyn PbrMesh).collect()
    }

    fn materials(&self) -> Vec<&dyn PbrMaterial> {
        self.materials.iter().map(|m| m as &dyn PbrMaterial).collect()
    }
}

fn clean_graph() -> ShaderGraph {
    ShaderGraph {
        nodes: vec![
            ShaderNode {
                name: "Image Texture".to_string(),
                is_image_texture: true,
            },
            ShaderNode {
                name: "Principled BSDF".to_string(),
                is_image_texture: false,
            },
            ShaderNode {
                name: "Material Output".to_string(),
                is_image_texture: false,
            },
        ],
        links: vec![
            NodeLink {
                from_node: "Image Texture".to_string(),
                to_node: "Principled BSDF".to_string(),
            },
            NodeLink {
                from_node: "Principled BSDF".to_string(),
                to_node: "Material Output".to_string(),
            },
        ],
    }
}

/// Flat RGBA buffer where every pixel has the given RGB value.
fn solid_pixels(r: f32, g: f32, b: f32, count: usize) -> Vec<f32> {
    let mut pixels = Vec::with_capacity(count * 4);
    for _ in 0..count {
        pixels.extend_from_slice(&[r, g, b, 1.0]);
    }
    pixels
}

fn scene_with(materials: Vec<MaterialFixture>) -> Scene {
    Scene {
        meshes: vec![MeshFixture {
            name: "Prop_Crate".to_string(),
            slots: 1,
        }],
        materials,
    }
}

#[test]
fn clean_principled_material_passes_everything() {
    let mut mat = MaterialFixture::principled("M_Crate");
    mat.albedo = Some(solid_pixels(0.5, 0.5, 0.5, 64));
    mat.metalness = Some(solid_pixels(1.0, 0.0, 0.0, 64));
    mat.roughness = Some(solid_pixels(0.4, 0.0, 0.0, 64));
    mat.normal_maps = vec![NormalMapData {
        image_name: "T_Crate_Normal".to_string(),
        colorspace: "Non-Color".to_string(),
        pixels: Some(solid_pixels(0.5, 0.5, 1.0, 64)),
    }];

    let stage = check_pbr(&scene_with(vec![mat]), &PbrConfig::default());
    assert_eq!(stage.status, StageStatus::Pass);
    for check in &stage.checks {
        assert_eq!(check.status, CheckStatus::Pass, "{} should pass", check.name);
    }
}

#[test]
fn spec_gloss_material_fails_workflow() {
    let mut mat = MaterialFixture::principled("M_Legacy");
    mat.spec_gloss = true;

    let stage = check_pbr(&scene_with(vec![mat]), &PbrConfig::default());
    let check = stage.check("pbr_workflow").unwrap();
    assert_eq!(check.status, CheckStatus::Fail);
    assert_eq!(
        check.measured_value,
        Measured::from(vec!["M_Legacy".to_string()])
    );
    assert_eq!(stage.status, StageStatus::Fail);
}

#[test]
fn slot_budget_reports_worst_object() {
    let mut scene = scene_with(vec![MaterialFixture::principled("M_Crate")]);
    scene.meshes.push(MeshFixture {
        name: "Prop_Kitbash".to_string(),
        slots: 5,
    });

    let stage = check_pbr(&scene, &PbrConfig::default());
    let check = stage.check("material_slots").unwrap();
    assert_eq!(check.status, CheckStatus::Fail);
    match &check.measured_value {
        Measured::Map(map) => {
            assert_eq!(map.get("max"), Some(&Measured::Int(5)));
            assert_eq!(
                map.get("object"),
                Some(&Measured::Text("Prop_Kitbash".to_string()))
            );
        }
        other => panic!("expected map, got {other:?}"),
    }
}

#[test]
fn albedo_without_textures_passes_with_zero_samples() {
    let stage = check_pbr(
        &scene_with(vec![MaterialFixture::principled("M_Plain")]),
        &PbrConfig::default(),
    );
    let check = stage.check("albedo_range").unwrap();
    assert_eq!(check.status, CheckStatus::Pass);
    match &check.measured_value {
        Measured::Map(map) => assert_eq!(map.get("sample_count"), Some(&Measured::Int(0))),
        other => panic!("expected map, got {other:?}"),
    }
}

#[test]
fn crushed_black_albedo_warns() {
    let mut mat = MaterialFixture::principled("M_Coal");
    // sRGB 0 is far below the minimum of 30 for every sample.
    mat.albedo = Some(solid_pixels(0.0, 0.0, 0.0, 64));

    let stage = check_pbr(&scene_with(vec![mat]), &PbrConfig::default());
    let check = stage.check("albedo_range").unwrap();
    assert_eq!(check.status, CheckStatus::Warning);
    assert_eq!(stage.status, StageStatus::Pass);
}

#[test]
fn boundary_albedo_values_are_in_range() {
    let mut mat = MaterialFixture::principled("M_Edge");
    // 30/255 and 240/255 round back to exactly the inclusive limits.
    let mut pixels = solid_pixels(30.0 / 255.0, 30.0 / 255.0, 30.0 / 255.0, 32);
    pixels.extend(solid_pixels(240.0 / 255.0, 240.0 / 255.0, 240.0 / 255.0, 32));
    mat.albedo = Some(pixels);

    let stage = check_pbr(&scene_with(vec![mat]), &PbrConfig::default());
    assert_eq!(stage.check("albedo_range").unwrap().status, CheckStatus::Pass);
}

#[test]
fn gradient_metalness_warns() {
    let mut mat = MaterialFixture::principled("M_Gradient");
    mat.metalness = Some(solid_pixels(0.5, 0.0, 0.0, 64));

    let stage = check_pbr(&scene_with(vec![mat]), &PbrConfig::default());
    let check = stage.check("metalness_binary").unwrap();
    assert_eq!(check.status, CheckStatus::Warning);
    match &check.measured_value {
        Measured::Map(map) => {
            assert_eq!(map.get("fraction_gradient"), Some(&Measured::Float(1.0)));
        }
        other => panic!("expected map, got {other:?}"),
    }
}

#[test]
fn binary_metalness_passes() {
    let mut mat = MaterialFixture::principled("M_Metal");
    let mut pixels = solid_pixels(0.0, 0.0, 0.0, 32);
    pixels.extend(solid_pixels(1.0, 0.0, 0.0, 32));
    mat.metalness = Some(pixels);

    let stage = check_pbr(&scene_with(vec![mat]), &PbrConfig::default());
    assert_eq!(
        stage.check("metalness_binary").unwrap().status,
        CheckStatus::Pass
    );
}

#[test]
fn flat_zero_roughness_warns() {
    let mut mat = MaterialFixture::principled("M_Mirror");
    mat.roughness = Some(solid_pixels(0.0, 0.0, 0.0, 64));

    let stage = check_pbr(&scene_with(vec![mat]), &PbrConfig::default());
    assert_eq!(
        stage.check("roughness_range").unwrap().status,
        CheckStatus::Warning
    );
}

#[test]
fn srgb_normal_map_fails() {
    let mut mat = MaterialFixture::principled("M_Crate");
    mat.normal_maps = vec![NormalMapData {
        image_name: "T_Crate_Normal".to_string(),
        colorspace: "sRGB".to_string(),
        pixels: Some(solid_pixels(0.5, 0.5, 1.0, 16)),
    }];

    let stage = check_pbr(&scene_with(vec![mat]), &PbrConfig::default());
    let check = stage.check("normal_map").unwrap();
    assert_eq!(check.status, CheckStatus::Fail);
    assert_eq!(stage.status, StageStatus::Fail);
}

#[test]
fn non_blue_dominant_normal_map_fails() {
    let mut mat = MaterialFixture::principled("M_Crate");
    mat.normal_maps = vec![NormalMapData {
        image_name: "T_Crate_Normal".to_string(),
        colorspace: "Non-Color".to_string(),
        pixels: Some(solid_pixels(0.8, 0.5, 0.5, 16)),
    }];

    let stage = check_pbr(&scene_with(vec![mat]), &PbrConfig::default());
    let check = stage.check("normal_map").unwrap();
    assert_eq!(check.status, CheckStatus::Fail);
    match &check.measured_value {
        Measured::Map(map) => {
            assert_eq!(
                map.get("channel_violations"),
                Some(&Measured::from(vec!["T_Crate_Normal".to_string()]))
            );
        }
        other => panic!("expected map, got {other:?}"),
    }
}

#[test]
fn empty_material_is_a_node_graph_warning() {
    let mut mat = MaterialFixture::principled("M_Empty");
    mat.has_nodes = false;
    mat.principled = false;
    mat.graph = None;

    let stage = check_pbr(&scene_with(vec![mat]), &PbrConfig::default());
    let check = stage.check("node_graph").unwrap();
    assert_eq!(check.status, CheckStatus::Warning);
    // pbr_workflow fails separately for the missing principled node.
    assert_eq!(stage.status, StageStatus::Fail);
}

#[test]
fn orphan_image_node_is_a_warning() {
    let mut mat = MaterialFixture::principled("M_Crate");
    let mut graph = clean_graph();
    graph.nodes.push(ShaderNode {
        name: "Image Texture.001".to_string(),
        is_image_texture: true,
    });
    mat.graph = Some(graph);

    let stage = check_pbr(&scene_with(vec![mat]), &PbrConfig::default());
    let check = stage.check("node_graph").unwrap();
    assert_eq!(check.status, CheckStatus::Warning);
    assert_eq!(stage.status, StageStatus::Pass);
}

#[test]
fn cyclic_graph_is_a_warning_not_a_fail() {
    let mut mat = MaterialFixture::principled("M_Crate");
    let mut graph = clean_graph();
    graph.links.push(NodeLink {
        from_node: "Principled BSDF".to_string(),
        to_node: "Image Texture".to_string(),
    });
    mat.graph = Some(graph);

    let stage = check_pbr(&scene_with(vec![mat]), &PbrConfig::default());
    let check = stage.check("node_graph").unwrap();
    assert_eq!(check.status, CheckStatus::Warning);
    assert_eq!(stage.status, StageStatus::Pass);
}

#[test]
fn all_seven_checks_always_run() {
    let stage = check_pbr(&scene_with(Vec::new()), &PbrConfig::default());
    let names: Vec<&str> = stage.checks.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "pbr_workflow",
            "material_slots",
            "albedo_range",
            "metalness_binary",
            "roughness_range",
            "normal_map",
            "node_graph",
        ]
    );
}
