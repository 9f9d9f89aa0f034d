mod common;

use hedron::skin::SkinData;
use meshweld::{
    document::{Document, Input, InstanceController, OffsetInput, Skin, Source, VertexWeights},
    material::MaterialList,
    scene::AppNode,
    skin::{influence_offsets, initial_transform, normalize_weights, InfluenceCap},
    AppMesh, ImportOptions, MeshInstance, Warning,
};
use nalgebra::{Matrix4, Vector3};
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

use common::{assert_close, geometry, node, triangles};

#[test]
fn offsets_prefix_sum() {
    assert_eq!(influence_offsets(&[2, 0, 3]), [0, 2, 2, 5]);
    assert_eq!(influence_offsets(&[]), [0]);
}

fn capped(max: usize, offers: &[(u32, f32)]) -> Vec<(u32, f32)> {
    let mut cap = InfluenceCap::new(max);
    for &(bone, weight) in offers {
        cap.offer(bone, weight);
    }
    let mut kept: Vec<_> = cap.into_influences().collect();
    kept.sort_by_key(|&(bone, _)| bone);
    kept
}

#[test]
fn cap_keeps_largest() {
    let offers = [(0, 0.1), (1, 0.4), (2, 0.3), (3, 0.2), (4, 0.5)];
    assert_eq!(
        capped(4, &offers),
        [(1, 0.4), (2, 0.3), (3, 0.2), (4, 0.5)]
    );
    assert_eq!(capped(1, &offers), [(4, 0.5)]);
}

#[test]
fn cap_ties_keep_first_seen() {
    assert_eq!(
        capped(2, &[(0, 0.2), (1, 0.2), (2, 0.2)]),
        [(0, 0.2), (1, 0.2)]
    );
    assert_eq!(
        capped(2, &[(0, 0.1), (1, 0.1), (2, 0.5), (3, 0.1)]),
        [(0, 0.1), (2, 0.5)]
    );
}

/// The weights kept are exactly the `max` largest offered.
#[quickcheck]
fn cap_retains_largest(weights: Vec<u8>, max: u8) -> TestResult {
    let max = (max % 6) as usize;
    if max == 0 {
        return TestResult::discard();
    }
    let mut cap = InfluenceCap::new(max);
    let mut full = false;
    for (bone, &w) in weights.iter().enumerate() {
        let accepted = cap.offer(bone as u32, w as f32);
        if accepted == full {
            return TestResult::failed();
        }
        full = bone + 1 >= max;
    }
    let mut kept: Vec<f32> = cap.into_influences().map(|(_, w)| w).collect();
    kept.sort_by(|a, b| b.total_cmp(a));
    let mut expected: Vec<f32> = weights.iter().map(|&w| w as f32).collect();
    expected.sort_by(|a, b| b.total_cmp(a));
    expected.truncate(max);
    TestResult::from_bool(kept == expected)
}

/// Every vertex with a non-zero total weight sums to 1 after normalization.
#[quickcheck]
fn normalized_sums(groups: Vec<Vec<u8>>) -> bool {
    let mut skin = SkinData::<u32>::default();
    for (vertex, weights) in groups.iter().enumerate() {
        for (bone, &w) in weights.iter().enumerate() {
            skin.push(vertex as u32, bone as u32, w as f32);
        }
    }
    normalize_weights(&mut skin);
    skin.vertex_groups().all(|(_, range)| {
        let sum: f32 = skin.weight[range].iter().sum();
        sum == 0.0 || (sum - 1.0).abs() <= 1e-5
    })
}

#[test]
fn bind_pose_scale() {
    let id = Matrix4::identity();
    assert_eq!(initial_transform(&id, &id, &id, false), id);

    let scaled = Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 4.0, 0.0));
    let descaled = initial_transform(&id, &scaled, &id, false);
    assert_eq!(
        descaled,
        Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, 0.0))
    );
    assert_eq!(initial_transform(&id, &scaled, &id, true), scaled);

    let offset = Matrix4::new_translation(&Vector3::new(0.0, 5.0, 0.0));
    let uniform = Matrix4::new_scaling(2.0);
    assert_eq!(initial_transform(&offset, &uniform, &id, false), offset);
}

#[test]
fn bind_pose_mirror() {
    let id = Matrix4::identity();
    let mirror = Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, -1.0));
    assert_eq!(initial_transform(&id, &mirror, &id, false), id);
    assert_eq!(initial_transform(&id, &mirror, &id, true), id);
}

/// A skinned triangle bound to `root` and `arm`; vertex 1 lists five influences and vertex 2 a
/// negative bone.
fn skinned(doc: &mut Document, joints: &[&str]) -> MeshInstance {
    let g = geometry(doc, "body", &[[0.0; 3], [1.0; 3], [2.0; 3]]);
    triangles(doc, "body", g, vec![0, 1, 2]);

    let armature = node(doc, "Armature");
    let root = doc.add_node(armature, Some("root-node"), "Root", Some("root"));
    doc.add_node(root, Some("arm-node"), "Arm", Some("arm"));

    let lib = doc.add_library("library_controllers");
    let ctrl = doc.add_controller(lib, "body-skin");
    let mut skin = Skin::new("#body");
    skin.joints = vec![
        Input::new("JOINT", "#body-joints"),
        Input::new("INV_BIND_MATRIX", "#body-ibm"),
    ];
    skin.vertex_weights = VertexWeights {
        inputs: vec![
            OffsetInput::new("JOINT", "#body-joints", 0),
            OffsetInput::new("WEIGHT", "#body-weights", 1),
        ],
        vcount: vec![2, 5, 2],
        v: vec![
            0, 0, 1, 1, //
            0, 2, 1, 3, 0, 4, 1, 1, 0, 5, //
            -1, 6, 1, 0,
        ],
    };
    let el = doc.add_skin(ctrl, skin);
    doc.add_source(el, "body-joints", Source::from_names(joints, "JOINT"));
    let ibm: Vec<_> = joints.iter().map(|_| Matrix4::identity()).collect();
    doc.add_source(el, "body-ibm", Source::from_matrices(&ibm, "TRANSFORM"));
    doc.add_source(
        el,
        "body-weights",
        Source::from_floats(vec![0.25, 0.75, 0.4, 0.3, 0.2, 0.05, 1.0], &["WEIGHT"]),
    );

    MeshInstance::Controller(InstanceController {
        url: "#body-skin".to_owned(),
        skeletons: vec!["#root-node".to_owned()],
        bind_material: None,
    })
}

#[test]
fn skin_influences() {
    let mut doc = Document::new();
    let instance = skinned(&mut doc, &["root", "arm"]);
    let el = node(&mut doc, "Body");
    let options = ImportOptions::default().with_max_bones_per_vertex(2);
    let mut mesh = AppMesh::new(AppNode::new(&doc, el), instance, options);
    let mut materials = MaterialList::new();
    mesh.lock_mesh(&doc, &mut materials, 0.0, &Matrix4::identity())
        .unwrap();
    assert!(mesh.is_skin(&doc));

    let skin = mesh
        .lookup_skin_data(&doc, &Matrix4::identity())
        .cloned()
        .unwrap();
    assert_eq!(
        skin.bones,
        [doc.by_id("root-node").unwrap(), doc.by_id("arm-node").unwrap()]
    );
    assert_eq!(skin.initial_transforms, [Matrix4::identity(); 2]);

    let v0: Vec<_> = skin.influences(0).collect();
    assert_eq!(v0, [(0, 0.25), (1, 0.75)]);
    // the two largest of 0.4, 0.3, 0.2, 0.75, 0.05
    let mut v1: Vec<_> = skin.influences(1).collect();
    v1.sort_by_key(|&(bone, _)| bone);
    assert_eq!(v1.len(), 2);
    assert_eq!(v1[0].0, 0);
    assert_close(v1[0].1, 0.4 / 1.15);
    assert_close(v1[1].1, 0.75 / 1.15);
    // the negative bone is dropped, the rest renormalized
    let v2: Vec<_> = skin.influences(2).collect();
    assert_eq!(v2, [(1, 1.0)]);

    let too_many = mesh
        .diagnostics()
        .warnings()
        .iter()
        .filter(|w| matches!(w, Warning::TooManyBoneWeights(2)))
        .count();
    assert_eq!(too_many, 1);
}

#[test]
fn missing_bone_falls_back_to_node() {
    let mut doc = Document::new();
    let instance = skinned(&mut doc, &["root", "tail"]);
    let el = node(&mut doc, "Body");
    let mut mesh = AppMesh::new(AppNode::new(&doc, el), instance, ImportOptions::default());
    let mut materials = MaterialList::new();
    mesh.lock_mesh(&doc, &mut materials, 0.0, &Matrix4::identity())
        .unwrap();

    let bones = mesh
        .lookup_skin_data(&doc, &Matrix4::identity())
        .map(|skin| skin.bones.clone())
        .unwrap();
    assert_eq!(bones[1], el);
    assert!(mesh
        .diagnostics()
        .warnings()
        .contains(&Warning::MissingBone {
            bone: "tail".to_owned(),
            node: "Body".to_owned(),
        }));

    // resolved once
    let warnings = mesh.diagnostics().warnings().len();
    mesh.lookup_skin_data(&doc, &Matrix4::identity());
    assert_eq!(mesh.diagnostics().warnings().len(), warnings);
}

#[test]
fn early_lookup_resolves_again_after_lock() {
    let mut doc = Document::new();
    let instance = skinned(&mut doc, &["root", "arm"]);
    let el = node(&mut doc, "Body");
    let mut mesh = AppMesh::new(AppNode::new(&doc, el), instance, ImportOptions::default());

    let early = mesh.lookup_skin_data(&doc, &Matrix4::identity()).unwrap();
    assert!(early.is_empty());

    let mut materials = MaterialList::new();
    mesh.lock_mesh(&doc, &mut materials, 0.0, &Matrix4::identity())
        .unwrap();
    let skin = mesh.lookup_skin_data(&doc, &Matrix4::identity()).unwrap();
    assert!(!skin.is_empty());
    assert_eq!(skin.influences(0).collect::<Vec<_>>(), [(0, 0.25), (1, 0.75)]);
}

#[test]
fn static_meshes_have_no_skin() {
    let mut doc = Document::new();
    let g = geometry(&mut doc, "rock", &[[0.0; 3], [1.0; 3], [2.0; 3]]);
    triangles(&mut doc, "rock", g, vec![0, 1, 2]);
    let (node, instance) = common::geometry_instance(&mut doc, "#rock");
    let mut mesh = common::lock(&doc, node, instance, 0.0);
    assert!(!mesh.is_skin(&doc));
    assert!(mesh.lookup_skin_data(&doc, &Matrix4::identity()).is_none());
}
