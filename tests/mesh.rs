mod common;

use meshweld::{
    anim::{AnimatedFloat, Track},
    document::{
        BindMaterial, Document, ElementKind, Geometry, InstanceController, InstanceGeometry,
        Primitive,
    },
    material::{EffectExt, MaterialList},
    scene::AppNode,
    AppMesh, Error, ImportOptions, MeshGeometry, MeshInstance,
};
use nalgebra::Matrix4;

use common::{geometry, geometry_with, node, triangles, vertex_input};

fn named(doc: &mut Document, parent: &str, name: &str) -> AppNode {
    let parent = node(doc, parent);
    let el = doc.add_node(parent, None, name, None);
    AppNode::new(doc, el).with_parent(AppNode::new(doc, parent))
}

fn instance(url: &str) -> MeshInstance {
    MeshInstance::Geometry(InstanceGeometry {
        url: url.to_owned(),
        bind_material: None,
    })
}

#[test]
fn helper_nodes_take_parent_name() {
    let mut doc = Document::new();
    let options = ImportOptions::default().with_fixed_size(32);

    let plain = AppMesh::new(named(&mut doc, "Body", "Torso"), instance("#x"), options);
    assert_eq!(plain.name(false), "Torso");
    assert_eq!(plain.name(true), "Torso 32");

    let null = AppMesh::new(named(&mut doc, "Body", "null"), instance("#x"), options);
    assert_eq!(null.name(false), "Body");

    let pivot = AppMesh::new(named(&mut doc, "Head", "HeadPIVOT"), instance("#x"), options);
    assert_eq!(pivot.name(true), "Head 32");

    let no_size = AppMesh::new(
        named(&mut doc, "Body", "Torso"),
        instance("#x"),
        ImportOptions::default(),
    );
    assert_eq!(no_size.name(true), "Torso");
}

#[test]
fn visibility_scales_with_parent() {
    let mut doc = Document::new();
    let parent_el = node(&mut doc, "Parent");
    let el = doc.add_node(parent_el, None, "Child", None);
    let blink = Track::new([(0.0, 1.0), (1.0, 0.0)]);
    let node = AppNode::new(&doc, el)
        .with_visibility(AnimatedFloat::constant(0.5))
        .with_parent(
            AppNode::new(&doc, parent_el).with_visibility(AnimatedFloat::with_track(1.0, blink)),
        );
    let mesh = AppMesh::new(node, instance("#x"), ImportOptions::default());

    assert_eq!(mesh.vis_value(0.0), 0.5);
    assert_eq!(mesh.vis_value(0.5), 0.25);
    assert!(mesh.animates_vis(0.0, 1.0));
    assert!(!mesh.animates_vis(2.0, 3.0));
}

#[test]
fn transform_follows_node() {
    let mut doc = Document::new();
    let el = node(&mut doc, "Mover");
    let start = Matrix4::identity();
    let end = Matrix4::new_translation(&nalgebra::Vector3::new(2.0, 0.0, 0.0));
    let node = AppNode::new(&doc, el).with_transform(meshweld::anim::Animated::with_track(
        start,
        Track::new([(0.0, start), (1.0, end)]),
    ));
    let mesh = AppMesh::new(node, instance("#x"), ImportOptions::default());
    assert_eq!(mesh.mesh_transform(0.5)[(0, 3)], 1.0);
    assert_eq!(mesh.mesh_transform(4.0), end);
}

#[test]
fn unsupported_geometry() {
    let mut doc = Document::new();
    let lib = doc.add_library("library_geometries");
    let spline = doc.add_geometry(lib, "curve", Geometry::default());
    doc.insert(spline, None, ElementKind::Other("spline".to_owned()));

    assert_eq!(
        MeshGeometry::resolve(&doc, spline, "Curve"),
        Err(Error::UnsupportedGeometry {
            element: "spline".to_owned(),
            mesh: "Curve".to_owned(),
        })
    );

    let el = node(&mut doc, "Curve");
    let mut mesh = AppMesh::new(AppNode::new(&doc, el), instance("#curve"), Default::default());
    let mut materials = MaterialList::new();
    let err = mesh
        .lock_mesh(&doc, &mut materials, 0.0, &Matrix4::identity())
        .unwrap_err();
    assert!(!err.is_hard());
    assert_eq!(mesh.diagnostics().errors(), [err]);
    assert_eq!(mesh.frame_count(), 0);
}

#[test]
fn missing_references() {
    let mut doc = Document::new();
    let el = node(&mut doc, "Ghost");
    let mut materials = MaterialList::new();

    let mut mesh = AppMesh::new(AppNode::new(&doc, el), instance("#nowhere"), Default::default());
    assert_eq!(
        mesh.lock_mesh(&doc, &mut materials, 0.0, &Matrix4::identity()),
        Err(Error::MissingGeometry("Ghost".to_owned()))
    );

    let controller = MeshInstance::Controller(InstanceController {
        url: "#nowhere".to_owned(),
        skeletons: Vec::new(),
        bind_material: None,
    });
    let mut mesh = AppMesh::new(AppNode::new(&doc, el), controller, Default::default());
    assert_eq!(
        mesh.lock_mesh(&doc, &mut materials, 0.0, &Matrix4::identity()),
        Err(Error::MissingController("Ghost".to_owned()))
    );
    assert!(mesh.get_morph(&doc).is_none());
}

/// Materials are shared across meshes by element, and symbols a `<bind_material>` doesn't
/// mention get no material.
#[test]
fn material_binding() {
    let mut doc = Document::new();
    let g = geometry_with(
        &mut doc,
        "hull",
        &[[0.0; 3], [1.0; 3], [2.0; 3]],
        Geometry { double_sided: true },
    );
    for symbol in ["paint", "glass", "paint"] {
        doc.add_primitive(
            g.mesh,
            Primitive::triangles(vec![0, 1, 2])
                .with_material(symbol)
                .with_input(vertex_input("hull", 0)),
        );
    }
    let lib = doc.add_library("library_materials");
    doc.add_material(lib, "red", "Red", Some(EffectExt::default()));

    let mut materials = MaterialList::new();
    let bound = || InstanceGeometry {
        url: "#hull".to_owned(),
        bind_material: Some(BindMaterial::default().bind("paint", "#red")),
    };
    let mut meshes = Vec::new();
    for name in ["Ship", "Boat"] {
        let el = node(&mut doc, name);
        let mut mesh = AppMesh::new(
            AppNode::new(&doc, el),
            MeshInstance::Geometry(bound()),
            Default::default(),
        );
        mesh.lock_mesh(&doc, &mut materials, 0.0, &Matrix4::identity())
            .unwrap();
        meshes.push(mesh);
    }

    assert_eq!(materials.len(), 1);
    let red = &materials.iter().next().unwrap();
    assert_eq!(red.name, "Red");
    assert_eq!(red.element, doc.by_id("red"));
    assert_eq!(red.effect.as_ref().map(|e| e.double_sided), Some(true));
    for mesh in &meshes {
        let materials: Vec<_> = mesh.data().primitives.iter().map(|p| p.material).collect();
        assert_eq!(materials, [Some(0), None, Some(0)]);
    }
}

#[test]
fn unresolved_material_target() {
    let mut doc = Document::new();
    let g = geometry(&mut doc, "hull", &[[0.0; 3], [1.0; 3], [2.0; 3]]);
    doc.add_primitive(
        g.mesh,
        Primitive::triangles(vec![0, 1, 2])
            .with_material("paint")
            .with_input(vertex_input("hull", 0)),
    );
    triangles(&mut doc, "hull", g, vec![0, 1, 2]);
    let el = node(&mut doc, "Ship");
    let instance = MeshInstance::Geometry(InstanceGeometry {
        url: "#hull".to_owned(),
        bind_material: Some(BindMaterial::default().bind("paint", "#missing")),
    });
    let mut materials = MaterialList::new();
    let mut mesh = AppMesh::new(AppNode::new(&doc, el), instance, Default::default());
    mesh.lock_mesh(&doc, &mut materials, 0.0, &Matrix4::identity())
        .unwrap();

    assert_eq!(materials.len(), 1);
    assert_eq!(materials.get(0).map(|m| m.name.as_str()), Some("paint"));
    assert_eq!(materials.get(0).and_then(|m| m.element), None);
    let tagged: Vec<_> = mesh.data().primitives.iter().map(|p| p.material).collect();
    assert_eq!(tagged, [Some(0), None]);
}
