//! Document fixtures shared by the integration tests.
#![allow(dead_code)]

use meshweld::{
    document::{
        Document, ElementId, Geometry, Input, InstanceController, InstanceGeometry, OffsetInput,
        Primitive, Source, Vertices,
    },
    material::MaterialList,
    scene::AppNode,
    AppMesh, ImportOptions, MeshInstance,
};
use nalgebra::Matrix4;

/// A `<geometry>` and its `<mesh>`.
#[derive(Debug, Clone, Copy)]
pub struct Fixture {
    pub geometry: ElementId,
    pub mesh: ElementId,
}

/// Add a geometry `id` whose mesh holds the positions `points` (as `{id}-positions`), bundled
/// into `{id}-vertices`.
pub fn geometry(doc: &mut Document, id: &str, points: &[[f32; 3]]) -> Fixture {
    geometry_with(doc, id, points, Geometry::default())
}

pub fn geometry_with(
    doc: &mut Document,
    id: &str,
    points: &[[f32; 3]],
    ext: Geometry,
) -> Fixture {
    let lib = match doc.by_id("library_geometries") {
        Some(lib) => lib,
        None => doc.insert(
            doc.root(),
            Some("library_geometries"),
            meshweld::document::ElementKind::Library,
        ),
    };
    let geometry = doc.add_geometry(lib, id, ext);
    let mesh = doc.add_mesh(geometry);
    let positions = format!("{id}-positions");
    doc.add_source(
        mesh,
        &positions,
        Source::from_floats(points.iter().flatten().copied().collect(), &["X", "Y", "Z"]),
    );
    doc.add_vertices(
        mesh,
        &format!("{id}-vertices"),
        Vertices::new(vec![Input::new("POSITION", format!("#{positions}"))]),
    );
    Fixture { geometry, mesh }
}

/// The `VERTEX` input of a geometry made by [geometry], at `offset`.
pub fn vertex_input(id: &str, offset: u64) -> OffsetInput {
    OffsetInput::new("VERTEX", format!("#{id}-vertices"), offset)
}

/// Add a `<triangles>` element reading only positions.
pub fn triangles(doc: &mut Document, id: &str, fixture: Fixture, p: Vec<u32>) -> ElementId {
    doc.add_primitive(
        fixture.mesh,
        Primitive::triangles(p).with_input(vertex_input(id, 0)),
    )
}

/// Add a visual scene node.
pub fn node(doc: &mut Document, name: &str) -> ElementId {
    let scene = match doc.by_id("scene") {
        Some(scene) => scene,
        None => doc.insert(
            doc.root(),
            Some("scene"),
            meshweld::document::ElementKind::Library,
        ),
    };
    doc.add_node(scene, None, name, None)
}

pub fn geometry_instance(doc: &mut Document, url: &str) -> (AppNode, MeshInstance) {
    let el = node(doc, "Object");
    (
        AppNode::new(doc, el),
        MeshInstance::Geometry(InstanceGeometry {
            url: url.to_owned(),
            bind_material: None,
        }),
    )
}

pub fn controller_instance(doc: &mut Document, url: &str) -> (AppNode, MeshInstance) {
    let el = node(doc, "Object");
    (
        AppNode::new(doc, el),
        MeshInstance::Controller(InstanceController {
            url: url.to_owned(),
            skeletons: Vec::new(),
            bind_material: None,
        }),
    )
}

/// Convert one frame of `instance` at time `t` with an identity object offset.
pub fn lock(doc: &Document, node: AppNode, instance: MeshInstance, t: f32) -> AppMesh {
    let mut materials = MaterialList::new();
    let mut mesh = AppMesh::new(node, instance, ImportOptions::default());
    let _ = mesh.lock_mesh(doc, &mut materials, t, &Matrix4::identity());
    mesh
}

/// Assert two floats are within `1e-5` of each other.
#[track_caller]
pub fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() <= 1e-5, "{a} != {b}");
}
