mod common;

use hedron::primitive::attribute::{Normal, Rgba8, Texcoord};
use meshweld::{
    anim::{Animated, AnimatedFloat, Track},
    document::{BindMaterial, Document, InstanceGeometry, OffsetInput, Primitive, Source},
    material::{EffectExt, MaterialList, TextureTransform},
    AppMesh, ImportOptions, MeshInstance,
};
use nalgebra::{Matrix4, Point3, Vector3};

use common::{assert_close, geometry, geometry_instance, lock, node, vertex_input};

/// A single triangle with texcoords `(0.3, 0.2)` on every corner.
fn uv_triangle(doc: &mut Document) {
    let g = geometry(
        doc,
        "tri",
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 3.0]],
    );
    doc.add_source(
        g.mesh,
        "tri-uv",
        Source::from_floats(vec![0.3, 0.2], &["S", "T"]),
    );
    doc.add_primitive(
        g.mesh,
        Primitive::triangles(vec![0, 0, 1, 0, 2, 0])
            .with_material("surface")
            .with_input(vertex_input("tri", 0))
            .with_input(OffsetInput::new("TEXCOORD", "#tri-uv", 1).with_set(0)),
    );
}

#[test]
fn texcoords_flip_to_bottom_left() {
    let mut doc = Document::new();
    uv_triangle(&mut doc);
    let (node, instance) = geometry_instance(&mut doc, "#tri");
    let mesh = lock(&doc, node, instance, 0.0);
    let uvs = &mesh.data().vertices.uvs;
    assert_eq!(uvs.len(), 3);
    for uv in uvs {
        assert_close(uv.x, 0.3);
        assert_close(uv.y, 0.8);
    }
    assert!(mesh.data().vertices.uv2s.is_empty());
}

#[test]
fn positions_mirror_then_transform() {
    let mut doc = Document::new();
    uv_triangle(&mut doc);
    let (node, instance) = geometry_instance(&mut doc, "#tri");
    let mut materials = MaterialList::new();
    let mut mesh = AppMesh::new(
        node.with_invert_meshes(true),
        instance,
        ImportOptions::default(),
    );
    let offset = Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0));
    mesh.lock_mesh(&doc, &mut materials, 0.0, &offset).unwrap();

    let points = &mesh.data().vertices.points;
    // inverted meshes keep their source winding
    assert_eq!(mesh.data().indices, [0, 1, 2]);
    assert_eq!(points[2], Point3::new(10.0, 1.0, -3.0));
    assert_eq!(points[0], Point3::new(10.0, 0.0, 0.0));
}

#[test]
fn frames_append() {
    let mut doc = Document::new();
    uv_triangle(&mut doc);
    let (node, instance) = geometry_instance(&mut doc, "#tri");
    let mut materials = MaterialList::new();
    let mut mesh = AppMesh::new(node, instance, ImportOptions::default());
    for t in [0.0, 1.0, 2.0] {
        mesh.lock_mesh(&doc, &mut materials, t, &Matrix4::identity())
            .unwrap();
    }
    assert_eq!(mesh.frame_count(), 3);
    assert_eq!(mesh.data().vertices.len(), 9);
    assert_eq!(mesh.data().vertices.uvs.len(), 9);
    // primitives are only built once
    assert_eq!(mesh.data().indices.len(), 3);
    assert_eq!(materials.len(), 1);
}

#[test]
fn optional_arrays_allocate_on_first_value() {
    let mut doc = Document::new();
    let g = geometry(&mut doc, "two", &[[0.0; 3], [1.0; 3], [2.0; 3]]);
    doc.add_source(
        g.mesh,
        "two-normals",
        Source::from_floats(vec![0.0, 1.0, 0.0], &["X", "Y", "Z"]),
    );
    doc.add_source(
        g.mesh,
        "two-colors",
        Source::from_floats(vec![1.0, 0.0, 0.0], &["R", "G", "B"]),
    );
    doc.add_primitive(
        g.mesh,
        Primitive::triangles(vec![0, 1, 2]).with_input(vertex_input("two", 0)),
    );
    doc.add_primitive(
        g.mesh,
        Primitive::triangles(vec![0, 0, 0, 1, 0, 0, 2, 0, 5])
            .with_input(vertex_input("two", 0))
            .with_input(OffsetInput::new("NORMAL", "#two-normals", 1))
            .with_input(OffsetInput::new("COLOR", "#two-colors", 2)),
    );
    let (node, instance) = geometry_instance(&mut doc, "#two");
    let mesh = lock(&doc, node, instance, 0.0);

    let vertices = &mesh.data().vertices;
    assert_eq!(vertices.len(), 6);
    assert_eq!(vertices.normals.len(), 6);
    assert_eq!(vertices.normals[0], Normal::zeros());
    assert_eq!(vertices.normals[5], Normal::new(0.0, 1.0, 0.0));
    assert_eq!(vertices.colors.len(), 6);
    assert_eq!(vertices.colors[3], Rgba8::new(255, 0, 0, 255));
    // an out-of-range color index leaves the default
    assert_eq!(vertices.colors[1], Rgba8::default());
    assert!(mesh.data().validate().is_ok());
}

#[test]
fn texture_transform_before_flip() {
    let mut doc = Document::new();
    uv_triangle(&mut doc);
    let lib = doc.add_library("library_materials");
    let transform = TextureTransform {
        offset_u: AnimatedFloat::with_track(0.0, Track::new([(0.0, 0.0), (1.0, 0.5)])),
        repeat_v: AnimatedFloat::constant(2.0),
        ..Default::default()
    };
    doc.add_material(
        lib,
        "checker",
        "Checker",
        Some(EffectExt {
            double_sided: false,
            texture_transform: Some(transform),
        }),
    );
    let el = node(&mut doc, "Object");
    let instance = MeshInstance::Geometry(InstanceGeometry {
        url: "#tri".to_owned(),
        bind_material: Some(BindMaterial::default().bind("surface", "#checker")),
    });
    let mut materials = MaterialList::new();
    let mut mesh = AppMesh::new(
        meshweld::scene::AppNode::new(&doc, el),
        instance,
        ImportOptions::default(),
    );
    mesh.lock_mesh(&doc, &mut materials, 1.0, &Matrix4::identity())
        .unwrap();

    let uv = mesh.data().vertices.uvs[0];
    assert_close(uv.x, 0.8);
    assert_close(uv.y, 1.0 - 0.4);
    assert!(mesh.animates_mat_frame(&doc, &materials, 0.0, 1.0));
    assert!(!mesh.animates_mat_frame(&doc, &materials, 2.0, 3.0));
    assert_eq!(materials.get(0).map(|m| m.name.as_str()), Some("Checker"));
}

#[test]
fn rotation_in_degrees() {
    let transform = TextureTransform {
        rotate_uv: Animated::constant(90.0),
        ..Default::default()
    };
    let uv = transform.apply(Texcoord::new(1.0, 0.0), 0.0);
    assert_close(uv.x, 0.0);
    assert_close(uv.y, 1.0);
}
