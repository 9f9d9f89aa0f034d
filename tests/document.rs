mod common;

use meshweld::document::{
    Document, ElementKind, Input, OffsetInput, Param, Semantic, Source, SourceArray,
};

use common::{geometry, node};

#[test]
fn duplicate_ids_resolve_to_first() {
    let mut doc = Document::new();
    let a = geometry(&mut doc, "shape", &[[0.0; 3]]);
    let lib = doc.parent(a.geometry).unwrap();
    let b = doc.add_geometry(lib, "shape", Default::default());
    assert_ne!(a.geometry, b);
    assert_eq!(doc.resolve_uri("#shape"), Some(a.geometry));
    assert_eq!(doc.resolve_uri("shape"), Some(a.geometry));
    assert_eq!(doc.resolve_uri("#nothing"), None);
}

/// Sources are looked up among the siblings of the input's owner when the id isn't unique.
#[test]
fn input_source_falls_back_to_scope() {
    let mut doc = Document::new();
    let first = geometry(&mut doc, "first", &[[0.0; 3]]);
    let second = geometry(&mut doc, "second", &[[1.0; 3]]);
    let shared = Source::from_floats(vec![0.5, 0.5], &["S", "T"]);
    let in_first = doc.add_source(first.mesh, "uv", shared.clone());
    let in_second = doc.add_source(second.mesh, "uv", shared);

    let input = OffsetInput::new("TEXCOORD", "#uv", 1);
    assert_eq!(doc.find_input_source(first.mesh, &input), Some(in_first));
    assert_eq!(doc.find_input_source(second.mesh, &input), Some(in_second));

    // deeper descendants of the scope aren't searched
    let nested = doc.insert(second.mesh, None, ElementKind::Other("extra".into()));
    doc.add_source(nested, "deep", Source::from_floats(vec![0.0], &["X"]));
    let deep = Input::new("POSITION", "#deep");
    assert_eq!(doc.find_input_source(second.mesh, &deep), None);
}

#[test]
fn resolve_node_paths() {
    let mut doc = Document::new();
    let armature = node(&mut doc, "Armature");
    let hip = doc.add_node(armature, Some("hip-node"), "Hip", Some("hip"));
    let knee = doc.add_node(hip, None, "Knee", Some("knee"));
    let foot = doc.add_node(knee, None, "Foot", Some("foot"));

    assert_eq!(doc.resolve_node(None, "hip"), Some(hip));
    assert_eq!(doc.resolve_node(None, "hip-node"), Some(hip));
    assert_eq!(doc.resolve_node(None, "Knee"), Some(knee));
    assert_eq!(doc.resolve_node(None, "hip/knee/foot"), Some(foot));
    assert_eq!(doc.resolve_node(Some(knee), "hip"), None);
    assert_eq!(doc.resolve_node(Some(knee), "./foot"), Some(foot));
    assert_eq!(doc.resolve_node(None, "missing"), None);
}

#[test]
fn resolve_node_rejects_other_elements() {
    let mut doc = Document::new();
    let g = geometry(&mut doc, "cube", &[[0.0; 3]]);
    doc.set_sid(g.mesh, "shape");
    assert_eq!(doc.resolve_node(None, "shape"), None);
}

#[test]
fn source_records() {
    let source = Source::new(
        SourceArray::Float((0..12).map(|v| v as f32).collect()),
        vec![Param::named("X"), Param::unnamed(), Param::named("Y")],
    );
    assert_eq!(source.stride(), 3);
    assert_eq!(source.count(), 4);
    assert_eq!(source.param_offset("Y"), Some(2));
    assert_eq!(source.param_offset("Z"), None);
    assert!(source.has_named_params());

    let padded = Source::from_floats(vec![0.0; 10], &["S", "T"]).with_stride(3);
    assert_eq!(padded.count(), 3);
}

#[test]
fn semantic_names() {
    assert_eq!(Semantic::from("TEXCOORD"), Semantic::Texcoord);
    assert_eq!(Semantic::from("INV_BIND_MATRIX"), Semantic::InvBindMatrix);
    assert_eq!(
        Semantic::from("BINORMAL"),
        Semantic::Other("BINORMAL".to_owned())
    );
    assert_eq!(Semantic::MorphWeight.to_string(), "MORPH_WEIGHT");
}
