//! Triangulation of primitive elements into deduplicated, indexed draw primitives.

use hedron::{
    primitive::{
        attribute::{Normal, Position, Rgba8, Texcoord},
        DrawPrimitive,
    },
    MeshData,
};

use crate::{
    document::{Document, ElementId, Primitive, PrimitiveKind},
    error::Warning,
    mesh::{MeshContext, MeshGeometry},
    streams::{MeshStreams, StreamRole},
    tuple::{CornerIndices, TupleTable, VertTuple},
};

/// Whether triangles can be read from primitive elements of this kind.
#[inline]
pub fn is_supported(kind: &PrimitiveKind) -> bool {
    !matches!(
        kind,
        PrimitiveKind::Lines { .. } | PrimitiveKind::Linestrips { .. }
    )
}

/// The supported primitive elements of `mesh`, in document order; the position of each is its
/// batch id.
pub fn supported_primitives(
    doc: &Document,
    mesh: ElementId,
) -> impl Iterator<Item = (ElementId, &Primitive)> + '_ {
    doc.primitives(mesh)
        .filter(|(_, prim)| is_supported(&prim.kind))
}

/// Corner records of every triangle of `kind`, back to back, or `None` if `kind` has no
/// triangles to offer.
///
/// Each corner record is `stride` indices long. Polygons and fans are triangulated around their
/// first corner; strips alternate winding so every triangle faces the same way.
pub fn triangle_data(kind: &PrimitiveKind, stride: usize) -> Option<Vec<u32>> {
    let stride = stride.max(1);
    let mut out = Vec::new();
    match kind {
        PrimitiveKind::Triangles { p } => {
            let len = p.len() / (stride * 3) * (stride * 3);
            out.extend_from_slice(&p[..len]);
        }
        PrimitiveKind::Polylist { vcount, p } => {
            let mut cursor = 0;
            for &count in vcount {
                let len = count as usize * stride;
                let Some(polygon) = p.get(cursor..cursor + len) else {
                    break;
                };
                fan(&mut out, polygon, stride);
                cursor += len;
            }
        }
        PrimitiveKind::Polygons { p } | PrimitiveKind::Trifans { p } => {
            for polygon in p {
                fan(&mut out, polygon, stride);
            }
        }
        PrimitiveKind::Tristrips { p } => {
            for row in p {
                strip(&mut out, row, stride);
            }
        }
        PrimitiveKind::Lines { .. } | PrimitiveKind::Linestrips { .. } => return None,
    }
    Some(out)
}

fn fan(out: &mut Vec<u32>, polygon: &[u32], stride: usize) {
    let corners: Vec<&[u32]> = polygon.chunks_exact(stride).collect();
    for pair in corners.windows(2).skip(1) {
        out.extend_from_slice(corners[0]);
        out.extend_from_slice(pair[0]);
        out.extend_from_slice(pair[1]);
    }
}

fn strip(out: &mut Vec<u32>, row: &[u32], stride: usize) {
    let corners: Vec<&[u32]> = row.chunks_exact(stride).collect();
    for (i, tri) in corners.windows(3).enumerate() {
        let (a, b) = if i % 2 == 0 { (0, 1) } else { (1, 0) };
        out.extend_from_slice(tri[a]);
        out.extend_from_slice(tri[b]);
        out.extend_from_slice(tri[2]);
    }
}

/// Read the tuple of one corner record.
fn read_tuple(streams: &MeshStreams<'_>, batch: u32, record: &[u32]) -> VertTuple {
    let mut tuple = VertTuple::empty(batch);
    tuple.indices = CornerIndices {
        position: streams.index(StreamRole::Points, record),
        normal: streams.index(StreamRole::Normals, record),
        color: streams.index(StreamRole::Colors, record),
        uv: streams.index(StreamRole::UVs, record),
        uv2: streams.index(StreamRole::UV2s, record),
    };

    let reader = |role| streams.reader(role);
    if let Some(i) = tuple.indices.position {
        tuple.point = reader(StreamRole::Points)
            .map_or_else(Position::origin, |r| r.point3(i as usize));
    }
    if let Some(i) = tuple.indices.normal {
        tuple.normal = reader(StreamRole::Normals)
            .map_or_else(Normal::zeros, |r| r.vector3(i as usize));
    }
    if let Some(i) = tuple.indices.color {
        tuple.color = reader(StreamRole::Colors)
            .map_or(Rgba8::BLACK, |r| r.color(i as usize));
    }
    if let Some(i) = tuple.indices.uv {
        tuple.uv = reader(StreamRole::UVs)
            .map_or_else(Texcoord::origin, |r| r.point2(i as usize));
    }
    if let Some(i) = tuple.indices.uv2 {
        tuple.uv2 = reader(StreamRole::UV2s)
            .map_or_else(Texcoord::origin, |r| r.point2(i as usize));
    }
    tuple
}

fn close_primitive(data: &mut MeshData, start: usize, material: Option<u32>) {
    let count = data.indices.len() - start;
    if count > 0 {
        data.primitives
            .push(DrawPrimitive::triangles(start as u32, count as u32, material));
    }
}

/// Triangulate every supported primitive element of `geometry` into `data`, registering unique
/// corners in `tuples`.
///
/// Each element yields one draw primitive, or more when its vertices cross a 16-bit index
/// window.
pub(crate) fn build_primitives(
    cx: &mut MeshContext<'_>,
    geometry: MeshGeometry,
    tuples: &mut TupleTable,
    data: &mut MeshData,
) {
    let doc = cx.doc;
    let MeshGeometry { geometry, mesh } = geometry;
    let geometry_name = doc.get(geometry).map_or("", |e| e.display_name());
    let double_sided = doc.geometry(geometry).is_some_and(|g| g.double_sided);

    for (_, prim) in doc.primitives(mesh) {
        if !is_supported(&prim.kind) {
            cx.diagnostics.warn(Warning::UnsupportedPrimitive {
                element: prim.kind.tag().to_owned(),
                geometry: geometry_name.to_owned(),
            });
        }
    }

    for (batch, (_, prim)) in supported_primitives(doc, mesh).enumerate() {
        let streams = MeshStreams::new(doc, mesh, &prim.inputs);
        let stride = streams.stride();
        let Some(corners) = triangle_data(&prim.kind, stride) else {
            continue;
        };
        if corners.len() / stride / 3 == 0 {
            continue;
        }

        let material = cx.material(prim.material.as_deref(), double_sided);
        let mut start = data.indices.len();
        for (tri, records) in corners.chunks_exact(stride * 3).enumerate() {
            if tuples.split_if_needed() {
                if tri > 0 {
                    cx.diagnostics
                        .warn(Warning::PrimitiveSplit(geometry_name.to_owned()));
                    close_primitive(data, start, material);
                }
                start = data.indices.len();
            }

            let first = data.indices.len();
            data.indices.extend([0; 3]);
            for (v, record) in records.chunks_exact(stride).enumerate() {
                let slot = tuples.insert(read_tuple(&streams, batch as u32, record));
                // source winding is counter-clockwise; flip unless the node mirrors geometry
                let at = if cx.node.invert_meshes { v } else { 2 - v };
                data.indices[first + at] = slot;
            }
        }
        close_primitive(data, start, material);
    }

    tracing::debug!(
        geometry = geometry_name,
        primitives = data.primitives.len(),
        vertices = tuples.len(),
        "built primitives"
    );
}
