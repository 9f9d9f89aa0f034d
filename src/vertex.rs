//! Materialization of dense vertex arrays from the tuple table.

use hedron::{
    primitive::attribute::{Normal, Position, Rgba8, Texcoord},
    VertexArrays,
};
use nalgebra::{Matrix3, Matrix4};

use crate::{
    error::Error,
    mesh::{MeshContext, MeshGeometry},
    primitive::supported_primitives,
    streams::{MeshStreams, StreamRole},
    tuple::VertTuple,
};

/// Grow `array` to at least `len` entries.
#[inline]
pub(crate) fn ensure_len<T: Clone>(array: &mut Vec<T>, len: usize, fill: T) -> &mut Vec<T> {
    if array.len() < len {
        array.resize(len, fill);
    }
    array
}

/// Apply the texture transform, then move the origin from the top left to the bottom left.
#[inline]
fn convert_uv(uv: Texcoord, transform: Option<&Matrix3<f32>>) -> Texcoord {
    let uv = transform.map_or(uv, |m| m.transform_point(&uv));
    Texcoord::new(uv.x, 1.0 - uv.y)
}

/// Streams and texture transform of the primitive batch currently being replayed.
struct BoundBatch<'doc> {
    batch: u32,
    streams: MeshStreams<'doc>,
    uv_transform: Option<Matrix3<f32>>,
}

/// Replays tuples against the streams of a geometry to fill [VertexArrays] for one time
/// sample.
pub(crate) struct VertexResolver<'r, 'cx> {
    cx: &'r mut MeshContext<'cx>,
    time: f32,
    transform: Matrix4<f32>,
}

impl<'r, 'cx> VertexResolver<'r, 'cx> {
    pub fn new(cx: &'r mut MeshContext<'cx>, time: f32, transform: Matrix4<f32>) -> Self {
        Self {
            cx,
            time,
            transform,
        }
    }

    /// Fill one frame of `out` from `geometry`, one entry per tuple.
    ///
    /// When `append` is set, every required array grows by `tuples.len()` and every tuple gets a
    /// position and texcoord, valid or not. Otherwise the last `tuples.len()` entries are
    /// overwritten, and only where the tuple's index is valid for `geometry`. Optional arrays
    /// are allocated on the first valid value.
    ///
    /// # Errors
    ///
    /// * [Error::ArrayTooShort] if not appending, and `out` holds fewer than `tuples.len()`
    ///   entries
    /// * [Error::PrimitiveMismatch] if a tuple's batch has no primitive element in `geometry`;
    ///   the tuples before it are filled
    pub fn resolve(
        &mut self,
        geometry: MeshGeometry,
        tuples: &[VertTuple],
        append: bool,
        out: &mut VertexArrays,
    ) -> Result<(), Error> {
        let doc = self.cx.doc;
        let name = doc.get(geometry.geometry).map_or("", |e| e.display_name());
        let count = tuples.len();
        if count == 0 {
            return Ok(());
        }

        let base = if append {
            let base = out.points.len();
            let total = base + count;
            out.points.resize(total, Position::origin());
            out.uvs.resize(total, Texcoord::origin());
            if !out.normals.is_empty() {
                out.normals.resize(total, Normal::zeros());
            }
            if !out.colors.is_empty() {
                out.colors.resize(total, Rgba8::default());
            }
            if !out.uv2s.is_empty() {
                out.uv2s.resize(total, Texcoord::origin());
            }
            base
        } else {
            let len = out.points.len().min(out.uvs.len());
            len.checked_sub(count).ok_or_else(|| Error::ArrayTooShort {
                geometry: name.to_owned(),
                len,
                expected: count,
            })?
        };
        let total = base + count;

        let primitives: Vec<_> = supported_primitives(doc, geometry.mesh)
            .map(|(_, prim)| prim)
            .collect();
        let double_sided = doc.geometry(geometry.geometry).is_some_and(|g| g.double_sided);
        let invert = self.cx.node.invert_meshes;

        let mut current: Option<BoundBatch> = None;
        for (i, tuple) in tuples.iter().enumerate() {
            if current.as_ref().map_or(true, |c| c.batch != tuple.batch) {
                let prim = primitives
                    .get(tuple.batch as usize)
                    .ok_or_else(|| Error::PrimitiveMismatch(name.to_owned()))?;
                let material = self.cx.material(prim.material.as_deref(), double_sided);
                current = Some(BoundBatch {
                    batch: tuple.batch,
                    streams: MeshStreams::new(doc, geometry.mesh, &prim.inputs),
                    uv_transform: material
                        .and_then(|m| self.cx.materials.texture_transform(m))
                        .map(|xform| xform.matrix_at(self.time)),
                });
            }
            let Some(bound) = current.as_ref() else {
                continue;
            };
            let streams = &bound.streams;
            let slot = base + i;

            let point = streams.valid(StreamRole::Points, tuple.indices.position);
            if append || point.is_some() {
                let mut p = point
                    .zip(streams.reader(StreamRole::Points))
                    .map_or_else(Position::origin, |(i, r)| r.point3(i));
                if invert {
                    p.z = -p.z;
                }
                out.points[slot] = self.transform.transform_point(&p);
            }

            let uv = streams.valid(StreamRole::UVs, tuple.indices.uv);
            if append || uv.is_some() {
                let value = uv
                    .zip(streams.reader(StreamRole::UVs))
                    .map_or_else(Texcoord::origin, |(i, r)| r.point2(i));
                out.uvs[slot] = convert_uv(value, bound.uv_transform.as_ref());
            }

            if let Some((i, r)) = streams
                .valid(StreamRole::Normals, tuple.indices.normal)
                .zip(streams.reader(StreamRole::Normals))
            {
                let mut n = r.vector3(i);
                if invert {
                    n.z = -n.z;
                }
                ensure_len(&mut out.normals, total, Normal::zeros())[slot] = n;
            }

            if let Some((i, r)) = streams
                .valid(StreamRole::Colors, tuple.indices.color)
                .zip(streams.reader(StreamRole::Colors))
            {
                ensure_len(&mut out.colors, total, Rgba8::default())[slot] = r.color(i);
            }

            if let Some((i, r)) = streams
                .valid(StreamRole::UV2s, tuple.indices.uv2)
                .zip(streams.reader(StreamRole::UV2s))
            {
                let value = convert_uv(r.point2(i), bound.uv_transform.as_ref());
                ensure_len(&mut out.uv2s, total, Texcoord::origin())[slot] = value;
            }
        }

        tracing::trace!(geometry = name, base, count, append, "resolved vertex data");
        Ok(())
    }
}
