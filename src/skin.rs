//! Bone influences and bind poses of skinned meshes.

use hedron::skin::SkinData;
use nalgebra::{Matrix3, Matrix4, Vector3};

use crate::{
    config::ImportOptions,
    document::{Document, ElementId},
    error::{Diagnostics, Warning},
    scene::AppNode,
    streams::{MeshStreams, StreamRole},
    tuple::VertTuple,
};

/// Where the influence records of each source vertex start, plus the end of the last one.
///
/// Vertex `i` owns records `offsets[i]..offsets[i + 1]`.
pub fn influence_offsets(vcount: &[u32]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(vcount.len() + 1);
    let mut total = 0;
    offsets.push(total);
    for &count in vcount {
        total += count as usize;
        offsets.push(total);
    }
    offsets
}

#[derive(Debug, Clone, Copy)]
struct Influence {
    bone: u32,
    weight: f32,
    /// Position in the vertex's source list
    seen: usize,
}

/// Keeps the `max` largest weights offered, preferring earlier influences among equal weights.
#[derive(Debug)]
pub struct InfluenceCap {
    max: usize,
    accepted: Vec<Influence>,
    offered: usize,
}

impl InfluenceCap {
    pub fn new(max: usize) -> Self {
        Self {
            max,
            accepted: Vec::with_capacity(max),
            offered: 0,
        }
    }

    /// Offer an influence; returns `false` if the cap was already full.
    pub fn offer(&mut self, bone: u32, weight: f32) -> bool {
        let candidate = Influence {
            bone,
            weight,
            seen: self.offered,
        };
        self.offered += 1;
        if self.accepted.len() < self.max {
            self.accepted.push(candidate);
            return true;
        }
        // smallest weight; among equals, the latest seen
        let weakest = self
            .accepted
            .iter_mut()
            .min_by(|a, b| a.weight.total_cmp(&b.weight).then(b.seen.cmp(&a.seen)));
        if let Some(weakest) = weakest {
            if candidate.weight > weakest.weight {
                *weakest = candidate;
            }
        }
        false
    }

    /// The accepted `(bone, weight)` pairs, in the order they were accepted.
    pub fn into_influences(self) -> impl Iterator<Item = (u32, f32)> {
        self.accepted.into_iter().map(|i| (i.bone, i.weight))
    }
}

/// Scale the weights of every vertex so they sum to 1; vertices whose weights sum to 0 are left
/// alone.
pub fn normalize_weights<Bone>(skin: &mut SkinData<Bone>) {
    let groups: Vec<_> = skin.vertex_groups().map(|(_, range)| range).collect();
    for range in groups {
        let weights = &mut skin.weight[range];
        let sum: f32 = weights.iter().sum();
        if sum != 0.0 {
            for w in weights {
                *w /= sum;
            }
        }
    }
}

/// The transform of a bone at bind time, relative to the mesh.
///
/// Bone scale isn't kept by scene nodes, so unless `ignore_node_scale` is set the scale of
/// `inv_bind` is divided back out. Mirrored bind poses are flipped on Z to match the correction
/// applied to mirrored node transforms.
pub fn initial_transform(
    object_offset: &Matrix4<f32>,
    inv_bind: &Matrix4<f32>,
    bind_shape: &Matrix4<f32>,
    ignore_node_scale: bool,
) -> Matrix4<f32> {
    let basis: Matrix3<f32> = inv_bind.fixed_view::<3, 3>(0, 0).into_owned();
    let mut transform = *object_offset;
    if !ignore_node_scale {
        let inv_scale = Vector3::from_fn(|c, _| {
            let scale = basis.column(c).norm();
            if scale == 0.0 {
                0.0
            } else {
                scale.recip()
            }
        });
        transform *= Matrix4::new_nonuniform_scaling(&inv_scale);
    }
    if basis.determinant() < 0.0 {
        transform *= Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, -1.0));
    }
    transform * inv_bind * bind_shape
}

/// Find a joint node by name, under each skeleton root in turn and then from the document root.
fn find_joint(doc: &Document, skeletons: &[String], name: &str) -> Option<ElementId> {
    skeletons
        .iter()
        .filter_map(|url| doc.resolve_uri(url))
        .find_map(|root| doc.resolve_node(Some(root), name))
        .or_else(|| doc.resolve_node(None, name))
}

/// What skin resolution reads from, and reports to.
pub(crate) struct SkinContext<'a> {
    pub doc: &'a Document,
    pub node: &'a AppNode,
    pub options: &'a ImportOptions,
    pub diagnostics: &'a mut Diagnostics,
}

/// Resolve the influences and bones of `skin_el` for the vertices in `tuples`.
///
/// Influences are keyed by vertex slot; bones by the nodes they resolve to.
pub(crate) fn resolve_skin(
    mut cx: SkinContext<'_>,
    skin_el: ElementId,
    skeletons: &[String],
    tuples: &[VertTuple],
    object_offset: &Matrix4<f32>,
) -> SkinData<ElementId> {
    let doc = cx.doc;
    let mut data = SkinData::default();
    let Some(skin) = doc.skin(skin_el) else {
        return data;
    };
    let weights_in = &skin.vertex_weights;

    let joints = MeshStreams::new(doc, skin_el, &skin.joints);
    let weights = MeshStreams::new(doc, skin_el, &weights_in.inputs);
    let stride = weights.stride();
    let joint_at = weights.offset(StreamRole::Joints).unwrap_or(0);
    let weight_at = weights.offset(StreamRole::Weights).unwrap_or(1);
    let weight_values = weights.reader(StreamRole::Weights);
    let offsets = influence_offsets(&weights_in.vcount);

    let max = cx.options.max_bones_per_vertex;
    for (slot, tuple) in tuples.iter().enumerate() {
        let Some(vertex) = tuple
            .indices
            .position
            .map(|v| v as usize)
            .filter(|&v| v < weights_in.vcount.len())
        else {
            continue;
        };

        let mut cap = InfluenceCap::new(max);
        for record in offsets[vertex]..offsets[vertex + 1] {
            let at = record * stride;
            let Some(&bone) = weights_in.v.get(at + joint_at) else {
                break;
            };
            let weight = weights_in
                .v
                .get(at + weight_at)
                .and_then(|&w| usize::try_from(w).ok())
                .zip(weight_values)
                .map_or(0.0, |(w, r)| r.float(w));
            let Ok(bone) = u32::try_from(bone) else {
                continue;
            };
            if weight == 0.0 {
                continue;
            }
            if !cap.offer(bone, weight) {
                cx.diagnostics.warn_once(Warning::TooManyBoneWeights(max));
            }
        }
        for (bone, weight) in cap.into_influences() {
            data.push(slot as u32, bone, weight);
        }
    }
    normalize_weights(&mut data);

    let bind_shape = skin.bind_shape_matrix.unwrap_or_else(Matrix4::identity)
        * object_offset.try_inverse().unwrap_or_else(Matrix4::identity);
    let names = joints.reader(StreamRole::Joints);
    let inv_binds = joints.reader(StreamRole::InvBindMatrices);
    for j in 0..names.map_or(0, |r| r.len()) {
        let name = names.and_then(|r| r.string(j)).unwrap_or_default();
        let node = match find_joint(doc, skeletons, name) {
            Some(node) => node,
            None => {
                cx.diagnostics.warn(Warning::MissingBone {
                    bone: name.to_owned(),
                    node: cx.node.name.clone(),
                });
                cx.node.element
            }
        };
        let inv_bind = inv_binds
            .and_then(|r| r.matrix(j))
            .unwrap_or_else(Matrix4::identity);
        data.bones.push(node);
        data.initial_transforms.push(initial_transform(
            object_offset,
            &inv_bind,
            &bind_shape,
            cx.options.ignore_node_scale,
        ));
    }

    tracing::debug!(
        skin = doc.get(skin_el).map_or("", |e| e.display_name()),
        bones = data.bones.len(),
        influences = data.weight.len(),
        "resolved skin"
    );
    data
}
