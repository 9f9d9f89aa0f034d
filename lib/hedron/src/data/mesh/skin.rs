//! Bone influences of skinned meshes.

use std::ops::Range;

use crate::primitive::attribute::Transform;

/// Skin binding of a mesh.
///
/// Influences are stored as flat, parallel `(vertex, bone, weight)` arrays sorted by vertex slot,
/// so the influences of any one vertex are contiguous.
///
/// # Invariants
///
/// * `vertex_index`, `bone_index` and `weight` have the same length
/// * `vertex_index` is sorted in ascending order
/// * `bones` and `initial_transforms` have the same length
#[derive(Debug, Clone, PartialEq)]
pub struct SkinData<Bone> {
    pub vertex_index: Vec<u32>,
    pub bone_index: Vec<u32>,
    pub weight: Vec<f32>,
    /// The node driving each bone
    pub bones: Vec<Bone>,
    /// Transform of each bone at bind time, relative to the mesh
    pub initial_transforms: Vec<Transform>,
}

impl<Bone> Default for SkinData<Bone> {
    fn default() -> Self {
        Self {
            vertex_index: Vec::new(),
            bone_index: Vec::new(),
            weight: Vec::new(),
            bones: Vec::new(),
            initial_transforms: Vec::new(),
        }
    }
}

impl<Bone> SkinData<Bone> {
    /// Whether no influences have been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weight.is_empty()
    }

    /// Append an influence. Vertices must be pushed in ascending order.
    #[inline]
    pub fn push(&mut self, vertex: u32, bone: u32, weight: f32) {
        debug_assert!(self.vertex_index.last().map_or(true, |&last| last <= vertex));
        self.vertex_index.push(vertex);
        self.bone_index.push(bone);
        self.weight.push(weight);
    }

    /// The range of the influence arrays belonging to `vertex`.
    pub fn influence_range(&self, vertex: u32) -> Range<usize> {
        let start = self.vertex_index.partition_point(|&v| v < vertex);
        let end = self.vertex_index.partition_point(|&v| v <= vertex);
        start..end
    }

    /// Iterate through the `(bone, weight)` influences of `vertex`.
    pub fn influences(&self, vertex: u32) -> impl Iterator<Item = (u32, f32)> + '_ {
        let range = self.influence_range(vertex);
        self.bone_index[range.clone()]
            .iter()
            .copied()
            .zip(self.weight[range].iter().copied())
    }

    /// Iterate through each influenced vertex and the range of its influences.
    pub fn vertex_groups(&self) -> VertexGroups<'_> {
        VertexGroups {
            vertex_index: &self.vertex_index,
            pos: 0,
        }
    }
}

/// Iterator over runs of equal vertex slots in [SkinData::vertex_index].
#[derive(Debug, Clone)]
pub struct VertexGroups<'skin> {
    vertex_index: &'skin [u32],
    pos: usize,
}

impl<'skin> Iterator for VertexGroups<'skin> {
    type Item = (u32, Range<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        let vertex = *self.vertex_index.get(start)?;
        let len = self.vertex_index[start..]
            .iter()
            .take_while(|&&v| v == vertex)
            .count();
        self.pos = start + len;
        Some((vertex, start..self.pos))
    }
}

impl<'skin> std::iter::FusedIterator for VertexGroups<'skin> {}
