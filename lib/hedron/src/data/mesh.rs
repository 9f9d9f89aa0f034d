pub mod primitive;
pub mod skin;

use crate::{
    primitive::attribute::{
        AttributeDescriptor, AttributeUsage, Normal, Position, Rgba8, Texcoord,
    },
    Error,
};

/// Dense per-vertex attribute arrays.
///
/// # Characteristics
///
/// * `points` and `uvs` are always populated for every vertex slot
/// * `normals`, `colors` and `uv2s` are either empty or the same length as `points`
/// * Arrays may hold several frames of data back to back
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexArrays {
    pub points: Vec<Position>,
    pub normals: Vec<Normal>,
    pub colors: Vec<Rgba8>,
    pub uvs: Vec<Texcoord>,
    pub uv2s: Vec<Texcoord>,
}

impl VertexArrays {
    /// Number of vertex slots held (across all frames).
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn layout(&self) -> Vec<AttributeDescriptor> {
        let mut layout = vec![AttributeDescriptor::of::<Position>(
            AttributeUsage::Position,
            self.points.len(),
        )];
        if !self.normals.is_empty() {
            layout.push(AttributeDescriptor::of::<Normal>(
                AttributeUsage::Normal,
                self.normals.len(),
            ));
        }
        if !self.colors.is_empty() {
            layout.push(AttributeDescriptor::of::<Rgba8>(
                AttributeUsage::Color(0),
                self.colors.len(),
            ));
        }
        layout.push(AttributeDescriptor::of::<Texcoord>(
            AttributeUsage::Texcoord(0),
            self.uvs.len(),
        ));
        if !self.uv2s.is_empty() {
            layout.push(AttributeDescriptor::of::<Texcoord>(
                AttributeUsage::Texcoord(1),
                self.uv2s.len(),
            ));
        }
        layout
    }

    pub(crate) fn check_lengths(&self) -> Result<(), Error> {
        let expected = self.points.len();
        for desc in self.layout() {
            let required = matches!(
                desc.usage,
                AttributeUsage::Position | AttributeUsage::Texcoord(0)
            );
            if desc.count != expected && (required || desc.count != 0) {
                return Err(Error::AttributeLength {
                    usage: desc.usage,
                    len: desc.count,
                    expected,
                });
            }
        }
        Ok(())
    }
}
