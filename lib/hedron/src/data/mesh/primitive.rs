use std::ops::Range;

pub mod attribute;

/// The method by which the indices of a [DrawPrimitive] are interpreted as topological
/// primitives.
///
/// Imported geometry is always triangulated before it reaches this crate, so only indexed
/// triangle lists are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    #[default]
    Triangles,
}

/// One contiguous, single-material range of an index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawPrimitive {
    /// Offset of the first index of this primitive within the index buffer
    pub start: u32,
    /// Number of indices
    pub count: u32,
    /// Material with which this primitive is rendered
    pub material: Option<u32>,
    pub mode: Mode,
}

impl DrawPrimitive {
    #[inline]
    pub fn triangles(start: u32, count: u32, material: Option<u32>) -> Self {
        Self {
            start,
            count,
            material,
            mode: Mode::Triangles,
        }
    }

    /// The range of the index buffer covered by this primitive.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start as usize..(self.start + self.count) as usize
    }

    #[inline]
    pub fn triangle_count(&self) -> u32 {
        self.count / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
