//! # See Also
//!
//! * [VertexArrays]
//! * [SkinData](skin::SkinData)

mod mesh;
pub use mesh::*;

use meshweld_common::ArrayIndex;

use crate::{
    primitive::{attribute::AttributeDescriptor, DrawPrimitive},
    Error,
};

/// The converted form of a single mesh, ready to be packaged.
///
/// # Invariants
///
/// * every [DrawPrimitive] covers a range of `indices`
/// * the indices of every [DrawPrimitive] fall within a single 16-bit window of vertex slots
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub primitives: Vec<DrawPrimitive>,
    /// Global vertex slot numbers; see [MeshData::local_indices] for the packed form.
    pub indices: Vec<u32>,
    pub vertices: VertexArrays,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the slice of the index buffer covered by `prim`.
    pub fn primitive_indices(&self, prim: &DrawPrimitive) -> Result<&[u32], Error> {
        let range = prim.range();
        self.indices
            .get(range.clone())
            .ok_or(Error::PrimitiveOutOfRange {
                start: range.start,
                end: range.end,
                len: self.indices.len(),
            })
    }

    /// Rebase the indices of `prim` onto the window of `Idx::window()` vertex slots containing
    /// its smallest index, returning the window base and the rebased indices.
    ///
    /// # Errors
    ///
    /// * [Error::PrimitiveOutOfRange] if `prim` isn't covered by the index buffer
    /// * [Error::IndexWindow] if any index lies outside of the window
    pub fn local_indices<Idx: ArrayIndex>(
        &self,
        prim: &DrawPrimitive,
    ) -> Result<(usize, Vec<Idx>), Error> {
        let indices = self.primitive_indices(prim)?;
        let window = Idx::window();
        let base = match indices.iter().min() {
            Some(&min) => (min as usize / window) * window,
            None => return Ok((0, Vec::new())),
        };
        let local = indices
            .iter()
            .map(|&index| {
                (index as usize)
                    .checked_sub(base)
                    .and_then(Idx::from_slot)
                    .ok_or(Error::IndexWindow {
                        index,
                        base,
                        window,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((base, local))
    }

    /// Check that every primitive is in bounds and fits a 16-bit index buffer, and that every
    /// populated attribute array matches the position count.
    pub fn validate(&self) -> Result<(), Error> {
        for prim in &self.primitives {
            self.local_indices::<u16>(prim)?;
        }
        self.vertices.check_lengths()
    }

    /// Describe the populated vertex attributes.
    #[inline]
    pub fn layout(&self) -> Vec<AttributeDescriptor> {
        self.vertices.layout()
    }
}
