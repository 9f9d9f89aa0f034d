//! Small helpers shared between the `meshweld` crates.

use num_traits::{AsPrimitive, PrimInt};

pub mod macros;

/// Trait for integer types which can index into a vertex array, such as the entries of an index
/// buffer.
pub trait ArrayIndex: PrimInt + AsPrimitive<usize> + std::fmt::Debug + 'static {
    /// The number of distinct vertex slots addressable by this type, saturating at
    /// [`usize::MAX`].
    ///
    /// A `u16` index buffer can address a window of `65536` vertices.
    #[inline]
    fn window() -> usize {
        let max: usize = Self::max_value().as_();
        max.saturating_add(1)
    }

    /// Convert a vertex slot to this index type, if it fits.
    #[inline]
    fn from_slot(slot: usize) -> Option<Self> {
        <Self as num_traits::NumCast>::from(slot)
    }
}

impl<P> ArrayIndex for P where P: PrimInt + AsPrimitive<usize> + std::fmt::Debug + 'static {}
