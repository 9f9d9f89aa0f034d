//! Deduplication of corner tuples into output vertex slots.

use std::collections::HashMap;

use hedron::primitive::attribute::{Normal, Position, Rgba8, Texcoord};

/// Number of vertex slots addressable by a 16-bit index.
pub const INDEX_WINDOW: usize = 1 << 16;

/// Raw per-stream indices of one corner; `None` where the primitive has no such input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CornerIndices {
    pub position: Option<u32>,
    pub normal: Option<u32>,
    pub color: Option<u32>,
    pub uv: Option<u32>,
    pub uv2: Option<u32>,
}

/// One unique output vertex: the primitive batch it belongs to, the raw indices it was read
/// through, and the values read.
///
/// Absent attributes hold sentinel values (`f32::MAX` components, opaque black for colors).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertTuple {
    /// Index of the supported primitive element within its mesh
    pub batch: u32,
    pub indices: CornerIndices,
    pub point: Position,
    pub normal: Normal,
    pub color: Rgba8,
    pub uv: Texcoord,
    pub uv2: Texcoord,
}

impl VertTuple {
    /// A tuple with every attribute absent.
    pub fn empty(batch: u32) -> Self {
        Self {
            batch,
            indices: CornerIndices::default(),
            point: Position::new(f32::MAX, f32::MAX, f32::MAX),
            normal: Normal::new(f32::MAX, f32::MAX, f32::MAX),
            color: Rgba8::BLACK,
            uv: Texcoord::new(f32::MAX, f32::MAX),
            uv2: Texcoord::new(f32::MAX, f32::MAX),
        }
    }

    fn key(&self) -> TupleKey {
        let mut values = [0; 10];
        let floats = self
            .point
            .iter()
            .chain(self.normal.iter())
            .chain(self.uv.iter())
            .chain(self.uv2.iter());
        for (bits, &value) in values.iter_mut().zip(floats) {
            *bits = float_bits(value);
        }
        TupleKey {
            batch: self.batch,
            values,
            color: self.color.0,
        }
    }
}

/// Bit pattern of `value`, with both zeroes folded together.
#[inline]
fn float_bits(value: f32) -> u32 {
    if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TupleKey {
    batch: u32,
    values: [u32; 10],
    color: [u8; 4],
}

/// Unique tuples in first-seen order.
///
/// # Characteristics
///
/// * Slots are assigned in insertion order and never reordered
/// * The lookup only spans tuples inserted since the last [TupleTable::reset_lookup], so a tuple
///   inserted on both sides of a reset occupies two slots
#[derive(Debug, Clone, Default)]
pub struct TupleTable {
    tuples: Vec<VertTuple>,
    lookup: HashMap<TupleKey, u32>,
}

impl TupleTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    #[inline]
    pub fn tuples(&self) -> &[VertTuple] {
        &self.tuples
    }

    #[inline]
    pub fn get(&self, slot: u32) -> Option<&VertTuple> {
        self.tuples.get(slot as usize)
    }

    /// The slot of `tuple`, appending it if it hasn't been seen since the last lookup reset.
    pub fn insert(&mut self, tuple: VertTuple) -> u32 {
        let next = self.tuples.len() as u32;
        let slot = *self.lookup.entry(tuple.key()).or_insert(next);
        if slot == next {
            self.tuples.push(tuple);
        }
        slot
    }

    /// Whether inserting up to three more tuples (one triangle) could cross a multiple of
    /// [INDEX_WINDOW].
    #[inline]
    pub fn needs_split(&self) -> bool {
        let len = self.tuples.len();
        len > 0 && ((len - 1) ^ (len + 2)) & INDEX_WINDOW != 0
    }

    /// Duplicate the last tuple until the table fills its current index window.
    pub fn pad_to_boundary(&mut self) {
        if let Some(&last) = self.tuples.last() {
            let padded = self.tuples.len().next_multiple_of(INDEX_WINDOW);
            self.tuples.resize(padded, last);
        }
    }

    /// Forget every tuple seen so far without removing any.
    ///
    /// Tuples inserted afterwards never merge with earlier slots; this is what keeps each
    /// index window self-contained.
    #[inline]
    pub fn reset_lookup(&mut self) {
        self.lookup.clear();
    }

    /// If [TupleTable::needs_split], pad to the window boundary and reset the lookup.
    ///
    /// Returns whether a split happened.
    pub fn split_if_needed(&mut self) -> bool {
        if !self.needs_split() {
            return false;
        }
        self.pad_to_boundary();
        self.reset_lookup();
        tracing::debug!(len = self.tuples.len(), "padded tuples to index window");
        true
    }
}
