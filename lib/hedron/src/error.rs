use crate::primitive::attribute::AttributeUsage;

/// Errors related to [MeshData](crate::MeshData) consistency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("draw primitive range {start}..{end} out of bounds of index buffer (length {len})")]
    PrimitiveOutOfRange { start: usize, end: usize, len: usize },
    #[error("index {index} does not fit within the {window}-vertex window starting at {base}")]
    IndexWindow {
        index: u32,
        base: usize,
        window: usize,
    },
    #[error("attribute {usage:?} has {len} entries; expected {expected}")]
    AttributeLength {
        usage: AttributeUsage,
        len: usize,
        expected: usize,
    },
}
