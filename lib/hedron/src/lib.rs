//! Output data model for imported meshes: draw primitives, index buffers, dense vertex
//! attribute arrays and skin bindings, all addressed by the same 0-based vertex slot numbering.

mod data;
mod error;

pub use data::*;
pub use error::Error;
