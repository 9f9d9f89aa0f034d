//! Conversion of multi-index scene geometry into deduplicated, 16-bit-safe triangle meshes.
//!
//! Source documents scatter vertex data across independently indexed streams, with optional
//! skinning and morph targets layered on top. An [AppMesh] turns one geometry or controller
//! instance into a [MeshData](hedron::MeshData): draw primitives, an index buffer whose every
//! primitive fits a 16-bit window, dense vertex arrays per time sample, and capped, normalized
//! bone influences.
//!
//! The document, animation, material and scene node models this crate consumes live in
//! [document], [anim], [material] and [scene].
#![cfg_attr(not(debug_assertions), warn(missing_docs))]

pub mod anim;
pub mod config;
pub mod document;
pub mod error;
pub mod material;
mod mesh;
mod morph;
pub mod primitive;
pub mod scene;
pub mod skin;
pub mod streams;
pub mod tuple;
mod vertex;

pub use config::ImportOptions;
pub use error::{Diagnostics, Error, Warning};
pub use mesh::{AppMesh, MeshGeometry, MeshInstance};

pub use hedron;
