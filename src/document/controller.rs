use nalgebra::Matrix4;

use super::{Input, OffsetInput};

/// How morph target weights combine with the base geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MorphMethod {
    /// The base contributes `1 - Σw`
    #[default]
    Normalized,
    /// Targets are offsets added on top of the base
    Relative,
}

/// A `<morph>` controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Morph {
    /// URI of the base geometry
    pub source: String,
    pub method: MorphMethod,
    /// `MORPH_TARGET` and `MORPH_WEIGHT` inputs
    pub targets: Vec<Input>,
}

impl Morph {
    pub fn new(source: impl Into<String>, method: MorphMethod) -> Self {
        Self {
            source: source.into(),
            method,
            targets: Vec::new(),
        }
    }

    #[inline]
    pub fn with_target(mut self, input: Input) -> Self {
        self.targets.push(input);
        self
    }
}

/// The `<vertex_weights>` of a skin: per source vertex, `vcount[i]` records of `stride` indices
/// each, concatenated in `v`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexWeights {
    pub inputs: Vec<OffsetInput>,
    pub vcount: Vec<u32>,
    /// Joint indices may be negative, binding to the bind shape itself
    pub v: Vec<i64>,
}

/// A `<skin>` controller.
#[derive(Debug, Clone, PartialEq)]
pub struct Skin {
    /// URI of the skinned geometry or morph controller
    pub source: String,
    pub bind_shape_matrix: Option<Matrix4<f32>>,
    /// `JOINT` and `INV_BIND_MATRIX` inputs
    pub joints: Vec<Input>,
    pub vertex_weights: VertexWeights,
}

impl Skin {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            bind_shape_matrix: None,
            joints: Vec::new(),
            vertex_weights: VertexWeights::default(),
        }
    }
}

/// A `<bind_material>` technique: which material each binding symbol resolves to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindMaterial {
    pub instance_materials: Vec<InstanceMaterial>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceMaterial {
    pub symbol: String,
    /// URI of the `<material>`
    pub target: String,
}

impl BindMaterial {
    pub fn bind(mut self, symbol: impl Into<String>, target: impl Into<String>) -> Self {
        self.instance_materials.push(InstanceMaterial {
            symbol: symbol.into(),
            target: target.into(),
        });
        self
    }

    pub fn find(&self, symbol: &str) -> Option<&InstanceMaterial> {
        self.instance_materials.iter().find(|m| m.symbol == symbol)
    }
}

/// An `<instance_geometry>` placed under a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceGeometry {
    pub url: String,
    pub bind_material: Option<BindMaterial>,
}

/// An `<instance_controller>` placed under a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceController {
    pub url: String,
    /// URIs of the nodes under which joints are searched for
    pub skeletons: Vec<String>,
    pub bind_material: Option<BindMaterial>,
}
