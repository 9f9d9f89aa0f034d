use super::{Input, OffsetInput};

/// Extension data of a `<geometry>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Geometry {
    /// Render every material of this geometry double-sided
    pub double_sided: bool,
}

/// A `<vertices>` bundle: inputs sharing the position index of each corner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vertices {
    pub inputs: Vec<Input>,
}

impl Vertices {
    pub fn new(inputs: Vec<Input>) -> Self {
        Self { inputs }
    }
}

/// The index data of a primitive element, by element type.
///
/// Every index record holds one index per distinct input offset, so each list is a sequence of
/// `stride`-long corner records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimitiveKind {
    Triangles { p: Vec<u32> },
    /// Polygons with `vcount[i]` corners each, concatenated in `p`
    Polylist { vcount: Vec<u32>, p: Vec<u32> },
    /// One `p` row per polygon
    Polygons { p: Vec<Vec<u32>> },
    Tristrips { p: Vec<Vec<u32>> },
    Trifans { p: Vec<Vec<u32>> },
    Lines { p: Vec<u32> },
    Linestrips { p: Vec<Vec<u32>> },
}

impl PrimitiveKind {
    /// Name of the document element this kind is read from.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Triangles { .. } => "triangles",
            Self::Polylist { .. } => "polylist",
            Self::Polygons { .. } => "polygons",
            Self::Tristrips { .. } => "tristrips",
            Self::Trifans { .. } => "trifans",
            Self::Lines { .. } => "lines",
            Self::Linestrips { .. } => "linestrips",
        }
    }
}

/// A primitive element of a `<mesh>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    /// Binding symbol of the material, resolved through the instance's `<bind_material>`
    pub material: Option<String>,
    pub inputs: Vec<OffsetInput>,
}

impl Primitive {
    pub fn new(kind: PrimitiveKind) -> Self {
        Self {
            kind,
            material: None,
            inputs: Vec::new(),
        }
    }

    #[inline]
    pub fn triangles(p: Vec<u32>) -> Self {
        Self::new(PrimitiveKind::Triangles { p })
    }

    #[inline]
    pub fn polylist(vcount: Vec<u32>, p: Vec<u32>) -> Self {
        Self::new(PrimitiveKind::Polylist { vcount, p })
    }

    #[inline]
    pub fn with_material(mut self, symbol: impl Into<String>) -> Self {
        self.material = Some(symbol.into());
        self
    }

    #[inline]
    pub fn with_input(mut self, input: OffsetInput) -> Self {
        self.inputs.push(input);
        self
    }
}
