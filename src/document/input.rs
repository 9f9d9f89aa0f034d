use std::{convert::Infallible, fmt, str::FromStr};

/// The meaning of the data an input feeds into a primitive, vertex bundle, skin, or morph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Semantic {
    Position,
    Normal,
    Color,
    Texcoord,
    Joint,
    Weight,
    InvBindMatrix,
    /// Indirection through a `<vertices>` bundle
    Vertex,
    MorphTarget,
    MorphWeight,
    Other(String),
}

impl Semantic {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Position => "POSITION",
            Self::Normal => "NORMAL",
            Self::Color => "COLOR",
            Self::Texcoord => "TEXCOORD",
            Self::Joint => "JOINT",
            Self::Weight => "WEIGHT",
            Self::InvBindMatrix => "INV_BIND_MATRIX",
            Self::Vertex => "VERTEX",
            Self::MorphTarget => "MORPH_TARGET",
            Self::MorphWeight => "MORPH_WEIGHT",
            Self::Other(s) => s,
        }
    }
}

impl FromStr for Semantic {
    type Err = Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "POSITION" => Self::Position,
            "NORMAL" => Self::Normal,
            "COLOR" => Self::Color,
            "TEXCOORD" => Self::Texcoord,
            "JOINT" => Self::Joint,
            "WEIGHT" => Self::Weight,
            "INV_BIND_MATRIX" => Self::InvBindMatrix,
            "VERTEX" => Self::Vertex,
            "MORPH_TARGET" => Self::MorphTarget,
            "MORPH_WEIGHT" => Self::MorphWeight,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl From<&str> for Semantic {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(semantic) => semantic,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Semantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything which binds a [Semantic] to a data source.
///
/// The document format has two unrelated kinds of input list (with and without per-corner
/// offsets); code which only cares about semantics, sets and offsets is generic over this trait.
pub trait InputLike {
    fn semantic(&self) -> &Semantic;
    /// URI of the referenced source, usually an `#id` fragment
    fn source(&self) -> &str;
    /// Set index, distinguishing multiple inputs of the same semantic
    fn set(&self) -> Option<u64> {
        None
    }
    /// Which index of each corner record this input reads
    fn offset(&self) -> Option<u64> {
        None
    }
}

/// An input without an offset, as found in `<vertices>`, `<joints>` and `<targets>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub semantic: Semantic,
    pub source: String,
}

impl Input {
    pub fn new(semantic: impl Into<Semantic>, source: impl Into<String>) -> Self {
        Self {
            semantic: semantic.into(),
            source: source.into(),
        }
    }
}

impl InputLike for Input {
    #[inline]
    fn semantic(&self) -> &Semantic {
        &self.semantic
    }
    #[inline]
    fn source(&self) -> &str {
        &self.source
    }
}

/// An input with a corner offset, as found in primitive elements and `<vertex_weights>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetInput {
    pub semantic: Semantic,
    pub source: String,
    pub offset: u64,
    pub set: Option<u64>,
}

impl OffsetInput {
    pub fn new(semantic: impl Into<Semantic>, source: impl Into<String>, offset: u64) -> Self {
        Self {
            semantic: semantic.into(),
            source: source.into(),
            offset,
            set: None,
        }
    }

    #[inline]
    pub fn with_set(mut self, set: u64) -> Self {
        self.set = Some(set);
        self
    }
}

impl InputLike for OffsetInput {
    #[inline]
    fn semantic(&self) -> &Semantic {
        &self.semantic
    }
    #[inline]
    fn source(&self) -> &str {
        &self.source
    }
    #[inline]
    fn set(&self) -> Option<u64> {
        self.set
    }
    #[inline]
    fn offset(&self) -> Option<u64> {
        Some(self.offset)
    }
}
