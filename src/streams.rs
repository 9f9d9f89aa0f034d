//! Classification of inputs into per-vertex attribute streams.
//!
//! Vertex data is scattered across independently indexed sources: every corner of a primitive
//! carries one index per input offset, and inputs may be routed indirectly through a shared
//! `<vertices>` bundle. [MeshStreams] gathers the inputs of one primitive (or skin) into a fixed
//! set of [StreamRole]s, each backed by a [SourceReader].

use crate::document::{Document, ElementId, ElementKind, InputLike, Semantic};

mod reader;
pub use reader::SourceReader;

/// The canonical per-vertex attribute streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamRole {
    Points,
    Normals,
    Colors,
    UVs,
    UV2s,
    Joints,
    Weights,
    InvBindMatrices,
}

impl StreamRole {
    pub const COUNT: usize = 8;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Points,
        Self::Normals,
        Self::Colors,
        Self::UVs,
        Self::UV2s,
        Self::Joints,
        Self::Weights,
        Self::InvBindMatrices,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The semantic of inputs feeding this role.
    pub fn semantic(self) -> Semantic {
        match self {
            Self::Points => Semantic::Position,
            Self::Normals => Semantic::Normal,
            Self::Colors => Semantic::Color,
            Self::UVs | Self::UV2s => Semantic::Texcoord,
            Self::Joints => Semantic::Joint,
            Self::Weights => Semantic::Weight,
            Self::InvBindMatrices => Semantic::InvBindMatrix,
        }
    }

    /// Accepted param name sets for sources of this role, in order of preference.
    ///
    /// Colors additionally read an optional `A` param.
    pub fn param_spellings(self) -> &'static [&'static [&'static str]] {
        match self {
            Self::Points | Self::Normals => &[&["X", "Y", "Z"]],
            Self::Colors => &[&["R", "G", "B"]],
            Self::UVs | Self::UV2s => &[&["S", "T"], &["U", "V"], &["X", "Y"]],
            Self::Joints => &[&["JOINT"]],
            Self::Weights => &[&["WEIGHT"]],
            Self::InvBindMatrices => &[&["TRANSFORM"]],
        }
    }
}

/// The input selected for each [StreamRole], and the largest input offset seen.
#[derive(Debug)]
pub struct Classified<'a, I> {
    roles: [Option<&'a I>; StreamRole::COUNT],
    max_offset: u64,
}

impl<'a, I> Classified<'a, I> {
    #[inline]
    pub fn get(&self, role: StreamRole) -> Option<&'a I> {
        self.roles[role.index()]
    }

    #[inline]
    pub fn max_offset(&self) -> u64 {
        self.max_offset
    }

    /// Number of indices in each corner record.
    #[inline]
    pub fn stride(&self) -> usize {
        self.max_offset as usize + 1
    }
}

/// Sort `inputs` into stream roles.
///
/// The first input of a semantic wins its role, except that `TEXCOORD` and `COLOR` inputs are
/// ordered by set (inputs without a set count as set 0): the lowest texcoord set becomes
/// [StreamRole::UVs] and the next [StreamRole::UV2s]. A `VERTEX` input fills every role its
/// bundle provides that isn't filled yet.
///
/// `scope` is the element owning the inputs' parent; see [Document::find_input_source].
pub fn classify_inputs<'a, I: InputLike>(
    doc: &Document,
    scope: ElementId,
    inputs: &'a [I],
) -> Classified<'a, I> {
    let mut roles = [None; StreamRole::COUNT];
    let mut max_offset = 0;
    for input in inputs {
        if *input.semantic() == Semantic::Vertex {
            let bundle = doc
                .find_input_source(scope, input)
                .and_then(|el| doc.vertices(el));
            if let Some(bundle) = bundle {
                let from_bundle = classify_direct(&bundle.inputs);
                for (role, found) in roles.iter_mut().zip(from_bundle) {
                    if role.is_none() && found.is_some() {
                        *role = Some(input);
                    }
                }
            }
        } else {
            select(&mut roles, input);
        }
        max_offset = max_offset.max(input.offset().unwrap_or(0));
    }
    Classified { roles, max_offset }
}

/// Classify inputs which can't be indirect, such as those of a `<vertices>` bundle.
fn classify_direct<I: InputLike>(inputs: &[I]) -> [Option<&I>; StreamRole::COUNT] {
    let mut roles = [None; StreamRole::COUNT];
    for input in inputs {
        select(&mut roles, input);
    }
    roles
}

fn select<'a, I: InputLike>(roles: &mut [Option<&'a I>; StreamRole::COUNT], input: &'a I) {
    let set = |i: &I| i.set().unwrap_or(0);
    let role = match input.semantic() {
        Semantic::Texcoord => {
            let (uvs, uv2s) = (StreamRole::UVs.index(), StreamRole::UV2s.index());
            let primary = roles[uvs];
            match primary {
                None => roles[uvs] = Some(input),
                Some(primary) if set(input) < set(primary) => {
                    roles[uv2s] = roles[uvs];
                    roles[uvs] = Some(input);
                }
                Some(_) => {
                    if roles[uv2s].map_or(true, |secondary| set(input) < set(secondary)) {
                        roles[uv2s] = Some(input);
                    }
                }
            }
            return;
        }
        Semantic::Color => {
            let colors = StreamRole::Colors.index();
            if roles[colors].map_or(true, |current| set(input) < set(current)) {
                roles[colors] = Some(input);
            }
            return;
        }
        Semantic::Position => StreamRole::Points,
        Semantic::Normal => StreamRole::Normals,
        Semantic::Joint => StreamRole::Joints,
        Semantic::Weight => StreamRole::Weights,
        Semantic::InvBindMatrix => StreamRole::InvBindMatrices,
        _ => return,
    };
    roles[role.index()].get_or_insert(input);
}

/// Readers for every stream role of a set of inputs.
#[derive(Debug, Clone)]
pub struct MeshStreams<'doc> {
    offsets: [Option<usize>; StreamRole::COUNT],
    readers: [Option<SourceReader<'doc>>; StreamRole::COUNT],
    stride: usize,
}

impl<'doc> MeshStreams<'doc> {
    /// Classify `inputs` and bind a reader for each role whose source can be found.
    ///
    /// Roles without a matching input, or whose source can't be resolved, are left empty.
    pub fn new<I: InputLike>(doc: &'doc Document, scope: ElementId, inputs: &[I]) -> Self {
        let classified = classify_inputs(doc, scope, inputs);
        let offsets = StreamRole::ALL.map(|role| {
            classified
                .get(role)
                .map(|input| input.offset().unwrap_or(0) as usize)
        });
        let readers = StreamRole::ALL.map(|role| {
            classified
                .get(role)
                .and_then(|input| bind_reader(doc, scope, input, role))
        });
        Self {
            offsets,
            readers,
            stride: classified.stride(),
        }
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Which index of a corner record feeds `role`.
    #[inline]
    pub fn offset(&self, role: StreamRole) -> Option<usize> {
        self.offsets[role.index()]
    }

    #[inline]
    pub fn reader(&self, role: StreamRole) -> Option<&SourceReader<'doc>> {
        self.readers[role.index()].as_ref()
    }

    /// The index `record` holds for `role`.
    #[inline]
    pub fn index(&self, role: StreamRole, record: &[u32]) -> Option<u32> {
        record.get(self.offset(role)?).copied()
    }

    /// `index`, if it addresses a record of the `role` source.
    #[inline]
    pub fn valid(&self, role: StreamRole, index: Option<u32>) -> Option<usize> {
        let index = index?;
        let reader = self.reader(role)?;
        reader.contains(index).then_some(index as usize)
    }
}

/// Follow `input` to the source holding its data, through a `<vertices>` bundle if needed.
fn bind_reader<'doc, I: InputLike>(
    doc: &'doc Document,
    scope: ElementId,
    input: &I,
    role: StreamRole,
) -> Option<SourceReader<'doc>> {
    let el = doc.find_input_source(scope, input)?;
    let source = match doc.kind(el)? {
        ElementKind::Source(source) => source,
        ElementKind::Vertices(bundle) => {
            let inner = classify_direct(&bundle.inputs)[role.index()]?;
            doc.source(doc.find_input_source(doc.parent(el)?, inner)?)?
        }
        _ => return None,
    };
    SourceReader::new(source, role)
}
