use std::collections::BTreeMap;

use nalgebra::Matrix4;

use crate::anim::Track;

/// The typed array held by a `<source>`.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceArray {
    Float(Vec<f32>),
    Int(Vec<i64>),
    /// `Name_array`; joints are usually identified by SID
    Name(Vec<String>),
    /// `IDREF_array`; joints and morph targets identified by element id
    IdRef(Vec<String>),
}

impl SourceArray {
    pub fn len(&self) -> usize {
        match self {
            Self::Float(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Name(v) | Self::IdRef(v) => v.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One named (or unnamed) component of an accessor's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Option<String>,
    /// Number of array values the param spans; 16 for `float4x4`
    pub size: usize,
}

impl Param {
    #[inline]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            size: 1,
        }
    }

    #[inline]
    pub fn unnamed() -> Self {
        Self {
            name: None,
            size: 1,
        }
    }

    #[inline]
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }
}

/// A `<source>`: a typed array, the accessor describing how it's divided into records, and any
/// animation driving individual array values.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    array: SourceArray,
    stride: usize,
    params: Vec<Param>,
    animation: BTreeMap<usize, Track<f32>>,
}

impl Source {
    /// Create a source whose records consist of `params`, in order.
    ///
    /// The stride is the total size of `params`, or 1 if there are none.
    pub fn new(array: SourceArray, params: Vec<Param>) -> Self {
        let stride = params.iter().map(|p| p.size).sum::<usize>().max(1);
        Self {
            array,
            stride,
            params,
            animation: BTreeMap::new(),
        }
    }

    /// A float source with one single-valued param per name.
    pub fn from_floats(values: Vec<f32>, params: &[&str]) -> Self {
        Self::new(
            SourceArray::Float(values),
            params.iter().map(|&name| Param::named(name)).collect(),
        )
    }

    /// A source of row-major 4x4 matrices under a single `float4x4` param.
    pub fn from_matrices(matrices: &[Matrix4<f32>], param: &str) -> Self {
        let values = matrices
            .iter()
            .flat_map(|m| m.transpose().as_slice().to_vec())
            .collect();
        Self::new(
            SourceArray::Float(values),
            vec![Param::named(param).with_size(16)],
        )
    }

    pub fn from_names(names: &[&str], param: &str) -> Self {
        Self::new(
            SourceArray::Name(names.iter().map(|&n| n.to_owned()).collect()),
            vec![Param::named(param)],
        )
    }

    pub fn from_id_refs(ids: &[&str], param: &str) -> Self {
        Self::new(
            SourceArray::IdRef(ids.iter().map(|&n| n.to_owned()).collect()),
            vec![Param::named(param)],
        )
    }

    /// Override the accessor stride, e.g. for records padded with unread values.
    #[inline]
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride.max(1);
        self
    }

    /// Drive array value `index` with `track`.
    #[inline]
    pub fn with_animation(mut self, index: usize, track: Track<f32>) -> Self {
        self.animation.insert(index, track);
        self
    }

    #[inline]
    pub fn array(&self) -> &SourceArray {
        &self.array
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Number of complete records in the array.
    #[inline]
    pub fn count(&self) -> usize {
        self.array.len() / self.stride
    }

    /// Whether any param carries a name; sources without names are read positionally.
    pub fn has_named_params(&self) -> bool {
        self.params.iter().any(|p| p.name.is_some())
    }

    /// Offset within each record of the param called `name`.
    pub fn param_offset(&self, name: &str) -> Option<usize> {
        let mut offset = 0;
        for param in &self.params {
            if param.name.as_deref() == Some(name) {
                return Some(offset);
            }
            offset += param.size;
        }
        None
    }

    pub fn floats(&self) -> Option<&[f32]> {
        match &self.array {
            SourceArray::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn ints(&self) -> Option<&[i64]> {
        match &self.array {
            SourceArray::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Names or id references, whichever the array holds.
    pub fn strings(&self) -> Option<&[String]> {
        match &self.array {
            SourceArray::Name(v) | SourceArray::IdRef(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn animation(&self) -> &BTreeMap<usize, Track<f32>> {
        &self.animation
    }
}
