use nalgebra::{Matrix4, Point2, Point3, Vector3};

use hedron::primitive::attribute::Rgba8;

use super::StreamRole;
use crate::document::{Source, SourceArray};

/// Typed, record-indexed access to the array of a [Source].
///
/// Records are addressed by index; components are located through the accessor's param names.
/// Reading past the end of the array, or a component the accessor doesn't declare, yields 0.
#[derive(Debug, Clone, Copy)]
pub struct SourceReader<'doc> {
    source: &'doc Source,
    /// Offset of each component within a record
    components: [Option<usize>; 4],
}

impl<'doc> SourceReader<'doc> {
    /// Bind `source` for reading values of `role`.
    ///
    /// Returns `None` if the source names its params, but with none of the spellings accepted
    /// for `role`.
    pub fn new(source: &'doc Source, role: StreamRole) -> Option<Self> {
        if !source.has_named_params() {
            return Some(Self::positional(source));
        }
        let mut reader = role
            .param_spellings()
            .iter()
            .find_map(|names| Self::with_params(source, names))?;
        if role == StreamRole::Colors {
            reader.components[3] = source.param_offset("A");
        }
        Some(reader)
    }

    /// Bind `source`, reading the leading values of each record in order.
    pub fn positional(source: &'doc Source) -> Self {
        let stride = source.stride();
        Self {
            source,
            components: [0, 1, 2, 3].map(|c| (c < stride).then_some(c)),
        }
    }

    fn with_params(source: &'doc Source, names: &[&str]) -> Option<Self> {
        let mut components = [None; 4];
        for (slot, name) in components.iter_mut().zip(names) {
            *slot = Some(source.param_offset(name)?);
        }
        Some(Self { source, components })
    }

    #[inline]
    pub fn source(&self) -> &'doc Source {
        self.source
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.source.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `index` addresses a record of this source.
    #[inline]
    pub fn contains(&self, index: u32) -> bool {
        (index as usize) < self.len()
    }

    fn position(&self, index: usize, component: usize) -> Option<usize> {
        let offset = self.components[component]?;
        Some(index * self.source.stride() + offset)
    }

    /// A single component of a record, if both exist.
    pub fn component(&self, index: usize, component: usize) -> Option<f32> {
        let at = self.position(index, component)?;
        match self.source.array() {
            SourceArray::Float(v) => v.get(at).copied(),
            SourceArray::Int(v) => v.get(at).map(|&i| i as f32),
            _ => None,
        }
    }

    #[inline]
    fn component_or(&self, index: usize, component: usize, default: f32) -> f32 {
        self.component(index, component).unwrap_or(default)
    }

    #[inline]
    pub fn float(&self, index: usize) -> f32 {
        self.component_or(index, 0, 0.0)
    }

    pub fn point2(&self, index: usize) -> Point2<f32> {
        Point2::new(
            self.component_or(index, 0, 0.0),
            self.component_or(index, 1, 0.0),
        )
    }

    pub fn point3(&self, index: usize) -> Point3<f32> {
        Point3::from(self.vector3(index))
    }

    pub fn vector3(&self, index: usize) -> Vector3<f32> {
        Vector3::new(
            self.component_or(index, 0, 0.0),
            self.component_or(index, 1, 0.0),
            self.component_or(index, 2, 0.0),
        )
    }

    /// Read a normalized float color; alpha defaults to opaque.
    pub fn color(&self, index: usize) -> Rgba8 {
        Rgba8::from_f32([
            self.component_or(index, 0, 0.0),
            self.component_or(index, 1, 0.0),
            self.component_or(index, 2, 0.0),
            self.component_or(index, 3, 1.0),
        ])
    }

    /// A name or id reference.
    pub fn string(&self, index: usize) -> Option<&'doc str> {
        let at = self.position(index, 0)?;
        self.source
            .strings()?
            .get(at)
            .map(String::as_str)
    }

    /// A row-major 4x4 matrix.
    pub fn matrix(&self, index: usize) -> Option<Matrix4<f32>> {
        let at = self.position(index, 0)?;
        let values = self.source.floats()?.get(at..at + 16)?;
        Some(Matrix4::from_row_slice(values))
    }
}
