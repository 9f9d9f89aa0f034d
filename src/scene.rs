//! Scene graph nodes owning meshes.

use nalgebra::Matrix4;

use crate::{
    anim::{Animated, AnimatedFloat},
    document::{Document, ElementId},
};

/// A scene node, with the animated properties mesh conversion reads from it.
#[derive(Debug, Clone, PartialEq)]
pub struct AppNode {
    pub element: ElementId,
    pub name: String,
    /// The node's transform mirrors geometry, so its meshes keep their source winding
    pub invert_meshes: bool,
    pub transform: Animated<Matrix4<f32>>,
    pub visibility: AnimatedFloat,
    pub parent: Option<Box<AppNode>>,
}

impl AppNode {
    pub fn new(doc: &Document, element: ElementId) -> Self {
        Self {
            element,
            name: doc
                .get(element)
                .map_or_else(String::new, |e| e.display_name().to_owned()),
            invert_meshes: false,
            transform: Animated::constant(Matrix4::identity()),
            visibility: AnimatedFloat::constant(1.0),
            parent: None,
        }
    }

    #[inline]
    pub fn with_parent(mut self, parent: AppNode) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    #[inline]
    pub fn with_transform(mut self, transform: Animated<Matrix4<f32>>) -> Self {
        self.transform = transform;
        self
    }

    #[inline]
    pub fn with_visibility(mut self, visibility: AnimatedFloat) -> Self {
        self.visibility = visibility;
        self
    }

    #[inline]
    pub fn with_invert_meshes(mut self, invert: bool) -> Self {
        self.invert_meshes = invert;
        self
    }

    /// Name of the parent node; empty for root-level nodes.
    pub fn parent_name(&self) -> &str {
        self.parent.as_ref().map_or("", |p| p.name.as_str())
    }

    #[inline]
    pub fn node_transform(&self, t: f32) -> Matrix4<f32> {
        self.transform.value_at(t)
    }
}
