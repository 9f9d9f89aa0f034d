//! Materials, as far as mesh conversion is concerned: an index into the shape-global material
//! list, a double-sided flag and an animated texture transform.

use std::collections::HashMap;

use nalgebra::{Matrix3, Point2, Vector2};

use crate::{
    anim::AnimatedFloat,
    document::{BindMaterial, Document, ElementId},
};

/// An animated 2D transform applied to texture coordinates before they're flipped into the
/// bottom-left origin convention.
///
/// `uv' = translate(offset) * scale(repeat) * rotate(rotate_uv) * uv`, with `rotate_uv` in
/// degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureTransform {
    pub offset_u: AnimatedFloat,
    pub offset_v: AnimatedFloat,
    pub repeat_u: AnimatedFloat,
    pub repeat_v: AnimatedFloat,
    pub rotate_uv: AnimatedFloat,
}

impl Default for TextureTransform {
    fn default() -> Self {
        Self {
            offset_u: AnimatedFloat::constant(0.0),
            offset_v: AnimatedFloat::constant(0.0),
            repeat_u: AnimatedFloat::constant(1.0),
            repeat_v: AnimatedFloat::constant(1.0),
            rotate_uv: AnimatedFloat::constant(0.0),
        }
    }
}

impl TextureTransform {
    /// The transform at time `t`, as a homogeneous 2D matrix.
    pub fn matrix_at(&self, t: f32) -> Matrix3<f32> {
        let offset = Vector2::new(self.offset_u.value_at(t), self.offset_v.value_at(t));
        let repeat = Vector2::new(self.repeat_u.value_at(t), self.repeat_v.value_at(t));
        Matrix3::new_translation(&offset)
            * Matrix3::new_nonuniform_scaling(&repeat)
            * Matrix3::new_rotation(self.rotate_uv.value_at(t).to_radians())
    }

    #[inline]
    pub fn apply(&self, uv: Point2<f32>, t: f32) -> Point2<f32> {
        self.matrix_at(t).transform_point(&uv)
    }

    pub fn is_animated(&self, start: f32, end: f32) -> bool {
        [
            &self.offset_u,
            &self.offset_v,
            &self.repeat_u,
            &self.repeat_v,
            &self.rotate_uv,
        ]
        .into_iter()
        .any(|param| param.is_animated(start, end))
    }
}

/// Effect properties attached to a `<material>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectExt {
    pub double_sided: bool,
    pub texture_transform: Option<TextureTransform>,
}

impl EffectExt {
    pub fn animates_texture_transform(&self, start: f32, end: f32) -> bool {
        self.texture_transform
            .as_ref()
            .is_some_and(|xform| xform.is_animated(start, end))
    }
}

/// One entry of the shape-global material list.
#[derive(Debug, Clone, PartialEq)]
pub struct AppMaterial {
    pub name: String,
    /// The `<material>` this entry was created from; `None` for placeholders
    pub element: Option<ElementId>,
    pub effect: Option<EffectExt>,
}

impl AppMaterial {
    /// A material with no document counterpart, named after its binding symbol.
    pub fn placeholder(symbol: &str) -> Self {
        Self {
            name: symbol.to_owned(),
            element: None,
            effect: None,
        }
    }

    pub fn from_element(doc: &Document, el: ElementId) -> Self {
        Self {
            name: doc
                .get(el)
                .map_or_else(String::new, |e| e.display_name().to_owned()),
            element: Some(el),
            effect: doc.material_effect(el).cloned(),
        }
    }
}

/// Materials shared by every mesh of an import, addressed by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialList {
    materials: Vec<AppMaterial>,
}

impl MaterialList {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    #[inline]
    pub fn get(&self, index: u32) -> Option<&AppMaterial> {
        self.materials.get(index as usize)
    }

    #[inline]
    pub fn get_mut(&mut self, index: u32) -> Option<&mut AppMaterial> {
        self.materials.get_mut(index as usize)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, AppMaterial> {
        self.materials.iter()
    }

    pub fn push(&mut self, material: AppMaterial) -> u32 {
        self.materials.push(material);
        (self.materials.len() - 1) as u32
    }

    /// Index of the entry created from `el`, if any.
    pub fn position_of(&self, el: ElementId) -> Option<u32> {
        self.materials
            .iter()
            .position(|m| m.element == Some(el))
            .map(|i| i as u32)
    }

    /// The texture transform of material `index`, if it has one.
    pub fn texture_transform(&self, index: u32) -> Option<&TextureTransform> {
        self.get(index)?.effect.as_ref()?.texture_transform.as_ref()
    }
}

/// The material bindings of one geometry or controller instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialBindings {
    bind_material: Option<BindMaterial>,
    bound: HashMap<String, Option<u32>>,
}

impl MaterialBindings {
    pub fn new(bind_material: Option<BindMaterial>) -> Self {
        Self {
            bind_material,
            bound: HashMap::new(),
        }
    }

    /// Resolve a primitive's binding symbol to an index into `materials`, registering the
    /// material if this is its first use.
    ///
    /// Without a `<bind_material>`, every symbol gets a placeholder entry. With one, symbols it
    /// doesn't mention resolve to no material.
    pub fn resolve(
        &mut self,
        doc: &Document,
        materials: &mut MaterialList,
        symbol: Option<&str>,
        double_sided: bool,
    ) -> Option<u32> {
        let symbol = symbol?;
        if let Some(&index) = self.bound.get(symbol) {
            return index;
        }

        let index = match &self.bind_material {
            Some(binds) => binds.find(symbol).map(|inst| {
                match doc.resolve_uri(&inst.target) {
                    Some(el) => materials
                        .position_of(el)
                        .unwrap_or_else(|| materials.push(AppMaterial::from_element(doc, el))),
                    None => materials.push(AppMaterial::placeholder(symbol)),
                }
            }),
            None => Some(materials.push(AppMaterial::placeholder(symbol))),
        };

        if double_sided {
            if let Some(effect) = index
                .and_then(|i| materials.get_mut(i))
                .and_then(|m| m.effect.as_mut())
            {
                effect.double_sided = true;
            }
        }

        tracing::trace!(symbol, ?index, "bound material");
        self.bound.insert(symbol.to_owned(), index);
        index
    }

    /// Indices of every material bound so far.
    pub fn bound_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.bound.values().filter_map(|&index| index)
    }
}
