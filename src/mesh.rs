//! The mesh entity: one geometry or controller instance placed under a scene node.

use std::borrow::Cow;

use hedron::{skin::SkinData, MeshData};
use nalgebra::Matrix4;

use crate::{
    config::ImportOptions,
    document::{
        BindMaterial, Document, ElementId, ElementKind, InstanceController, InstanceGeometry,
    },
    error::{Diagnostics, Error},
    material::{MaterialBindings, MaterialList},
    morph::{blend_morph, morph_weights},
    primitive::build_primitives,
    scene::AppNode,
    skin::{resolve_skin, SkinContext},
    tuple::TupleTable,
    vertex::VertexResolver,
};

/// What a mesh instantiates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshInstance {
    Geometry(InstanceGeometry),
    Controller(InstanceController),
}

impl MeshInstance {
    pub fn url(&self) -> &str {
        match self {
            Self::Geometry(inst) => &inst.url,
            Self::Controller(inst) => &inst.url,
        }
    }

    pub fn bind_material(&self) -> Option<&BindMaterial> {
        match self {
            Self::Geometry(inst) => inst.bind_material.as_ref(),
            Self::Controller(inst) => inst.bind_material.as_ref(),
        }
    }
}

/// A `<geometry>` whose shape is a `<mesh>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshGeometry {
    pub geometry: ElementId,
    pub mesh: ElementId,
}

impl MeshGeometry {
    /// # Errors
    ///
    /// * [Error::UnsupportedGeometry] if `geometry` isn't a `<geometry>`, or doesn't hold a
    ///   `<mesh>`; `owner` names the mesh being converted
    pub fn resolve(doc: &Document, geometry: ElementId, owner: &str) -> Result<Self, Error> {
        let unsupported = |element: &str| Error::UnsupportedGeometry {
            element: element.to_owned(),
            mesh: owner.to_owned(),
        };
        match doc.kind(geometry) {
            Some(ElementKind::Geometry(_)) => {}
            Some(kind) => return Err(unsupported(kind.tag())),
            None => return Err(unsupported("")),
        }
        let content = doc
            .geometry_content(geometry)
            .ok_or_else(|| unsupported("geometry"))?;
        match doc.kind(content) {
            Some(ElementKind::Mesh) => Ok(Self {
                geometry,
                mesh: content,
            }),
            Some(kind) => Err(unsupported(kind.tag())),
            None => Err(unsupported("geometry")),
        }
    }
}

/// Everything the conversion stages of one mesh share.
pub(crate) struct MeshContext<'a> {
    pub doc: &'a Document,
    pub node: &'a AppNode,
    pub options: &'a ImportOptions,
    pub materials: &'a mut MaterialList,
    pub bindings: &'a mut MaterialBindings,
    pub diagnostics: &'a mut Diagnostics,
}

impl MeshContext<'_> {
    /// Resolve a binding symbol to a material index.
    #[inline]
    pub fn material(&mut self, symbol: Option<&str>, double_sided: bool) -> Option<u32> {
        self.bindings
            .resolve(self.doc, self.materials, symbol, double_sided)
    }
}

/// The tuple table and output data of a mesh.
#[derive(Debug, Clone, Default)]
pub(crate) struct MeshBuffers {
    pub tuples: TupleTable,
    pub data: MeshData,
    built: bool,
}

impl MeshBuffers {
    /// Build primitives from `geometry`, unless they've already been built.
    pub fn build(&mut self, cx: &mut MeshContext<'_>, geometry: MeshGeometry) {
        if !self.built {
            build_primitives(cx, geometry, &mut self.tuples, &mut self.data);
            self.built = true;
        }
    }
}

/// Where a mesh's vertex data comes from.
#[derive(Debug, Clone, Copy)]
enum GeometrySource {
    Static(MeshGeometry),
    Morph(ElementId),
}

/// A mesh being converted: its tuple table, index buffer, vertex frames and skin.
///
/// # Characteristics
///
/// * Primitives are built on the first [AppMesh::lock_mesh]; each call appends one frame of
///   vertex data
/// * Skin data is resolved by [AppMesh::lookup_skin_data], once influences can be found
/// * Failures never propagate past the mesh: they're recorded in [AppMesh::diagnostics]
#[derive(Debug, Clone)]
pub struct AppMesh {
    node: AppNode,
    instance: MeshInstance,
    options: ImportOptions,
    bindings: MaterialBindings,
    buffers: MeshBuffers,
    skin: Option<SkinData<ElementId>>,
    diagnostics: Diagnostics,
}

impl AppMesh {
    pub fn new(node: AppNode, instance: MeshInstance, options: ImportOptions) -> Self {
        let bindings = MaterialBindings::new(instance.bind_material().cloned());
        Self {
            node,
            instance,
            options,
            bindings,
            buffers: MeshBuffers::default(),
            skin: None,
            diagnostics: Diagnostics::default(),
        }
    }

    #[inline]
    pub fn node(&self) -> &AppNode {
        &self.node
    }

    #[inline]
    pub fn instance(&self) -> &MeshInstance {
        &self.instance
    }

    /// The converted primitives, indices and vertex frames.
    #[inline]
    pub fn data(&self) -> &MeshData {
        &self.buffers.data
    }

    #[inline]
    pub fn tuples(&self) -> &TupleTable {
        &self.buffers.tuples
    }

    /// Number of vertex slots in each frame.
    #[inline]
    pub fn verts_per_frame(&self) -> usize {
        self.buffers.tuples.len()
    }

    /// Number of vertex frames filled so far.
    pub fn frame_count(&self) -> usize {
        match self.verts_per_frame() {
            0 => 0,
            n => self.buffers.data.vertices.len() / n,
        }
    }

    #[inline]
    pub fn skin(&self) -> Option<&SkinData<ElementId>> {
        self.skin.as_ref()
    }

    #[inline]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The name this mesh is exported under.
    ///
    /// Helper nodes some exporters insert between a mesh and its object (named `null`, or ending
    /// in `PIVOT`) are skipped in favor of their parent. With `allow_fixed`, the configured
    /// fixed size is appended.
    pub fn name(&self, allow_fixed: bool) -> Cow<'_, str> {
        let name = &self.node.name;
        let name = if name == "null" || name.ends_with("PIVOT") {
            self.node.parent_name()
        } else {
            name.as_str()
        };
        match self.options.fixed_size {
            Some(size) if allow_fixed => Cow::Owned(format!("{name} {size}")),
            _ => Cow::Borrowed(name),
        }
    }

    #[inline]
    pub fn mesh_transform(&self, t: f32) -> Matrix4<f32> {
        self.node.node_transform(t)
    }

    /// Whether the visibility of this mesh's node or its parent changes in `[start, end]`.
    pub fn animates_vis(&self, start: f32, end: f32) -> bool {
        self.node.visibility.is_animated(start, end)
            || self
                .node
                .parent
                .as_ref()
                .is_some_and(|parent| parent.visibility.is_animated(start, end))
    }

    /// Visibility of this mesh's node, scaled by its parent's.
    pub fn vis_value(&self, t: f32) -> f32 {
        self.node.visibility.value_at(t)
            * self
                .node
                .parent
                .as_ref()
                .map_or(1.0, |parent| parent.visibility.value_at(t))
    }

    /// Whether texture coordinates change in `[start, end]`.
    pub fn animates_mat_frame(
        &self,
        doc: &Document,
        materials: &MaterialList,
        start: f32,
        end: f32,
    ) -> bool {
        let transforms = self.bindings.bound_indices().any(|index| {
            materials
                .get(index)
                .and_then(|m| m.effect.as_ref())
                .is_some_and(|effect| effect.animates_texture_transform(start, end))
        });
        if transforms {
            return true;
        }

        // TODO: compare the texcoords of each morph target with the base geometry's, so that
        // animated weights over differing UVs count as material animation
        let different_uvs = false;
        different_uvs
            && self
                .get_morph(doc)
                .is_some_and(|morph| morph_weights(doc, morph).is_animated(start, end))
    }

    /// Whether vertex positions change in `[start, end]`, i.e. whether morph weights are
    /// animated.
    pub fn animates_frame(&self, doc: &Document, start: f32, end: f32) -> bool {
        self.get_morph(doc)
            .is_some_and(|morph| morph_weights(doc, morph).is_animated(start, end))
    }

    /// Whether this mesh instantiates a skin controller.
    pub fn is_skin(&self, doc: &Document) -> bool {
        self.skin_element(doc).is_some()
    }

    /// The `<morph>` driving this mesh, directly or beneath a skin.
    pub fn get_morph(&self, doc: &Document) -> Option<ElementId> {
        let MeshInstance::Controller(inst) = &self.instance else {
            return None;
        };
        let content = doc.controller_content(doc.resolve_uri(&inst.url)?)?;
        match doc.kind(content)? {
            ElementKind::Morph(_) => Some(content),
            ElementKind::Skin(skin) => {
                let source = doc.resolve_uri(&skin.source)?;
                let inner = doc.controller_content(source)?;
                doc.morph(inner).map(|_| inner)
            }
            _ => None,
        }
    }

    fn skin_element(&self, doc: &Document) -> Option<ElementId> {
        let MeshInstance::Controller(inst) = &self.instance else {
            return None;
        };
        let content = doc.controller_content(doc.resolve_uri(&inst.url)?)?;
        doc.skin(content).map(|_| content)
    }

    fn geometry_source(&self, doc: &Document) -> Result<GeometrySource, Error> {
        let name = self.name(false);
        let missing = || Error::MissingGeometry(name.to_string());
        let geometry = |el| MeshGeometry::resolve(doc, el, &name).map(GeometrySource::Static);
        match &self.instance {
            MeshInstance::Geometry(inst) => {
                geometry(doc.resolve_uri(&inst.url).ok_or_else(missing)?)
            }
            MeshInstance::Controller(inst) => {
                let controller = doc
                    .resolve_uri(&inst.url)
                    .filter(|&el| matches!(doc.kind(el), Some(ElementKind::Controller)))
                    .ok_or_else(|| Error::MissingController(name.to_string()))?;
                let content = doc.controller_content(controller).ok_or_else(missing)?;
                match doc.kind(content) {
                    Some(ElementKind::Morph(_)) => Ok(GeometrySource::Morph(content)),
                    Some(ElementKind::Skin(skin)) => {
                        let source = doc.resolve_uri(&skin.source).ok_or_else(missing)?;
                        if matches!(doc.kind(source), Some(ElementKind::Controller)) {
                            doc.controller_content(source)
                                .filter(|&el| doc.morph(el).is_some())
                                .map(GeometrySource::Morph)
                                .ok_or_else(missing)
                        } else {
                            geometry(source)
                        }
                    }
                    _ => Err(missing()),
                }
            }
        }
    }

    /// Append one frame of vertex data, sampled at time `t` and transformed by `object_offset`.
    ///
    /// Primitives are built on the first call. Any error is also recorded in
    /// [AppMesh::diagnostics]; data filled before it is kept.
    #[tracing::instrument(skip(self, doc, materials, object_offset), fields(node = self.node.name.as_str()))]
    pub fn lock_mesh(
        &mut self,
        doc: &Document,
        materials: &mut MaterialList,
        t: f32,
        object_offset: &Matrix4<f32>,
    ) -> Result<(), Error> {
        let result = self.try_lock_mesh(doc, materials, t, object_offset);
        if let Err(err) = &result {
            self.diagnostics.fail(err.clone());
        }
        result
    }

    fn try_lock_mesh(
        &mut self,
        doc: &Document,
        materials: &mut MaterialList,
        t: f32,
        object_offset: &Matrix4<f32>,
    ) -> Result<(), Error> {
        let source = self.geometry_source(doc)?;
        let mut cx = MeshContext {
            doc,
            node: &self.node,
            options: &self.options,
            materials,
            bindings: &mut self.bindings,
            diagnostics: &mut self.diagnostics,
        };
        match source {
            GeometrySource::Static(geometry) => {
                self.buffers.build(&mut cx, geometry);
                VertexResolver::new(&mut cx, t, *object_offset).resolve(
                    geometry,
                    self.buffers.tuples.tuples(),
                    true,
                    &mut self.buffers.data.vertices,
                )
            }
            GeometrySource::Morph(morph) => {
                blend_morph(&mut cx, morph, &mut self.buffers, t, *object_offset)
            }
        }
    }

    /// Resolve bone influences and bind poses, once; later calls return the same data.
    ///
    /// Returns `None` if this mesh isn't skinned. Influences are only found for vertices which
    /// exist, so data looked up before [AppMesh::lock_mesh] holds no influences, and is resolved
    /// again once vertices exist.
    pub fn lookup_skin_data(
        &mut self,
        doc: &Document,
        object_offset: &Matrix4<f32>,
    ) -> Option<&SkinData<ElementId>> {
        let stale = self.skin.as_ref().map_or(true, |skin| {
            skin.is_empty() && !self.buffers.tuples.tuples().is_empty()
        });
        if stale {
            let skin_el = self.skin_element(doc)?;
            let MeshInstance::Controller(inst) = &self.instance else {
                return None;
            };
            let cx = SkinContext {
                doc,
                node: &self.node,
                options: &self.options,
                diagnostics: &mut self.diagnostics,
            };
            self.skin = Some(resolve_skin(
                cx,
                skin_el,
                &inst.skeletons,
                self.buffers.tuples.tuples(),
                object_offset,
            ));
        }
        self.skin.as_ref()
    }
}
