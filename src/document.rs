//! The source document, as an arena of typed elements.
//!
//! Parsing is someone else's job: documents are assembled through the `add_*` builder methods,
//! and mesh conversion only ever navigates them. Elements are addressed by [ElementId], which is
//! stable for the lifetime of the [Document].

use std::{collections::HashMap, ops::Index};

mod controller;
mod geometry;
mod input;
mod source;

pub use controller::*;
pub use geometry::*;
pub use input::*;
pub use source::*;

use crate::material::EffectExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

impl ElementId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Root,
    /// A `<library_*>` or other plain container
    Library,
    Source(Source),
    Vertices(Vertices),
    Geometry(Geometry),
    Mesh,
    Primitive(Primitive),
    Controller,
    Morph(Morph),
    Skin(Skin),
    Node,
    Material { effect: Option<EffectExt> },
    /// Any element this crate doesn't interpret, by tag
    Other(String),
}

impl ElementKind {
    /// The document tag of the element.
    pub fn tag(&self) -> &str {
        match self {
            Self::Root => "COLLADA",
            Self::Library => "library",
            Self::Source(_) => "source",
            Self::Vertices(_) => "vertices",
            Self::Geometry(_) => "geometry",
            Self::Mesh => "mesh",
            Self::Primitive(prim) => prim.kind.tag(),
            Self::Controller => "controller",
            Self::Morph(_) => "morph",
            Self::Skin(_) => "skin",
            Self::Node => "node",
            Self::Material { .. } => "material",
            Self::Other(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    id: Option<String>,
    name: Option<String>,
    sid: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    kind: ElementKind,
}

impl Element {
    #[inline]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    #[inline]
    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }
    #[inline]
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }
    #[inline]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
    #[inline]
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// The name, else the id, else the tag; used to identify elements in diagnostics.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or_else(|| self.kind.tag())
    }
}

/// An element tree with id lookup.
///
/// # Characteristics
///
/// * Ids need not be unique; lookup by id returns the first element registered with it
/// * Elements are never removed
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    ids: HashMap<String, ElementId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<ElementId> for Document {
    type Output = Element;

    fn index(&self, index: ElementId) -> &Self::Output {
        &self.elements[index.index()]
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            elements: vec![Element {
                id: None,
                name: None,
                sid: None,
                parent: None,
                children: Vec::new(),
                kind: ElementKind::Root,
            }],
            ids: HashMap::new(),
        }
    }

    #[inline]
    pub fn root(&self) -> ElementId {
        ElementId(0)
    }

    #[inline]
    pub fn get(&self, el: ElementId) -> Option<&Element> {
        self.elements.get(el.index())
    }

    #[inline]
    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.get(el)?.parent
    }

    #[inline]
    pub fn children(&self, el: ElementId) -> &[ElementId] {
        self.get(el).map_or(&[], |e| e.children.as_slice())
    }

    #[inline]
    pub fn kind(&self, el: ElementId) -> Option<&ElementKind> {
        self.get(el).map(|e| &e.kind)
    }

    /// Look up an element by its `id` attribute.
    #[inline]
    pub fn by_id(&self, id: &str) -> Option<ElementId> {
        self.ids.get(id).copied()
    }

    /// Resolve a `#id` fragment (or a bare id, as found in IDREF arrays) within this document.
    pub fn resolve_uri(&self, uri: &str) -> Option<ElementId> {
        self.by_id(uri.strip_prefix('#').unwrap_or(uri))
    }

    /// Add an element as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// * `parent` isn't an element of this document
    /// * the document already holds `u32::MAX` elements
    pub fn insert(&mut self, parent: ElementId, id: Option<&str>, kind: ElementKind) -> ElementId {
        let el = ElementId(
            u32::try_from(self.elements.len()).expect("document holds fewer than 2^32 elements"),
        );
        self.elements.push(Element {
            id: id.map(str::to_owned),
            name: None,
            sid: None,
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.elements[parent.index()].children.push(el);
        if let Some(id) = id {
            self.ids.entry(id.to_owned()).or_insert(el);
        }
        el
    }

    pub fn set_name(&mut self, el: ElementId, name: impl Into<String>) {
        if let Some(e) = self.elements.get_mut(el.index()) {
            e.name = Some(name.into());
        }
    }

    pub fn set_sid(&mut self, el: ElementId, sid: impl Into<String>) {
        if let Some(e) = self.elements.get_mut(el.index()) {
            e.sid = Some(sid.into());
        }
    }

    pub fn add_library(&mut self, tag: &str) -> ElementId {
        let el = self.insert(self.root(), None, ElementKind::Library);
        self.set_name(el, tag);
        el
    }

    pub fn add_geometry(&mut self, parent: ElementId, id: &str, geometry: Geometry) -> ElementId {
        self.insert(parent, Some(id), ElementKind::Geometry(geometry))
    }

    pub fn add_mesh(&mut self, geometry: ElementId) -> ElementId {
        self.insert(geometry, None, ElementKind::Mesh)
    }

    pub fn add_source(&mut self, parent: ElementId, id: &str, source: Source) -> ElementId {
        self.insert(parent, Some(id), ElementKind::Source(source))
    }

    pub fn add_vertices(&mut self, mesh: ElementId, id: &str, vertices: Vertices) -> ElementId {
        self.insert(mesh, Some(id), ElementKind::Vertices(vertices))
    }

    pub fn add_primitive(&mut self, mesh: ElementId, primitive: Primitive) -> ElementId {
        self.insert(mesh, None, ElementKind::Primitive(primitive))
    }

    pub fn add_controller(&mut self, parent: ElementId, id: &str) -> ElementId {
        self.insert(parent, Some(id), ElementKind::Controller)
    }

    pub fn add_morph(&mut self, controller: ElementId, morph: Morph) -> ElementId {
        self.insert(controller, None, ElementKind::Morph(morph))
    }

    pub fn add_skin(&mut self, controller: ElementId, skin: Skin) -> ElementId {
        self.insert(controller, None, ElementKind::Skin(skin))
    }

    pub fn add_node(
        &mut self,
        parent: ElementId,
        id: Option<&str>,
        name: &str,
        sid: Option<&str>,
    ) -> ElementId {
        let el = self.insert(parent, id, ElementKind::Node);
        self.set_name(el, name);
        if let Some(sid) = sid {
            self.set_sid(el, sid);
        }
        el
    }

    pub fn add_material(
        &mut self,
        parent: ElementId,
        id: &str,
        name: &str,
        effect: Option<EffectExt>,
    ) -> ElementId {
        let el = self.insert(parent, Some(id), ElementKind::Material { effect });
        self.set_name(el, name);
        el
    }

    pub fn source(&self, el: ElementId) -> Option<&Source> {
        match self.kind(el)? {
            ElementKind::Source(source) => Some(source),
            _ => None,
        }
    }

    pub fn vertices(&self, el: ElementId) -> Option<&Vertices> {
        match self.kind(el)? {
            ElementKind::Vertices(vertices) => Some(vertices),
            _ => None,
        }
    }

    pub fn geometry(&self, el: ElementId) -> Option<&Geometry> {
        match self.kind(el)? {
            ElementKind::Geometry(geometry) => Some(geometry),
            _ => None,
        }
    }

    pub fn primitive(&self, el: ElementId) -> Option<&Primitive> {
        match self.kind(el)? {
            ElementKind::Primitive(primitive) => Some(primitive),
            _ => None,
        }
    }

    pub fn morph(&self, el: ElementId) -> Option<&Morph> {
        match self.kind(el)? {
            ElementKind::Morph(morph) => Some(morph),
            _ => None,
        }
    }

    pub fn skin(&self, el: ElementId) -> Option<&Skin> {
        match self.kind(el)? {
            ElementKind::Skin(skin) => Some(skin),
            _ => None,
        }
    }

    pub fn material_effect(&self, el: ElementId) -> Option<&EffectExt> {
        match self.kind(el)? {
            ElementKind::Material { effect } => effect.as_ref(),
            _ => None,
        }
    }

    /// The first child of a `<geometry>`, which describes its shape (usually a `<mesh>`).
    #[inline]
    pub fn geometry_content(&self, geometry: ElementId) -> Option<ElementId> {
        self.children(geometry).first().copied()
    }

    /// The `<morph>` or `<skin>` of a `<controller>`.
    pub fn controller_content(&self, controller: ElementId) -> Option<ElementId> {
        self.children(controller).iter().copied().find(|&c| {
            matches!(
                self.kind(c),
                Some(ElementKind::Morph(_) | ElementKind::Skin(_))
            )
        })
    }

    /// Every primitive element of `mesh`, in document order.
    pub fn primitives(
        &self,
        mesh: ElementId,
    ) -> impl Iterator<Item = (ElementId, &Primitive)> + '_ {
        self.children(mesh)
            .iter()
            .filter_map(|&c| self.primitive(c).map(|prim| (c, prim)))
    }

    /// Find the `<source>` or `<vertices>` an input refers to.
    ///
    /// `scope` is the element owning the input's parent (the `<mesh>` for primitive and vertices
    /// inputs, the `<skin>` or `<morph>` for controller inputs). Ids aren't guaranteed to be
    /// unique, so the resolved element is only accepted if it's a child of `scope`; otherwise
    /// the direct children of `scope` are searched by id. Deeper descendants are not searched.
    pub fn find_input_source<I: InputLike + ?Sized>(
        &self,
        scope: ElementId,
        input: &I,
    ) -> Option<ElementId> {
        let uri = input.source();
        if let Some(el) = self.resolve_uri(uri) {
            if self.parent(el) == Some(scope) {
                return Some(el);
            }
        }
        let id = uri.strip_prefix('#').unwrap_or(uri);
        self.children(scope).iter().copied().find(|&c| {
            self.get(c).is_some_and(|e| {
                matches!(e.kind, ElementKind::Source(_) | ElementKind::Vertices(_))
                    && e.id() == Some(id)
            })
        })
    }

    /// Resolve a node by a `/`-separated path, relative to `base` (the document root if
    /// `None`).
    ///
    /// The first path segment matches a node's SID, its id, or its name, in that order of
    /// preference, anywhere at or below `base`; each further segment matches a SID below the
    /// previous match.
    pub fn resolve_node(&self, base: Option<ElementId>, path: &str) -> Option<ElementId> {
        let base = base.unwrap_or(self.root());
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments.next()?;
        let mut current = if first == "." {
            base
        } else {
            self.find_below(base, |e| e.sid() == Some(first))
                .or_else(|| {
                    self.by_id(first)
                        .filter(|&el| self.is_within(el, base))
                })
                .or_else(|| {
                    self.find_below(base, |e| {
                        matches!(e.kind, ElementKind::Node) && e.name() == Some(first)
                    })
                })?
        };
        for segment in segments {
            current = self.find_below(current, |e| e.sid() == Some(segment))?;
        }
        matches!(self.kind(current), Some(ElementKind::Node)).then_some(current)
    }

    /// Whether `el` is `ancestor` or one of its descendants.
    pub fn is_within(&self, el: ElementId, ancestor: ElementId) -> bool {
        let mut current = Some(el);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    /// Breadth-first search of `start` and its descendants.
    fn find_below(&self, start: ElementId, pred: impl Fn(&Element) -> bool) -> Option<ElementId> {
        let mut queue = std::collections::VecDeque::from([start]);
        while let Some(el) = queue.pop_front() {
            let element = self.get(el)?;
            if pred(element) {
                return Some(el);
            }
            queue.extend(element.children.iter().copied());
        }
        None
    }
}
